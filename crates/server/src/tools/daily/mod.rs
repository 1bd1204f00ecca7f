//! Daily reading tools.

pub mod mark_read;
pub mod open;
pub mod read_map;

pub use mark_read::{DailyMarkReadParams, mark_read_impl};
pub use open::{DailyOpenParams, open_impl};
pub use read_map::{DailyReadMapParams, read_map_impl};
