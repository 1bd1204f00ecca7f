//! MCP tool implementations.
//!
//! This module contains all tools exposed by the refill server.

pub mod cache;
pub mod daily;
pub mod reader_settings;

pub use cache::{CacheInvalidateParams, invalidate_impl, sweep_impl};
pub use daily::{
    DailyMarkReadParams, DailyOpenParams, DailyReadMapParams, mark_read_impl, open_impl, read_map_impl,
};
pub use reader_settings::{ReaderSettingsParams, settings_impl};
