//! Cache maintenance MCP tools.
//!
//! This module provides tools for invalidating and sweeping device bundles.

pub mod invalidate;
pub mod sweep;

pub use invalidate::{CacheInvalidateParams, invalidate_impl};
pub use sweep::sweep_impl;
