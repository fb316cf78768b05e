//! Shared utilities for breakwatch
//!
//! This crate provides:
//! - ID types (TabId)
//! - Time utilities (epoch milliseconds, time sources, elapsed formatting)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
