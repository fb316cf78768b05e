//! Break-tracking backend client for breakwatch
//!
//! Provides:
//! - The [`StatusClient`] trait used by the session controller
//! - An HTTP/JSON implementation
//! - An in-memory mock backend for tests and offline runs

mod http;
mod mock;
mod traits;

pub use http::*;
pub use mock::*;
pub use traits::*;
