//! Shared types for breakwatch
//!
//! This crate defines the data exchanged between the pieces of a tab:
//! - The persisted timer state record
//! - Break-tracking backend request/response shapes
//! - Domain outcomes of backend calls
//! - Cross-tab broadcast messages

mod events;
mod state;
mod types;
mod wire;

pub use events::*;
pub use state::*;
pub use types::*;
pub use wire::*;
