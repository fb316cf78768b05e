//! Break session state machine for breakwatch
//!
//! This crate is the heart of a tab, containing:
//! - The session state machine (Idle -> Running -> PendingReasonEntry -> Idle)
//! - Reconciliation of the shared timer state against the backend
//! - The per-tab display clock and status banner
//! - Request tickets that drop out-of-order backend replies
//! - The tab runtime loop tying user input, replies and broadcasts together

mod banner;
mod clock;
mod controller;
mod events;
mod requests;
mod session;
mod tab;
mod view;

pub use banner::*;
pub use clock::*;
pub use controller::*;
pub use events::*;
pub use requests::*;
pub use session::*;
pub use tab::*;
pub use view::*;
