//! Backend calls requested by the controller and their replies
//!
//! The controller performs no I/O itself. It hands out [`OutboundRequest`]s,
//! the tab runtime executes them, and the replies come back tagged with the
//! ticket they were issued under.

use breakwatch_api::{ActionOutcome, BreakStatus};
use breakwatch_client::{ClientResult, StatusClient};
use tracing::debug;

use crate::Ticket;

/// A backend call to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCall {
    CheckStatus,
    StartBreak,
    EndBreak { reason: String },
}

/// A backend call together with the ticket its reply must carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub ticket: Ticket,
    pub call: ServerCall,
}

/// Successful reply to a [`ServerCall`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    Status(BreakStatus),
    Start(ActionOutcome),
    End(ActionOutcome),
}

impl ServerCall {
    /// Perform the call against `client`
    pub async fn execute(&self, client: &dyn StatusClient) -> ClientResult<ServerReply> {
        debug!(call = ?self, "Executing backend call");
        match self {
            Self::CheckStatus => client.check_status().await.map(ServerReply::Status),
            Self::StartBreak => client.start_break().await.map(ServerReply::Start),
            Self::EndBreak { reason } => client.end_break(reason).await.map(ServerReply::End),
        }
    }
}
