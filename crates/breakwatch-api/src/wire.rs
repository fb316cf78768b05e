//! Request/response shapes of the break-tracking backend

use breakwatch_util::EpochMillis;
use serde::{Deserialize, Serialize};

use crate::{ActionOutcome, BreakStatus};

/// `status` field of the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireBreakStatus {
    Active,
    #[serde(alias = "inactive")]
    Idle,
}

/// Body of `GET /check-break-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: WireBreakStatus,
    /// Break start in (fractional) epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl StatusResponse {
    /// Convert to the domain status. An active status must carry its start time.
    pub fn into_status(self) -> Option<BreakStatus> {
        match self.status {
            WireBreakStatus::Idle => Some(BreakStatus::Idle),
            WireBreakStatus::Active => self.start_timestamp.map(|secs| BreakStatus::Active {
                started_at: EpochMillis::from_secs_f64(secs),
            }),
        }
    }
}

impl From<BreakStatus> for StatusResponse {
    fn from(status: BreakStatus) -> Self {
        match status {
            BreakStatus::Idle => Self {
                status: WireBreakStatus::Idle,
                start_timestamp: None,
                start_date: None,
                start_time: None,
            },
            BreakStatus::Active { started_at } => {
                let local = started_at.to_local();
                Self {
                    status: WireBreakStatus::Active,
                    start_timestamp: Some(started_at.as_secs_f64()),
                    start_date: local.map(|dt| dt.format("%d/%m/%Y").to_string()),
                    start_time: local.map(|dt| dt.format("%H:%M:%S").to_string()),
                }
            }
        }
    }
}

/// `status` field of the start/end endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireActionStatus {
    Success,
    Error,
}

/// Body of `POST /start-break` and `POST /end-break` replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: WireActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Start date (`dd/mm/YYYY`) echoed by the start endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Start time (`HH:MM:SS`) echoed by the start endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl From<ActionResponse> for ActionOutcome {
    fn from(resp: ActionResponse) -> Self {
        ActionOutcome {
            ok: resp.status == WireActionStatus::Success,
            message: resp.message,
        }
    }
}

/// Body of `POST /end-break`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndBreakRequest {
    pub reason: String,
}
