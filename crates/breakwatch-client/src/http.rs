//! HTTP/JSON client for the break-tracking backend

use async_trait::async_trait;
use breakwatch_api::{ActionOutcome, ActionResponse, BreakStatus, EndBreakRequest, StatusResponse};
use breakwatch_config::ServerConfig;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::{normalize_reason, ClientError, ClientResult, StatusClient};

/// Backend client speaking the JSON endpoints of the break-tracking service
pub struct HttpStatusClient {
    config: ServerConfig,
    http: Client,
}

impl HttpStatusClient {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: ServerConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Decode a start/end reply. Error replies carry the same JSON body with a
    /// 4xx/5xx status, so the body wins over the status code when it parses.
    async fn decode_action(response: Response) -> ClientResult<ActionOutcome> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match serde_json::from_str::<ActionResponse>(&body) {
            Ok(reply) => {
                if let (Some(date), Some(time)) = (&reply.date, &reply.time) {
                    debug!(%date, %time, "Server recorded break start");
                }
                Ok(ActionOutcome::from(reply))
            }
            Err(_) if !status.is_success() => Err(ClientError::Http {
                status: status.as_u16(),
            }),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn check_status(&self) -> ClientResult<BreakStatus> {
        let url = self.config.status_url();
        debug!(%url, "Checking break status");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Status check failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }

        let reply: StatusResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        reply
            .into_status()
            .ok_or_else(|| ClientError::Decode("active status without start_timestamp".into()))
    }

    async fn start_break(&self) -> ClientResult<ActionOutcome> {
        let url = self.config.start_url();
        debug!(%url, "Requesting break start");

        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::decode_action(response).await
    }

    async fn end_break(&self, reason: &str) -> ClientResult<ActionOutcome> {
        let reason = normalize_reason(reason)?;
        let url = self.config.end_url();
        debug!(%url, "Requesting break end");

        let response = self
            .http
            .post(&url)
            .json(&EndBreakRequest {
                reason: reason.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::decode_action(response).await
    }
}
