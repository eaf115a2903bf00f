//! Best-effort bridge to the external call-intake service.
//!
//! The domain store records call requests locally first, then hands
//! them to a [`CallRelay`] exactly once. The relay reports failures as
//! typed errors; deciding to swallow them is the store's job, not ours.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RelayConfig, RequestConfig};
use crate::error::{RelayError, RelayResult};

/// The triple submitted to the call-intake endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSubmission {
    pub user_id: String,
    pub phone: String,
    pub topic: String,
}

/// Server acknowledgement of an accepted call request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    /// Server-assigned request identifier.
    pub request_id: String,
}

/// A call request as stored on the intake server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCallRequest {
    pub request_id: String,
    pub user_id: Option<String>,
    pub phone: Option<String>,
    pub topic: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// Health probe response from the intake server.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub service: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    ok: bool,
    #[allow(dead_code)]
    endpoint: Option<String>,
    #[serde(rename = "requestId")]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    items: Vec<RemoteCallRequest>,
}

/// Submission seam between the domain store and the intake service.
///
/// One attempt per call; no retry policy lives at this boundary.
#[async_trait]
pub trait CallRelay: Send + Sync {
    /// Submit a call request; errors on network failure, non-2xx
    /// status, or a malformed response body.
    async fn submit(&self, submission: &CallSubmission) -> RelayResult<RelayReceipt>;
}

/// HTTP implementation of [`CallRelay`] against the call-intake contract.
#[derive(Clone)]
pub struct HttpCallRelay {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpCallRelay {
    /// Create a relay client for the given base URL.
    pub fn new(config: &RelayConfig, request_config: &RequestConfig) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(RelayError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the intake server's `/health` endpoint.
    pub async fn health(&self) -> RelayResult<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| RelayError::InvalidResponse {
                message: format!("Failed to parse health response: {}", e),
            })
    }

    /// Fetch the server's full stored call-request collection.
    pub async fn list_call_requests(&self) -> RelayResult<Vec<RemoteCallRequest>> {
        let url = format!("{}/api/call-requests", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ListResponse =
            response
                .json()
                .await
                .map_err(|e| RelayError::InvalidResponse {
                    message: format!("Failed to parse call-request list: {}", e),
                })?;

        Ok(list.items)
    }

    fn map_send_error(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            RelayError::Http(e)
        }
    }
}

#[async_trait]
impl CallRelay for HttpCallRelay {
    async fn submit(&self, submission: &CallSubmission) -> RelayResult<RelayReceipt> {
        let url = format!("{}/api/rexy/calls", self.base_url);

        debug!(topic = %submission.topic, "Submitting call request to intake service");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(submission)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: SubmitResponse =
            response
                .json()
                .await
                .map_err(|e| RelayError::InvalidResponse {
                    message: format!("Failed to parse submit response: {}", e),
                })?;

        if !body.ok {
            return Err(RelayError::InvalidResponse {
                message: "Intake service did not acknowledge the request".to_string(),
            });
        }

        let request_id = body.request_id.ok_or_else(|| RelayError::InvalidResponse {
            message: "Submit response missing requestId".to_string(),
        })?;

        info!(request_id = %request_id, "Call request accepted by intake service");

        Ok(RelayReceipt { request_id })
    }
}
