//! Authenticated HTTP calls against the shop's command queue.

use crate::{AcknowledgeRequest, PendingCommand, QueueError, QueueResult};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Bounded connect/read timeout for both queue calls. Keeps a slow or
/// unreachable shop API from wedging a background task indefinitely.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent header identifying this connector build to the shop API.
const USER_AGENT: &str = concat!("xishop-connector/", env!("CARGO_PKG_VERSION"));

/// Client for the shop's pending-command queue.
///
/// Cheap to clone; the underlying reqwest client shares its connection pool.
#[derive(Clone)]
pub struct ShopQueueClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ShopQueueClient {
    /// Create a new queue client for the given endpoint and credential.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the batch of commands pending delivery.
    ///
    /// Returns the batch in the order the shop returned it. A missing or
    /// non-array `data` key is an empty batch; a malformed element fails the
    /// whole fetch with [`QueueError::MalformedResponse`].
    pub async fn fetch_pending(&self) -> QueueResult<Vec<PendingCommand>> {
        let url = format!("{}/commands/fetch", self.api_url);
        debug!(url = %url, "Fetching pending commands");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "Fetch rejected");
            return Err(QueueError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(body = %body, "Fetch response");
        parse_fetch_body(&body)
    }

    /// Acknowledge processed commands so the shop retires them.
    ///
    /// Callers treat this as one-way: a failure is logged and the commands
    /// are simply re-fetched on the next cycle.
    pub async fn acknowledge(&self, ids: &[i64]) -> QueueResult<()> {
        let url = format!("{}/commands/acknowledge", self.api_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", USER_AGENT)
            .json(&AcknowledgeRequest { command_ids: ids })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "Acknowledge rejected");
            return Err(QueueError::AcknowledgeFailed {
                status: status.as_u16(),
            });
        }

        debug!(count = ids.len(), "Acknowledged commands");
        Ok(())
    }
}

impl std::fmt::Debug for ShopQueueClient {
    // Credential stays out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopQueueClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

/// Parse a 2xx fetch response body into a command batch.
///
/// The body must be a JSON object. `data` absent or not an array means no
/// pending commands; the shop sends that shape on quiet polls. Every array
/// element must carry `id`, `player_name`, and `command_line`.
pub fn parse_fetch_body(body: &str) -> QueueResult<Vec<PendingCommand>> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| QueueError::MalformedResponse(e.to_string()))?;

    let data = match json.get("data").and_then(|value| value.as_array()) {
        Some(array) => array,
        None => return Ok(Vec::new()),
    };

    let mut commands = Vec::with_capacity(data.len());
    for (index, element) in data.iter().enumerate() {
        let command: PendingCommand = serde_json::from_value(element.clone()).map_err(|e| {
            QueueError::MalformedResponse(format!("data[{}]: {}", index, e))
        })?;
        commands.push(command);
    }

    Ok(commands)
}
