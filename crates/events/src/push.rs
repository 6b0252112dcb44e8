//! Best-effort push-transport client.
//!
//! The transport accepts a batch of opaque device tokens plus
//! title/body/link and performs delivery on its own terms. The engine
//! treats it as advisory: every failure is logged and swallowed, and the
//! caller is expected to invoke [`PushClient::send`] from a spawned task so
//! the triggering mutation never waits on delivery.

use std::time::Duration;

use serde::Serialize;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload posted to the push transport endpoint.
#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    tokens: &'a [String],
    title: &'a str,
    body: &'a str,
    link: Option<&'a str>,
}

/// Fire-and-forget client for the external push transport.
///
/// When no endpoint is configured the client is a no-op, which keeps local
/// development free of a transport dependency.
pub struct PushClient {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl PushClient {
    /// Create a client for the given transport endpoint (`None` disables
    /// delivery entirely).
    pub fn new(endpoint: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, endpoint }
    }

    /// Returns `true` when a transport endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Deliver one batch. Never returns an error: exhausted retries are
    /// logged at WARN and dropped.
    pub async fn send(&self, tokens: &[String], title: &str, body: &str, link: Option<&str>) {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!("Push transport not configured, skipping delivery");
            return;
        };
        if tokens.is_empty() {
            return;
        }

        let payload = PushPayload {
            tokens,
            title,
            body,
            link,
        };

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(endpoint, &payload).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        tokens = tokens.len(),
                        error = %e,
                        "Push delivery attempt failed"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        tracing::warn!(tokens = tokens.len(), "Push delivery abandoned after retries");
    }

    /// One POST attempt; non-2xx statuses count as failures.
    async fn try_send(
        &self,
        endpoint: &str,
        payload: &PushPayload<'_>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = self.client.post(endpoint).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(format!("push transport returned HTTP {}", response.status()).into());
        }
        Ok(())
    }
}
