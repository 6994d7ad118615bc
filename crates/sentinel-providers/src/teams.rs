// crates/sentinel-providers/src/teams.rs
// ============================================================================
// Module: Teams Webhook Transport
// Description: Delivers formatted messages to a Microsoft Teams incoming webhook.
// Purpose: Implement sentinel_core::TeamsTransport for the Notification Router.
// Dependencies: sentinel_core::{TeamsTransport, DeliveryOutcome, TransportError}, reqwest
// ============================================================================

//! ## Overview
//! [`TeamsWebhookTransport`] posts a `MessageCard`-shaped JSON payload to an
//! incoming webhook URL, per spec's Non-goal "defining the wire format of
//! third-party chat services" — the payload shape here is Teams' own
//! published connector card format, not something this crate invents. A
//! per-call timeout bounds the request; any I/O or non-2xx response is
//! reported as a [`TransportError`], never panics or retries (retry is the
//! Router's caller's policy, per spec §4.3).

use std::time::Duration;

use async_trait::async_trait;
use sentinel_core::DeliveryOutcome;
use sentinel_core::TeamsTransport;
use sentinel_core::TransportError;

/// Posts formatted alert messages to a Teams incoming webhook.
#[derive(Debug, Clone)]
pub struct TeamsWebhookTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl TeamsWebhookTransport {
    /// Builds a transport with the given per-request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { client: reqwest::Client::new(), timeout }
    }
}

impl Default for TeamsWebhookTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl TeamsTransport for TeamsWebhookTransport {
    async fn send(
        &self,
        webhook_url: &str,
        message: &str,
    ) -> Result<DeliveryOutcome, TransportError> {
        let url = reqwest::Url::parse(webhook_url)
            .map_err(|error| TransportError::InvalidRecipient(error.to_string()))?;

        let payload = serde_json::json!({
            "@type": "MessageCard",
            "@context": "https://schema.org/extensions",
            "text": message,
        });

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    TransportError::Timeout(self.timeout)
                } else {
                    TransportError::Rejected(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(format!("webhook responded with status {status}")));
        }

        Ok(DeliveryOutcome {
            success: true,
            details: serde_json::json!({ "status": status.as_u16() }),
        })
    }
}
