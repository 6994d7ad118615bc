// crates/sentinel-broker/src/router.rs
// ============================================================================
// Module: Notification Router (C3)
// Description: Resolves channels for a message and dispatches to transports concurrently.
// Purpose: Give the Generator and Escalation Manager one call that fans out and never blocks on
//   one bad channel.
// Dependencies: sentinel-core::interfaces, tokio::{sync, time}
// ============================================================================

//! ## Overview
//! [`NotificationRouter::dispatch`] resolves the effective channel set for
//! one message (see [`crate::routing`]), formats it once (see
//! [`crate::format`]), then submits one task per channel to a bounded
//! worker pool. Each task gets a 30s deadline; a channel that times out or
//! errors produces a failed [`DeliveryResult`] without affecting its
//! siblings. [`NotificationRouter::dispatch_batch`] wraps each message's
//! full fan-out in a 60s outer deadline.
//!
//! The router does not retry: "retry is a caller policy." It does keep an
//! in-memory delivery history keyed by `notification_id`, pruned by TTL on
//! every write.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use futures::future::join_all;
use sentinel_core::Channel;
use sentinel_core::EmailTransport;
use sentinel_core::TeamsTransport;
use sentinel_core::TransportError;
use time::OffsetDateTime;

use crate::format::FormattedMessage;

/// Per-channel dispatch deadline, per the routing spec's "waits up to 30s
/// per task."
pub const PER_CHANNEL_TIMEOUT: Duration = Duration::from_secs(30);
/// Per-message outer deadline used by [`NotificationRouter::dispatch_batch`].
pub const PER_MESSAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of delivering one message on one channel.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    /// Whether the transport reported success.
    pub success: bool,
    /// Populated on failure: the exception message, timeout notice, or the
    /// transport's rejection reason.
    pub error_message: Option<String>,
}

impl DeliveryResult {
    /// A successful delivery.
    fn ok() -> Self {
        Self { success: true, error_message: None }
    }

    /// A failed delivery, with the reason recorded for operator diagnosis.
    fn failed(error_message: impl Into<String>) -> Self {
        Self { success: false, error_message: Some(error_message.into()) }
    }
}

/// One completed dispatch, retained in the delivery history.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    /// When dispatch was attempted.
    pub dispatched_at: OffsetDateTime,
    /// Per-channel outcome.
    pub channels: BTreeMap<Channel, DeliveryResult>,
    /// The message's title, retained for operator-facing history views.
    pub summary: String,
}

/// Per-channel recipient addresses for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    /// Teams incoming-webhook URL.
    pub teams_webhook_url: Option<String>,
    /// Email recipient address.
    pub email_address: Option<String>,
}

/// Routes and dispatches [`FormattedMessage`]s over a bounded worker pool.
pub struct NotificationRouter {
    teams: Arc<dyn TeamsTransport>,
    email: Arc<dyn EmailTransport>,
    semaphore: Arc<tokio::sync::Semaphore>,
    history: RwLock<BTreeMap<String, DeliveryRecord>>,
    history_retention: time::Duration,
}

impl NotificationRouter {
    /// Builds a router with `max_concurrent` bounding the total number of
    /// in-flight channel dispatches across every call, and
    /// `history_retention_hours` controlling TTL pruning of delivery
    /// history (spec default 24).
    #[must_use]
    pub fn new(
        teams: Arc<dyn TeamsTransport>,
        email: Arc<dyn EmailTransport>,
        max_concurrent: usize,
        history_retention_hours: u64,
    ) -> Self {
        Self {
            teams,
            email,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
            history: RwLock::new(BTreeMap::new()),
            history_retention: time::Duration::hours(
                i64::try_from(history_retention_hours).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Dispatches `message` on every channel in `channels`, bounding
    /// concurrency via the shared semaphore and enforcing
    /// [`PER_CHANNEL_TIMEOUT`] per channel. Records the outcome in the
    /// delivery history under `message.notification_id`.
    pub async fn dispatch(
        &self,
        message: &FormattedMessage,
        channels: &BTreeSet<Channel>,
        recipients: &Recipients,
    ) -> BTreeMap<Channel, DeliveryResult> {
        let mut results = BTreeMap::new();
        let mut tasks = Vec::with_capacity(channels.len());

        for &channel in channels {
            let permit = Arc::clone(&self.semaphore);
            let teams = Arc::clone(&self.teams);
            let email = Arc::clone(&self.email);
            let message = message.clone();
            let recipients = recipients.clone();

            tasks.push(async move {
                let _permit = permit.acquire_owned().await.ok();
                let outcome = tokio::time::timeout(PER_CHANNEL_TIMEOUT, async {
                    dispatch_one(channel, &teams, &email, &message, &recipients).await
                })
                .await;
                let result = match outcome {
                    Ok(result) => result,
                    Err(_) => DeliveryResult::failed(format!(
                        "channel {} timed out after 30s",
                        channel_label(channel)
                    )),
                };
                (channel, result)
            });
        }

        for (channel, result) in join_all(tasks).await {
            results.insert(channel, result);
        }

        self.record_history(message, &results);
        results
    }

    /// Dispatches one message per entry in `batch`, each under
    /// [`PER_MESSAGE_TIMEOUT`], running the whole batch concurrently.
    pub async fn dispatch_batch(
        &self,
        batch: Vec<(FormattedMessage, BTreeSet<Channel>, Recipients)>,
    ) -> Vec<BTreeMap<Channel, DeliveryResult>> {
        let mut tasks = Vec::with_capacity(batch.len());
        for (message, channels, recipients) in batch {
            tasks.push(async move {
                let dispatch = self.dispatch(&message, &channels, &recipients);
                match tokio::time::timeout(PER_MESSAGE_TIMEOUT, dispatch).await {
                    Ok(results) => results,
                    Err(_) => channels
                        .into_iter()
                        .map(|channel| {
                            let result =
                                DeliveryResult::failed("message dispatch timed out after 60s");
                            (channel, result)
                        })
                        .collect(),
                }
            });
        }
        join_all(tasks).await
    }

    /// Records `results` under `message.notification_id`, first pruning
    /// entries older than the configured retention window.
    fn record_history(
        &self,
        message: &FormattedMessage,
        results: &BTreeMap<Channel, DeliveryResult>,
    ) {
        let now = message.formatted_at;
        let Ok(mut history) = self.history.write() else { return };
        history.retain(|_, record| now - record.dispatched_at < self.history_retention);
        history.insert(
            message.notification_id.clone(),
            DeliveryRecord {
                dispatched_at: now,
                channels: results.clone(),
                summary: message.title.clone(),
            },
        );
    }

    /// Returns the recorded outcome for `notification_id`, if it has not
    /// yet been pruned by TTL.
    #[must_use]
    pub fn history_for(&self, notification_id: &str) -> Option<DeliveryRecord> {
        self.history.read().ok()?.get(notification_id).cloned()
    }
}

/// Sends `message` on `channel`, resolving the outcome into a [`DeliveryResult`].
async fn dispatch_one(
    channel: Channel,
    teams: &Arc<dyn TeamsTransport>,
    email: &Arc<dyn EmailTransport>,
    message: &FormattedMessage,
    recipients: &Recipients,
) -> DeliveryResult {
    let outcome = match channel {
        Channel::Teams => match recipients.teams_webhook_url.as_deref() {
            Some(webhook_url) => teams.send(webhook_url, &render_body(message)).await,
            None => return DeliveryResult::failed("no teams webhook configured for this alert"),
        },
        Channel::Email => match recipients.email_address.as_deref() {
            Some(address) => email.send(address, &message.title, &render_body(message)).await,
            None => return DeliveryResult::failed("no email address configured for this alert"),
        },
    };

    match outcome {
        Ok(delivery) if delivery.success => DeliveryResult::ok(),
        Ok(delivery) => DeliveryResult::failed(delivery.details.to_string()),
        Err(TransportError::InvalidRecipient(recipient)) => {
            DeliveryResult::failed(format!("invalid recipient: {recipient}"))
        }
        Err(TransportError::Timeout(duration)) => {
            DeliveryResult::failed(format!("transport timed out after {}s", duration.as_secs()))
        }
        Err(TransportError::Rejected(reason)) => DeliveryResult::failed(reason),
    }
}

/// Lowercase wire label for a channel, used in error messages instead of
/// `Debug` formatting (the workspace denies `clippy::use_debug`).
const fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Teams => "teams",
        Channel::Email => "email",
    }
}

/// Renders a message's body plus its facts as plain text. Both transports
/// consume the same rendering; the title (already severity-prefixed) is
/// passed separately as the subject/card-heading.
fn render_body(message: &FormattedMessage) -> String {
    let mut body = message.body.clone();
    for (label, value) in &message.facts {
        body.push_str(&format!("\n{label}: {value}"));
    }
    body
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use sentinel_core::AlertId;
    use sentinel_core::DeliveryOutcome;
    use sentinel_core::Severity;

    use super::*;
    use crate::format::format_message;

    struct AlwaysOk;

    #[async_trait]
    impl TeamsTransport for AlwaysOk {
        async fn send(
            &self,
            _webhook_url: &str,
            _message: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Ok(DeliveryOutcome { success: true, details: serde_json::Value::Null })
        }
    }

    #[async_trait]
    impl EmailTransport for AlwaysOk {
        async fn send(
            &self,
            _recipient: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Ok(DeliveryOutcome { success: true, details: serde_json::Value::Null })
        }
    }

    struct AlwaysRejects;

    #[async_trait]
    impl TeamsTransport for AlwaysRejects {
        async fn send(
            &self,
            _webhook_url: &str,
            _message: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Err(TransportError::Rejected("webhook disabled".to_string()))
        }
    }

    #[async_trait]
    impl EmailTransport for AlwaysRejects {
        async fn send(
            &self,
            _recipient: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Ok(DeliveryOutcome { success: true, details: serde_json::Value::Null })
        }
    }

    fn sample_message() -> FormattedMessage {
        format_message(
            "note-1".to_string(),
            AlertId::new("alert-1"),
            "stalled",
            "no rows in 10m",
            Severity::High,
            &BTreeMap::new(),
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn one_channel_failure_does_not_affect_the_other() {
        let router = NotificationRouter::new(Arc::new(AlwaysRejects), Arc::new(AlwaysOk), 10, 24);
        let recipients = Recipients {
            teams_webhook_url: Some("https://example.test/webhook".to_string()),
            email_address: Some("oncall@example.test".to_string()),
        };
        let results = router
            .dispatch(
                &sample_message(),
                &BTreeSet::from([Channel::Teams, Channel::Email]),
                &recipients,
            )
            .await;
        assert!(!results[&Channel::Teams].success);
        assert!(results[&Channel::Email].success);
    }

    #[tokio::test]
    async fn missing_recipient_fails_without_calling_the_transport() {
        let router = NotificationRouter::new(Arc::new(AlwaysOk), Arc::new(AlwaysOk), 10, 24);
        let results = router
            .dispatch(&sample_message(), &BTreeSet::from([Channel::Teams]), &Recipients::default())
            .await;
        assert!(!results[&Channel::Teams].success);
    }

    #[tokio::test]
    async fn delivery_history_is_recorded_by_notification_id() {
        let router = NotificationRouter::new(Arc::new(AlwaysOk), Arc::new(AlwaysOk), 10, 24);
        let recipients = Recipients {
            teams_webhook_url: Some("https://example.test/webhook".to_string()),
            email_address: None,
        };
        router.dispatch(&sample_message(), &BTreeSet::from([Channel::Teams]), &recipients).await;
        let record = router.history_for("note-1").expect("recorded");
        assert!(record.channels[&Channel::Teams].success);
    }
}
