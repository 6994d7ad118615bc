// crates/sentinel-providers/src/email.rs
// ============================================================================
// Module: SMTP Email Transport
// Description: Delivers formatted messages over SMTP.
// Purpose: Implement sentinel_core::EmailTransport for the Notification Router.
// Dependencies: sentinel_core::{EmailTransport, DeliveryOutcome, TransportError}, lettre
// ============================================================================

//! ## Overview
//! [`SmtpEmailTransport`] wraps a `lettre` `AsyncSmtpTransport` configured
//! once at construction (host, credentials, TLS). [`SmtpEmailTransport::send`]
//! builds one plaintext [`lettre::Message`] per call and hands it to the
//! transport; any envelope or delivery failure is reported as a
//! [`TransportError`], never panics. Per spec's Non-goal, this crate does
//! not define the SMTP wire format — that is `lettre`'s job.

use async_trait::async_trait;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use sentinel_core::DeliveryOutcome;
use sentinel_core::EmailTransport;
use sentinel_core::TransportError;

/// Delivers alert emails over SMTP via `lettre`.
#[derive(Clone)]
pub struct SmtpEmailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailTransport {
    /// Builds a transport against `relay_host` authenticating with
    /// `username`/`password`, sending as `from`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if `relay_host` or `from` cannot be
    /// parsed, or if the underlying SMTP client cannot be constructed.
    pub fn new(
        relay_host: &str,
        username: &str,
        password: &str,
        from: &str,
    ) -> Result<Self, TransportError> {
        let from: Mailbox =
            from.parse().map_err(|_error| TransportError::InvalidRecipient(from.to_string()))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay_host)
            .map_err(|error| TransportError::Rejected(error.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryOutcome, TransportError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_error| TransportError::InvalidRecipient(recipient.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|error| TransportError::Rejected(error.to_string()))?;

        let response = self.transport.send(message).await.map_err(|error| {
            if error.is_timeout() {
                TransportError::Timeout(std::time::Duration::from_secs(0))
            } else {
                TransportError::Rejected(error.to_string())
            }
        })?;

        if !response.is_positive() {
            return Err(TransportError::Rejected(response.code().to_string()));
        }

        Ok(DeliveryOutcome {
            success: true,
            details: serde_json::json!({ "code": response.code().to_string() }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_recipient_is_rejected_before_any_network_call() {
        let transport =
            SmtpEmailTransport::new("smtp.example.com", "user", "pass", "alerts@example.com")
                .expect("transport construction should succeed for a valid relay/from");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime must build");
        let result = runtime.block_on(transport.send("not-an-address", "subject", "body"));
        assert!(matches!(result, Err(TransportError::InvalidRecipient(_))));
    }

    #[test]
    fn malformed_from_address_is_rejected_at_construction() {
        let result = SmtpEmailTransport::new("smtp.example.com", "user", "pass", "not-an-address");
        assert!(matches!(result, Err(TransportError::InvalidRecipient(_))));
    }
}
