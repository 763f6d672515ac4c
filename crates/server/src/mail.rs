//! Outbound email dispatch.
//!
//! Sends are fire-and-forget: the OTP row is already persisted when the send
//! is spawned, and a delivery failure is logged without rolling anything
//! back. No ordering guarantee exists between "record persisted" and "email
//! delivered".

use lettre::AsyncTransport;
use lettre::message::header::ContentType;

use crate::AppResources;

/// Spawn a plain-text email send without awaiting the result.
pub fn spawn_send(resources: &AppResources, to: String, subject: &'static str, body: String) {
    let mailer = resources.mailer.clone();
    let from = resources.config.smtp.from.clone();

    tokio::spawn(async move {
        let message = match lettre::Message::builder()
            .from(match from.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    tracing::error!(error = %e, "Invalid smtp.from address");
                    return;
                }
            })
            .to(match to.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    tracing::error!(error = %e, recipient = %to, "Invalid recipient address");
                    return;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(error = %e, recipient = %to, "Failed to build email");
                return;
            }
        };

        if let Err(e) = mailer.send(message).await {
            tracing::error!(error = %e, recipient = %to, subject = subject, "Failed to send email");
        } else {
            tracing::info!(recipient = %to, subject = subject, "Email sent");
        }
    });
}
