//! Outbound mail over SMTP. The only message this system sends is the
//! password-reset link.

use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

use crate::config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP is not configured")]
    NotConfigured,

    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

fn transport() -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
    let smtp = &config::config().smtp;
    if smtp.host.is_empty() {
        return Err(MailError::NotConfigured);
    }

    // Credential-less hosts (local dev relays) get a plain connection
    if smtp.username.is_empty() {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            .port(smtp.port)
            .build())
    } else {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build())
    }
}

/// Email a reset link. The link carries a signed, time-limited token; nothing
/// is persisted server-side.
pub async fn send_password_reset(to: &str, reset_url: &str) -> Result<(), MailError> {
    let smtp = &config::config().smtp;

    let message = Message::builder()
        .from(smtp
            .from
            .parse()
            .map_err(|_| MailError::Address(smtp.from.clone()))?)
        .to(to.parse().map_err(|_| MailError::Address(to.to_string()))?)
        .subject("Reset your password")
        .header(ContentType::TEXT_PLAIN)
        .body(format!(
            "A password reset was requested for your account.\n\n\
             Follow this link within the next hour to choose a new password:\n\n{}\n\n\
             If you did not request this, you can ignore this message.",
            reset_url
        ))
        .map_err(|e| MailError::Message(e.to_string()))?;

    transport()?
        .send(message)
        .await
        .map_err(|e| MailError::Smtp(e.to_string()))?;

    info!("Sent password reset mail");
    Ok(())
}
