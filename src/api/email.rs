//! Email delivery abstraction and SMTP sender.
//!
//! Workflow handlers build an [`EmailMessage`] and hand it to an
//! [`EmailSender`] on the blocking pool, since SMTP delivery blocks.
//! Delivery is a single attempt; a failure surfaces immediately to the
//! handler, which decides how to report it (502 for verification mail
//! the user is waiting on, 500 for reset mail).
//! The default sender for local dev is [`LogEmailSender`], which logs and
//! returns `Ok(())`.

use anyhow::{Context, Result};
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::info;

use crate::cli::globals::SmtpSettings;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Email delivery abstraction consumed by the workflow handlers.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            text = %message.text,
            "email send stub"
        );
        Ok(())
    }
}

/// SMTP sender over STARTTLS with a pooled transport.
pub struct SmtpEmailSender {
    mailer: SmtpTransport,
    sender: String,
}

impl SmtpEmailSender {
    /// Build the transport once; sends reuse the pooled connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host is invalid.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let mailer = SmtpTransport::starttls_relay(&settings.host)
            .context("failed to create SMTP transport")?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().to_string(),
            ))
            .port(settings.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self {
            mailer,
            sender: settings.sender.clone(),
        })
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("Clinic App <{}>", self.sender)
                    .parse()
                    .context("invalid sender address")?,
            )
            .to(message.to.parse().context("invalid recipient address")?)
            .subject(&message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.html.clone()),
                    ),
            )
            .context("failed to build email")?;

        self.mailer.send(&email).context("failed to send email")?;
        Ok(())
    }
}

/// Verification email pointing at the confirm-email link.
#[must_use]
pub fn verification_email(to: &str, link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify Your Account".to_string(),
        html: format!(
            "<h1>Welcome!</h1>\n\
             <p>Please verify your account by clicking the link below:</p>\n\
             <a href=\"{link}\">Verify Account</a>"
        ),
        text: format!("Please verify your account by visiting: {link}"),
    }
}

/// Password-reset email pointing at the reset link, noting the 20 minute validity.
#[must_use]
pub fn password_reset_email(to: &str, link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your Clinic App Password".to_string(),
        html: format!(
            "<div style=\"font-family: sans-serif; line-height: 1.5;\">\n\
               <h2>Password Reset Request</h2>\n\
               <p>You requested a password reset. Click the button below to set a new password:</p>\n\
               <a href=\"{link}\">Reset My Password</a>\n\
               <p>This link is valid for <b>20 minutes</b> only.</p>\n\
               <p>If you didn't request this, please ignore this email.</p>\n\
             </div>"
        ),
        text: format!("Reset your password here: {link}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_carries_link_in_both_parts() {
        let message = verification_email("a@b.com", "https://clinic.test/auth/confirmemail?x=1");
        assert_eq!(message.to, "a@b.com");
        assert_eq!(message.subject, "Verify Your Account");
        assert!(message.html.contains("https://clinic.test/auth/confirmemail?x=1"));
        assert!(message.text.contains("https://clinic.test/auth/confirmemail?x=1"));
    }

    #[test]
    fn reset_email_mentions_validity_window() {
        let message = password_reset_email("a@b.com", "https://clinic.test/auth/reset-password/1/t");
        assert_eq!(message.subject, "Reset your Clinic App Password");
        assert!(message.html.contains("20 minutes"));
        assert!(message.text.starts_with("Reset your password here: "));
    }

    #[test]
    fn log_sender_always_succeeds() {
        let message = verification_email("a@b.com", "https://clinic.test/x");
        assert!(LogEmailSender.send(&message).is_ok());
    }
}
