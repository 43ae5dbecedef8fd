use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, Mailboxes, MultiPart, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

use crate::{config::SmtpConfig, message::OutgoingEmail};

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Invalid email address format: {0}")]
    AddressFormat(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    SmtpTransport(#[from] lettre::transport::smtp::Error),

    #[error("Failed to connect to SMTP relay: {0}")]
    SmtpRelay(lettre::transport::smtp::Error),

    /// Failure reported by a mailer that is not backed by lettre.
    #[error("{0}")]
    Backend(String),
}

/// Delivers a composed email using the relay settings of the current request.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, smtp: &SmtpConfig, email: OutgoingEmail) -> Result<(), MailerError>;
}

/// Sends through an SMTP relay with lettre. A transport is built for every
/// message, so changed credentials apply to the next submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub const fn new() -> Self {
        Self
    }

    /// Implicit TLS on the secure port; elsewhere STARTTLS is used when the
    /// relay offers it and the session stays plaintext when it does not.
    fn transport(smtp: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let builder = if smtp.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                .map_err(MailerError::SmtpRelay)?
        } else {
            let tls = TlsParameters::new(smtp.host.clone()).map_err(MailerError::SmtpRelay)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .tls(Tls::Opportunistic(tls))
        };

        let creds = Credentials::new(smtp.user.clone(), smtp.pass.clone());

        Ok(builder.port(smtp.port).credentials(creds).build())
    }
}

pub fn build_message(email: OutgoingEmail) -> Result<Message, MailerError> {
    let from = Mailbox::new(Some(email.from_name), email.from_address.parse()?);

    let mut builder = Message::builder().from(from).subject(email.subject);

    // The recipient setting may list several comma-separated addresses
    for mailbox in email.to.parse::<Mailboxes>()? {
        builder = builder.to(mailbox);
    }

    // A malformed submitter address must not block the notification
    if let Some(reply_to) = email.reply_to {
        match reply_to.parse::<Mailbox>() {
            Ok(mailbox) => builder = builder.reply_to(mailbox),
            Err(e) => tracing::debug!("Skipping reply-to '{}': {}", reply_to, e),
        }
    }

    let message = match email.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.text, html))?,
        None => builder.header(ContentType::TEXT_PLAIN).body(email.text)?,
    };

    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, smtp: &SmtpConfig, email: OutgoingEmail) -> Result<(), MailerError> {
        let to = email.to.clone();
        let subject = email.subject.clone();
        let message = build_message(email)?;
        let mailer = Self::transport(smtp)?;

        tracing::info!(
            "Sending email to '{}' with subject '{}' via {}:{}",
            to,
            subject,
            smtp.host,
            smtp.port
        );

        mailer.send(message).await?;

        tracing::info!("Message to {} sent successfully", to);

        Ok(())
    }
}
