//! Mail delivery for the daily report

use crate::config::MailConfig;
use async_trait::async_trait;
use cleanlog_common::{Error, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Anything that can deliver an [`Email`]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// SMTP relay transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS; any other port negotiates STARTTLS
    pub fn new(config: &MailConfig) -> Result<Self> {
        let relay = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        };
        let builder = relay
            .map_err(|e| Error::Config(format!("Invalid SMTP relay '{}': {}", config.smtp_host, e)))?
            .port(config.smtp_port);

        let builder = match (&config.smtp_user, &config.smtp_pass) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|e| Error::Mail(format!("invalid sender: {}", e)))?)
            .to(email.to.parse().map_err(|e| Error::Mail(format!("invalid recipient: {}", e)))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| Error::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Mail(e.to_string()))?;

        info!("Mail sent to {}: {}", email.to, email.subject);
        Ok(())
    }
}
