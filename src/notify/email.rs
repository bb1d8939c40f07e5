use lettre::message::{header, Mailbox, Message as MailMessage};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::DeliveryError;

use super::{Message, Notifier};

/// SMTP delivery (STARTTLS, authenticated as `EMAIL_USER`).
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

impl EmailNotifier {
    pub fn new(cfg: &EmailConfig) -> Result<Self, DeliveryError> {
        let from = parse_mailbox(&cfg.user)?;
        let to = parse_mailbox(&cfg.to)?;

        let creds = Credentials::new(cfg.user.clone(), cfg.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.server)
            .map_err(|e| DeliveryError::Smtp(format!("invalid SMTP_SERVER {:?}: {e}", cfg.server)))?
            .port(cfg.port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }

    pub fn build_message(&self, msg: &Message) -> Result<MailMessage, DeliveryError> {
        MailMessage::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(msg.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(msg.body.clone())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, msg: &Message) -> Result<(), DeliveryError> {
        let mail = self.build_message(msg)?;
        self.mailer
            .send(mail)
            .await
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;
        tracing::info!(target: "notify", to = %self.to, "email sent");
        Ok(())
    }
}
