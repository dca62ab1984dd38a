//! SMTP delivery over STARTTLS with login credentials.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::{Error, Result};

use super::{ContentKind, Message, Notifier};

pub struct SmtpNotifier {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        if config.smtp_server.trim().is_empty() {
            return Err(Error::Config(
                "smtp server is not set (config [mail].smtp_server or SMTP_SERVER)".to_string(),
            ));
        }

        let sender: Mailbox = config.sender.parse().map_err(|e| {
            Error::Config(format!("invalid sender address '{}': {e}", config.sender))
        })?;

        let transport = SmtpTransport::starttls_relay(config.smtp_server.trim())
            .map_err(|e| Error::Mail(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(config.sender.clone(), config.password.clone()))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(SmtpNotifier { transport, sender })
    }
}

impl Notifier for SmtpNotifier {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn deliver(&self, recipient: &str, message: &Message) -> Result<()> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| Error::Mail(format!("invalid recipient '{recipient}': {e}")))?;

        let content_type = match message.content {
            ContentKind::Html => ContentType::TEXT_HTML,
            ContentKind::Plain => ContentType::TEXT_PLAIN,
        };

        let email = lettre::Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(content_type)
            .body(message.body.clone())
            .map_err(|e| Error::Mail(e.to_string()))?;

        self.transport
            .send(&email)
            .map_err(|e| Error::Mail(format!("{recipient}: {e}")))?;
        Ok(())
    }
}
