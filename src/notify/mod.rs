//! Message delivery.
//!
//! One message per recipient. A failed delivery is recorded and the loop
//! moves on to the next recipient.

pub mod console;
pub mod smtp;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::report::ReportFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub body: String,
    pub content: ContentKind,
}

impl Message {
    /// A rendered change report.
    pub fn report(subject: &str, body: String, format: ReportFormat) -> Self {
        let content = match format {
            ReportFormat::Html => ContentKind::Html,
            ReportFormat::Text => ContentKind::Plain,
        };
        Message {
            subject: subject.to_string(),
            body,
            content,
        }
    }

    /// A failed cycle, reported to the operator with the error as body.
    pub fn failure(subject: &str, error: &Error) -> Self {
        Message {
            subject: format!("{subject} [error]"),
            body: error.to_string(),
            content: ContentKind::Plain,
        }
    }
}

pub trait Notifier {
    fn name(&self) -> &'static str;
    fn deliver(&self, recipient: &str, message: &Message) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl DeliveryReport {
    /// True when there were recipients and none of them got the message.
    pub fn nothing_delivered(&self) -> bool {
        self.delivered.is_empty() && !self.failed.is_empty()
    }
}

pub fn notify_all(notifier: &dyn Notifier, recipients: &[String], message: &Message) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for recipient in recipients {
        match notifier.deliver(recipient, message) {
            Ok(()) => {
                info!(notifier = notifier.name(), recipient = %recipient, "message sent");
                report.delivered.push(recipient.clone());
            }
            Err(e) => {
                warn!(notifier = notifier.name(), recipient = %recipient, error = %e, "delivery failed");
                report.failed.push((recipient.clone(), e));
            }
        }
    }

    report
}
