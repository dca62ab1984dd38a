//! Prints messages instead of sending them (`run --dry-run`).

use std::io::Write;
use std::sync::Mutex;

use crate::error::{Error, Result};

use super::{Message, Notifier};

pub struct ConsoleNotifier<W: Write = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        ConsoleNotifier {
            out: Mutex::new(std::io::stdout()),
        }
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        ConsoleNotifier { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver(&self, recipient: &str, message: &Message) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::Mail("console writer poisoned".to_string()))?;
        let write = writeln!(
            out,
            "To: {recipient}\nSubject: {}\n\n{}",
            message.subject, message.body
        );
        write.map_err(|e| Error::Mail(e.to_string()))
    }
}
