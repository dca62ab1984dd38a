//! Runtime configuration.
//!
//! Built once at startup and passed by reference to every collaborator:
//! defaults, then `config.toml`, then environment variables (a `.env` file is
//! loaded by the binary before this runs).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::report::ReportOptions;
use crate::table::ColumnMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub snapshots: SnapshotConfig,
    pub columns: ColumnMap,
    pub report: ReportOptions,
    pub mail: MailConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: String::new(),
            user_agent: concat!("racewatch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SourceConfig {
    pub fn require_url(&self) -> Result<&str> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Config(
                "source url is not set (config [source].url or URL)".to_string(),
            ));
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            dir: PathBuf::from("./tables"),
            prefix: "table_".to_string(),
            extension: "csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_server: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub subject: String,
    pub recipients: Vec<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        MailConfig {
            smtp_server: String::new(),
            port: 587,
            sender: String::new(),
            password: String::new(),
            subject: "Race calendar changes".to_string(),
            recipients: Vec::new(),
        }
    }
}

impl MailConfig {
    pub fn require_recipients(&self) -> Result<&[String]> {
        if self.recipients.is_empty() {
            return Err(Error::Config(
                "no report recipients (config [mail].recipients or EMAIL_RECEIVER_LIST)".to_string(),
            ));
        }
        Ok(&self.recipients)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when neither RUST_LOG nor a verbosity flag is given
    pub level: String,
    /// Plain-text copy of the log, appended to
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "warn".to_string(),
            file: None,
        }
    }
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

/// Split a comma separated address list, dropping spaces and empty items.
pub fn parse_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.replace(' ', ""))
        .filter(|item| !item.is_empty())
        .collect()
}

impl Config {
    /// `<config_dir>/racewatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "racewatch")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists, then
    /// apply environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Config::from_file(path)?,
            None => match Config::default_path().filter(|p| p.is_file()) {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from the variables the deployed tool has always read.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("URL") {
            self.source.url = url;
        }
        if let Some(list) = lookup("EMAIL_RECEIVER_LIST") {
            self.mail.recipients = parse_recipients(&list);
        }
        if let Some(sender) = lookup("EMAIL_SENDER") {
            self.mail.sender = sender;
        }
        if let Some(password) = lookup("EMAIL_APP_PASSWORD") {
            self.mail.password = password;
        }
        if let Some(subject) = lookup("EMAIL_SUBJECT") {
            self.mail.subject = subject;
        }
        if let Some(server) = lookup("SMTP_SERVER") {
            self.mail.smtp_server = server;
        }
        if let Some(port) = lookup("PORT") {
            self.mail.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{port}'")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportFormat;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_calendar_page() {
        let config = Config::default();
        assert_eq!(config.columns, ColumnMap::calendar());
        assert_eq!(config.snapshots.dir, PathBuf::from("./tables"));
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.source.timeout, Duration::from_secs(30));
        assert_eq!(config.report.format, ReportFormat::Html);
    }

    #[test]
    fn parses_a_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [source]
            url = "https://example.org/calendar"
            timeout = "2m"

            [snapshots]
            dir = "/var/lib/racewatch"

            [columns]
            label = "Title"

            [report]
            format = "text"
            added_heading = "New races"

            [mail]
            recipients = ["a@example.org", "b@example.org"]
            "#,
        )
        .unwrap();

        assert_eq!(config.source.url, "https://example.org/calendar");
        assert_eq!(config.source.timeout, Duration::from_secs(120));
        assert_eq!(config.snapshots.prefix, "table_");
        assert_eq!(config.columns.label, "Title");
        assert_eq!(config.columns.federation_id, "FFC");
        assert_eq!(config.report.format, ReportFormat::Text);
        assert_eq!(config.report.added_heading, "New races");
        assert_eq!(config.report.removed_heading, "Removed races");
        assert_eq!(config.mail.recipients.len(), 2);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[source]\ntimeout = \"soon\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        config.mail.subject = "from file".to_string();

        config
            .apply_env(env(&[
                ("URL", "https://example.org/cal"),
                ("EMAIL_RECEIVER_LIST", "a@example.org, b@example.org ,"),
                ("EMAIL_SUBJECT", "Calendar"),
                ("SMTP_SERVER", "smtp.example.org"),
                ("PORT", "2525"),
            ]))
            .unwrap();

        assert_eq!(config.source.url, "https://example.org/cal");
        assert_eq!(config.mail.recipients, vec!["a@example.org", "b@example.org"]);
        assert_eq!(config.mail.subject, "Calendar");
        assert_eq!(config.mail.smtp_server, "smtp.example.org");
        assert_eq!(config.mail.port, 2525);
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[("PORT", "smtp")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_url_is_reported() {
        assert!(SourceConfig::default().require_url().is_err());
    }

    #[test]
    fn empty_recipient_list_is_a_config_error() {
        assert!(matches!(MailConfig::default().require_recipients(), Err(Error::Config(_))));

        let mail = MailConfig {
            recipients: parse_recipients("a@example.org"),
            ..MailConfig::default()
        };
        assert_eq!(mail.require_recipients().unwrap(), ["a@example.org".to_string()]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = Config::from_file(Path::new("/nonexistent/racewatch.toml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
