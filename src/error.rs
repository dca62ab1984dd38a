//! Error types shared by every stage of a cycle.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that end a cycle. All of them are reported to the operator.
#[derive(Debug, Error)]
pub enum Error {
    /// A fetched or archived table lacks one or more required columns.
    #[error("table is missing expected column(s): {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// The page at the source url has no table with the expected columns.
    #[error("no table with the expected columns found at {url}")]
    NoMatchingTable { url: String },

    /// An archived snapshot could not be read back.
    #[error("malformed snapshot {}: {reason}", .path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    /// A snapshot with the same timestamp already exists.
    #[error("snapshot {} already exists, refusing to overwrite it", .path.display())]
    Collision { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("delimited output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Error::MalformedSnapshot {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_missing_columns() {
        let err = Error::SchemaMismatch {
            missing: vec!["FFC".into(), "SLF".into()],
        };
        assert_eq!(err.to_string(), "table is missing expected column(s): FFC, SLF");
    }

    #[test]
    fn collision_names_the_file() {
        let err = Error::Collision {
            path: PathBuf::from("tables/table_2024-05-01_10-00-00.csv"),
        };
        assert!(err.to_string().contains("table_2024-05-01_10-00-00.csv"));
    }
}
