//! Flat-file snapshot storage.
//!
//! Every archived table is one delimited file in the snapshot directory:
//! `<prefix><YYYY-MM-DD_HH-MM-SS>.<extension>`. The timestamp is UTC and
//! fixed width, so lexical file name order is chronological order even
//! across daylight saving changes. Creation and modification times are
//! never consulted.
//!
//! Files are written to a temporary name in the same directory and moved
//! into place only once complete, so a failed write never shows up as the
//! latest snapshot.
//!
//! Supports:
//! - Listing archived snapshots, newest first
//! - Loading the latest snapshot
//! - Appending a new snapshot (never overwrites)

pub mod diff;

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::SnapshotConfig;
use crate::delimited;
use crate::error::{Error, Result};
use crate::table::{ColumnMap, Table};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Archived file metadata, without the table contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub taken_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub taken_at: NaiveDateTime,
    pub table: Table,
}

pub struct SnapshotStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let defaults = SnapshotConfig::default();
        SnapshotStore {
            dir: dir.into(),
            prefix: defaults.prefix,
            extension: defaults.extension,
        }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        SnapshotStore {
            dir: config.dir.clone(),
            prefix: config.prefix.clone(),
            extension: config.extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Tab for `.tsv` files, comma for everything else.
    pub fn delimiter(&self) -> u8 {
        if self.extension.eq_ignore_ascii_case("tsv") {
            b'\t'
        } else {
            b','
        }
    }

    fn file_name(&self, taken_at: &NaiveDateTime) -> String {
        format!(
            "{}{}.{}",
            self.prefix,
            taken_at.format(TIMESTAMP_FORMAT),
            self.extension
        )
    }

    /// Timestamp encoded in `file_name`, if it is one of ours.
    fn parse_file_name(&self, file_name: &str) -> Option<NaiveDateTime> {
        let stamp = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
    }

    /// All snapshot files, newest first. A missing directory has none.
    pub fn list(&self) -> Result<Vec<SnapshotFile>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.parse_file_name(name) {
                Some(taken_at) => files.push(SnapshotFile { path, taken_at }),
                None => debug!(file = %path.display(), "ignoring file that is not a snapshot"),
            }
        }

        files.sort_by(|a, b| b.path.file_name().cmp(&a.path.file_name()));
        Ok(files)
    }

    /// The snapshot whose name sorts last, or `None` if nothing is archived.
    pub fn latest(&self) -> Result<Option<Snapshot>> {
        let Some(newest) = self.list()?.into_iter().next() else {
            return Ok(None);
        };

        let table = self.load(&newest.path)?;
        Ok(Some(Snapshot {
            path: newest.path,
            taken_at: newest.taken_at,
            table,
        }))
    }

    /// Read an archived file back into a `Table`.
    ///
    /// Columns are matched by header name, so their order in the file does
    /// not matter. The positional `ID` column is ignored.
    pub fn load(&self, path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let delimiter = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("tsv")) {
            b'\t'
        } else {
            self.delimiter()
        };

        let raw = delimited::read_table(file, delimiter).map_err(|e| Error::malformed(path, e.to_string()))?;
        if raw.headers.is_empty() {
            return Err(Error::malformed(path, "file is empty, expected a header row"));
        }
        Table::from_raw(&raw, &ColumnMap::canonical()).map_err(|e| match e {
            Error::SchemaMismatch { missing } => {
                Error::malformed(path, format!("missing column(s): {}", missing.join(", ")))
            }
            other => other,
        })
    }

    /// Archive `table` stamped with the current UTC time.
    pub fn save(&self, table: &Table) -> Result<PathBuf> {
        self.save_at(table, Utc::now().naive_utc())
    }

    /// Archive `table` under the given timestamp (second precision).
    ///
    /// Fails with `Error::Collision` if a snapshot with that name exists.
    pub fn save_at(&self, table: &Table, taken_at: NaiveDateTime) -> Result<PathBuf> {
        let path = self.dir.join(self.file_name(&taken_at));
        let delimiter = self.delimiter();

        self.publish(&path, |out| {
            delimited::write_table(out, table, delimiter).map_err(io::Error::from)
        })?;

        debug!(file = %path.display(), rows = table.len(), "snapshot written");
        Ok(path)
    }

    /// Write through a temporary file in the snapshot directory, then link
    /// it to `path` without replacing an existing file.
    ///
    /// On any failure the temporary file is removed and `path` is untouched.
    fn publish<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
    {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".racewatch-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| Error::io(&self.dir, e))?;

        write(&mut tmp).map_err(|e| Error::io(path, e))?;
        tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;

        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                Error::Collision {
                    path: path.to_path_buf(),
                }
            } else {
                Error::io(path, e.error)
            }
        })?;
        Ok(())
    }
}
