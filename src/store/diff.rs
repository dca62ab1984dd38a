//! Snapshot comparison engine.
//!
//! Compares the current table against the prior snapshot:
//! - Rows identical on all six fields in both tables are unchanged
//! - Rows whose Label is unknown to the prior table are added
//! - Rows whose Label vanished from the current table are removed
//! - Labels with more than one changed row are modified (Before/After pairs)
//!
//! Matching is by Label only. Labels are assumed to be effectively unique
//! within one table; when they repeat, rows sharing a Label cannot be told
//! apart and may show up as spurious modified pairs or as added/removed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::table::{Row, Table};

/// Which side of the comparison a modified row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Modif {
    Before,
    After,
}

impl Modif {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modif::Before => "Before",
            Modif::After => "After",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifiedRow {
    #[serde(flatten)]
    pub row: Row,
    #[serde(rename = "Modif")]
    pub modif: Modif,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub modified: Vec<ModifiedRow>,
    pub added: Table,
    pub removed: Table,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare `current` against `prior` and classify every changed row.
pub fn compare_tables(current: &Table, prior: &Table) -> DiffResult {
    // same rows in the same order: nothing to report
    if current == prior {
        return DiffResult::default();
    }

    // full outer join on all fields: keep rows with no identical partner
    let prior_rows: HashSet<&Row> = prior.iter().collect();
    let current_rows: HashSet<&Row> = current.iter().collect();

    let changed: Vec<(&Row, Modif)> = current
        .iter()
        .filter(|row| !prior_rows.contains(row))
        .map(|row| (row, Modif::After))
        .chain(
            prior
                .iter()
                .filter(|row| !current_rows.contains(row))
                .map(|row| (row, Modif::Before)),
        )
        .collect();

    // outer join on Label only
    let prior_labels: HashSet<&str> = prior.iter().map(|r| r.label.as_str()).collect();
    let current_labels: HashSet<&str> = current.iter().map(|r| r.label.as_str()).collect();

    let added = current
        .iter()
        .filter(|row| !prior_labels.contains(row.label.as_str()))
        .cloned()
        .collect();

    let removed = prior
        .iter()
        .filter(|row| !current_labels.contains(row.label.as_str()))
        .cloned()
        .collect();

    DiffResult {
        modified: modified_rows(&changed),
        added: Table::new(added),
        removed: Table::new(removed),
    }
}

/// Changed rows whose Label occurs more than once among the changed rows.
///
/// Join order is kept as is: current-side After rows, then prior-side
/// Before rows.
fn modified_rows(changed: &[(&Row, Modif)]) -> Vec<ModifiedRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (row, _) in changed {
        *counts.entry(row.label.as_str()).or_insert(0) += 1;
    }

    changed
        .iter()
        .filter(|(row, _)| counts[row.label.as_str()] > 1)
        .map(|(row, modif)| ModifiedRow {
            row: (*row).clone(),
            modif: *modif,
        })
        .collect()
}
