//! Calendar table model.
//!
//! A `Table` is an ordered list of `Row`s carrying the six canonical columns.
//! Untyped tables (`RawTable`) come from html pages and snapshot files and
//! are checked against the column set when converted with `Table::from_raw`.
//!
//! Row position is never part of a row's identity. `Label` is the join key.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Date,
    Type,
    Club,
    Label,
    FederationId,
    LeagueId,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::Type,
        Column::Club,
        Column::Label,
        Column::FederationId,
        Column::LeagueId,
    ];

    /// Canonical header text, as written to snapshot files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Type => "Type",
            Column::Club => "Club",
            Column::Label => "Label",
            Column::FederationId => "FederationID",
            Column::LeagueId => "LeagueID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Club")]
    pub club: String,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "FederationID")]
    pub federation_id: String,
    #[serde(rename = "LeagueID")]
    pub league_id: String,
}

impl Row {
    pub fn new(
        date: impl Into<String>,
        kind: impl Into<String>,
        club: impl Into<String>,
        label: impl Into<String>,
        federation_id: impl Into<String>,
        league_id: impl Into<String>,
    ) -> Self {
        Row {
            date: date.into(),
            kind: kind.into(),
            club: club.into(),
            label: label.into(),
            federation_id: federation_id.into(),
            league_id: league_id.into(),
        }
    }

    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Date => &self.date,
            Column::Type => &self.kind,
            Column::Club => &self.club,
            Column::Label => &self.label,
            Column::FederationId => &self.federation_id,
            Column::LeagueId => &self.league_id,
        }
    }

    /// Field values in canonical column order.
    pub fn fields(&self) -> [&str; 6] {
        Column::ALL.map(|c| self.get(c))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Keep the six mapped columns of `raw`, in canonical order.
    ///
    /// Extra columns are dropped. Rows shorter than the header are padded
    /// with empty cells.
    pub fn from_raw(raw: &RawTable, columns: &ColumnMap) -> Result<Table> {
        let mut indices = [0usize; 6];
        let mut missing = Vec::new();

        for (slot, column) in indices.iter_mut().zip(Column::ALL) {
            let wanted = columns.header(column);
            match raw.headers.iter().position(|h| h.trim() == wanted) {
                Some(i) => *slot = i,
                None => missing.push(wanted.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::SchemaMismatch { missing });
        }

        let cell = |cells: &[String], i: usize| cells.get(i).cloned().unwrap_or_default();
        let rows = raw
            .rows
            .iter()
            .map(|cells| {
                Row::new(
                    cell(cells, indices[0]),
                    cell(cells, indices[1]),
                    cell(cells, indices[2]),
                    cell(cells, indices[3]),
                    cell(cells, indices[4]),
                    cell(cells, indices[5]),
                )
            })
            .collect();

        Ok(Table { rows })
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Header row plus string cells, before any column checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Header text used for each canonical column in a given source.
///
/// The calendar page uses French headers; snapshot files use the canonical
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub club: String,
    pub label: String,
    pub federation_id: String,
    pub league_id: String,
}

impl ColumnMap {
    /// Headers of the published calendar page.
    pub fn calendar() -> Self {
        ColumnMap {
            date: "Date".into(),
            kind: "Type".into(),
            club: "Club".into(),
            label: "Intitulé".into(),
            federation_id: "FFC".into(),
            league_id: "SLF".into(),
        }
    }

    /// Headers written by the snapshot store.
    pub fn canonical() -> Self {
        ColumnMap {
            date: Column::Date.as_str().into(),
            kind: Column::Type.as_str().into(),
            club: Column::Club.as_str().into(),
            label: Column::Label.as_str().into(),
            federation_id: Column::FederationId.as_str().into(),
            league_id: Column::LeagueId.as_str().into(),
        }
    }

    pub fn header(&self, column: Column) -> &str {
        match column {
            Column::Date => &self.date,
            Column::Type => &self.kind,
            Column::Club => &self.club,
            Column::Label => &self.label,
            Column::FederationId => &self.federation_id,
            Column::LeagueId => &self.league_id,
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap::calendar()
    }
}
