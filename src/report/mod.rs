pub mod html;
pub mod text;

use serde::Deserialize;

use crate::store::diff::DiffResult;
use crate::table::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Minimal html document, one table per section
    Html,
    /// Tab separated sections
    Text,
}

/// Headings and the caller-supplied fragments around an html report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub modified_heading: String,
    pub added_heading: String,
    pub removed_heading: String,
    pub header: String,
    pub footer: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            format: ReportFormat::Html,
            modified_heading: "Modified races".to_string(),
            added_heading: "Added races".to_string(),
            removed_heading: "Removed races".to_string(),
            header: html::DEFAULT_HEADER.to_string(),
            footer: html::DEFAULT_FOOTER.to_string(),
        }
    }
}

/// One heading plus a grid of cells, shared by both renderers.
pub struct Section<'a> {
    pub heading: &'a str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<&'a str>>,
}

/// Non-empty outputs in report order: modified, added, removed.
pub fn sections<'a>(diff: &'a DiffResult, options: &'a ReportOptions) -> Vec<Section<'a>> {
    let canonical: Vec<&'static str> = Column::ALL.iter().map(Column::as_str).collect();
    let mut sections = Vec::new();

    if !diff.modified.is_empty() {
        let mut columns = canonical.clone();
        columns.push("Modif");
        sections.push(Section {
            heading: &options.modified_heading,
            columns,
            rows: diff
                .modified
                .iter()
                .map(|m| {
                    let mut cells = m.row.fields().to_vec();
                    cells.push(m.modif.as_str());
                    cells
                })
                .collect(),
        });
    }

    for (heading, table) in [
        (&options.added_heading, &diff.added),
        (&options.removed_heading, &diff.removed),
    ] {
        if table.is_empty() {
            continue;
        }
        sections.push(Section {
            heading,
            columns: canonical.clone(),
            rows: table.iter().map(|row| row.fields().to_vec()).collect(),
        });
    }

    sections
}

/// Render a non-empty diff in the configured format.
///
/// Callers stop before this point when the diff is empty.
pub fn render(diff: &DiffResult, options: &ReportOptions) -> String {
    debug_assert!(!diff.is_empty(), "empty diffs are never rendered");

    let sections = sections(diff, options);
    match options.format {
        ReportFormat::Html => html::render(&sections, &options.header, &options.footer),
        ReportFormat::Text => text::render(&sections),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::diff::compare_tables;
    use crate::table::{Row, Table};

    fn scenario() -> DiffResult {
        let prior = Table::new(vec![
            Row::new("2024-05-01", "Road", "ClubA", "Race X", "F1", "S1"),
            Row::new("2024-07-01", "Cross", "ClubC", "Race Z", "F4", "S3"),
        ]);
        let current = Table::new(vec![
            Row::new("2024-05-01", "Road", "ClubA", "Race X", "F2", "S1"),
            Row::new("2024-06-01", "Track", "ClubB", "Race Y", "F3", "S2"),
        ]);
        compare_tables(&current, &prior)
    }

    #[test]
    fn sections_come_in_report_order() {
        let diff = scenario();
        let options = ReportOptions::default();
        let headings: Vec<_> = sections(&diff, &options).iter().map(|s| s.heading).collect();
        assert_eq!(headings, vec!["Modified races", "Added races", "Removed races"]);
    }

    #[test]
    fn empty_outputs_have_no_section() {
        let diff = DiffResult {
            added: Table::new(vec![Row::new("d", "t", "c", "l", "f", "s")]),
            ..DiffResult::default()
        };
        let options = ReportOptions::default();
        let sections = sections(&diff, &options);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Added races");
    }

    #[test]
    fn modified_section_carries_the_tag_column() {
        let diff = scenario();
        let options = ReportOptions::default();
        let sections = sections(&diff, &options);
        assert_eq!(sections[0].columns.last(), Some(&"Modif"));
        assert_eq!(sections[0].rows[0].last(), Some(&"After"));
        assert_eq!(sections[0].rows[1].last(), Some(&"Before"));
        assert_eq!(sections[1].columns.len(), 6);
    }

    #[test]
    fn render_dispatches_on_format() {
        let diff = scenario();
        let html = render(&diff, &ReportOptions::default());
        assert!(html.contains("<table>"));

        let options = ReportOptions {
            format: ReportFormat::Text,
            ..ReportOptions::default()
        };
        let text = render(&diff, &options);
        assert!(!text.contains('<'));
        assert!(text.starts_with("Modified races:"));
    }
}
