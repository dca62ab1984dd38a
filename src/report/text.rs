//! Plain-text report: each section is a heading followed by a tab
//! separated table.

use super::Section;

pub fn render(sections: &[Section]) -> String {
    let mut out = String::new();

    for section in sections {
        out.push_str(&format!("{}:\n\n", section.heading));
        out.push_str(&tsv(section));
        out.push('\n');
    }

    out
}

fn tsv(section: &Section) -> String {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    // writing into a Vec cannot fail
    let _ = wtr.write_record(&section.columns);
    for row in &section.rows {
        let _ = wtr.write_record(row);
    }

    let buf = wtr.into_inner().unwrap_or_default();
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_separated_by_a_blank_line() {
        let sections = vec![
            Section {
                heading: "Added races",
                columns: vec!["Date", "Label"],
                rows: vec![vec!["2024-06-01", "Race Y"]],
            },
            Section {
                heading: "Removed races",
                columns: vec!["Date", "Label"],
                rows: vec![vec!["2024-07-01", "Race Z"]],
            },
        ];

        assert_eq!(
            render(&sections),
            "Added races:\n\nDate\tLabel\n2024-06-01\tRace Y\n\n\
             Removed races:\n\nDate\tLabel\n2024-07-01\tRace Z\n\n"
        );
    }

    #[test]
    fn tabs_inside_cells_are_quoted() {
        let sections = vec![Section {
            heading: "Added races",
            columns: vec!["Label"],
            rows: vec![vec!["Race\tY"]],
        }];
        assert!(render(&sections).contains("\"Race\tY\""));
    }
}
