//! Html table extraction.
//!
//! Walks `<table>`, `<tr>`, `<td>`/`<th>` blocks case-insensitively. Missing
//! end tags on rows and cells are tolerated. Nested tables are not.

use crate::table::RawTable;

struct Cell {
    header: bool,
    text: String,
}

/// Every table in `document`, in document order.
///
/// The header row is the first row made only of `<th>` cells; without one,
/// the first row is used.
pub fn parse_tables(document: &str) -> Vec<RawTable> {
    // ascii lowercasing keeps byte offsets identical
    let lc = document.to_ascii_lowercase();

    let mut tables = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_tag(&lc, "table", pos) {
        let body_start = open_end(&lc, start);
        let body_end = find_close(&lc, "table", body_start).unwrap_or(lc.len());
        tables.push(parse_table(
            &document[body_start..body_end],
            &lc[body_start..body_end],
        ));
        pos = body_end;
    }
    tables
}

fn parse_table(doc: &str, lc: &str) -> RawTable {
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    let mut pos = 0usize;
    while let Some(start) = find_tag(lc, "tr", pos) {
        let content_start = open_end(lc, start);
        let next_row = find_tag(lc, "tr", content_start).unwrap_or(lc.len());
        let content_end = find_close(lc, "tr", content_start).map_or(next_row, |c| c.min(next_row));

        let cells = parse_cells(&doc[content_start..content_end], &lc[content_start..content_end]);
        if !cells.is_empty() {
            rows.push(cells);
        }
        pos = content_end;
    }

    if rows.is_empty() {
        return RawTable::default();
    }

    let texts = |cells: Vec<Cell>| cells.into_iter().map(|c| c.text).collect::<Vec<_>>();

    match rows.iter().position(|r| r.iter().all(|c| c.header)) {
        Some(header_idx) => {
            let mut headers = Vec::new();
            let mut data = Vec::new();
            for (i, row) in rows.into_iter().enumerate() {
                if i == header_idx {
                    headers = texts(row);
                } else if row.iter().any(|c| !c.header) {
                    data.push(texts(row));
                }
            }
            RawTable { headers, rows: data }
        }
        None => {
            let mut rows = rows.into_iter().map(texts);
            let headers = rows.next().unwrap_or_default();
            RawTable {
                headers,
                rows: rows.collect(),
            }
        }
    }
}

fn parse_cells(doc: &str, lc: &str) -> Vec<Cell> {
    let mut cells = Vec::new();

    let mut pos = 0usize;
    while let Some((start, header)) = next_cell(lc, pos) {
        let content_start = open_end(lc, start);
        let next = next_cell(lc, content_start).map_or(lc.len(), |(p, _)| p);
        let name = if header { "th" } else { "td" };
        let content_end = find_close(lc, name, content_start).map_or(next, |c| c.min(next));

        cells.push(Cell {
            header,
            text: cell_text(&doc[content_start..content_end]),
        });
        pos = content_end;
    }
    cells
}

fn next_cell(lc: &str, from: usize) -> Option<(usize, bool)> {
    match (find_tag(lc, "td", from), find_tag(lc, "th", from)) {
        (Some(d), Some(h)) if h < d => Some((h, true)),
        (Some(d), _) => Some((d, false)),
        (None, Some(h)) => Some((h, true)),
        (None, None) => None,
    }
}

/// Position of the next `<name` opening tag, not matching longer tag names
/// (`<th` never matches `<thead>`).
fn find_tag(lc: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("<{name}");
    let mut from = from;
    loop {
        let pos = lc.get(from..)?.find(&needle)? + from;
        let after = pos + needle.len();
        match lc.as_bytes().get(after) {
            None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') => return Some(pos),
            _ => from = after,
        }
    }
}

fn find_close(lc: &str, name: &str, from: usize) -> Option<usize> {
    Some(lc.get(from..)?.find(&format!("</{name}"))? + from)
}

/// Index just past the `>` closing the tag that starts at `start`.
fn open_end(lc: &str, start: usize) -> usize {
    lc[start..].find('>').map_or(lc.len(), |i| start + i + 1)
}

/// Visible text of a cell: tags stripped, entities decoded, whitespace
/// collapsed.
pub fn cell_text(inner: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(inner)))
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "eacute" => 'é',
        "Eacute" => 'É',
        "egrave" => 'è',
        "ecirc" => 'ê',
        "agrave" => 'à',
        "acirc" => 'â',
        "ccedil" => 'ç',
        "icirc" => 'î',
        "ocirc" => 'ô',
        "ucirc" => 'û',
        "ugrave" => 'ù',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(&['x', 'X'][..]) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            return char::from_u32(code);
        }
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALENDAR: &str = r#"
<html><body>
<table class="nav"><tr><td>Home</td><td>Contact</td></tr></table>
<TABLE id="calendar">
  <THEAD>
    <TR><TH>Date</TH><TH>Type</TH><TH>Club</TH><TH>Intitul&eacute;</TH><TH>FFC</TH><TH>SLF</TH></TR>
  </THEAD>
  <TBODY>
    <tr class="odd"><td>2024-05-01</td><td>Road</td><td><a href="/clubs/a">Club&nbsp;A</a></td>
        <td>Race   X</td><td>F1</td><td>S1</td></tr>
    <tr><td>2024-06-01<td>Track<td>Club B &amp; Co<td>Race Y<td>F3<td>S2
  </TBODY>
</TABLE>
</body></html>
"#;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_every_table() {
        assert_eq!(parse_tables(CALENDAR).len(), 2);
    }

    #[test]
    fn header_row_comes_from_th_cells() {
        let tables = parse_tables(CALENDAR);
        assert_eq!(
            tables[1].headers,
            strings(&["Date", "Type", "Club", "Intitulé", "FFC", "SLF"])
        );
    }

    #[test]
    fn cells_are_cleaned_and_unclosed_tags_tolerated() {
        let tables = parse_tables(CALENDAR);
        assert_eq!(
            tables[1].rows,
            vec![
                strings(&["2024-05-01", "Road", "Club A", "Race X", "F1", "S1"]),
                strings(&["2024-06-01", "Track", "Club B & Co", "Race Y", "F3", "S2"]),
            ]
        );
    }

    #[test]
    fn first_row_is_header_without_th() {
        let tables = parse_tables(CALENDAR);
        assert_eq!(tables[0].headers, strings(&["Home", "Contact"]));
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn thead_is_not_mistaken_for_th() {
        assert_eq!(find_tag("<thead><th>", "th", 0), Some(7));
        assert_eq!(find_tag("<tr/>", "tr", 0), Some(0));
        assert_eq!(find_tag("<track>", "tr", 0), None);
    }

    #[test]
    fn numeric_and_unknown_entities() {
        assert_eq!(decode_entities("&#233;t&#xE9; &#39;x&#39;"), "été 'x'");
        assert_eq!(decode_entities("R&D &unknown; a&b"), "R&D &unknown; a&b");
    }

    #[test]
    fn document_without_tables() {
        assert!(parse_tables("<p>nothing here</p>").is_empty());
    }
}
