//! Delimited text codec (CSV/TSV) for snapshot files and plain-text output.
//!
//! Built on `csv`: fields holding the delimiter, quotes or line breaks are
//! quoted on write, blank lines are skipped on read, short records are
//! accepted and padded later by `Table::from_raw`.

use std::io::{Read, Write};

use crate::table::{Column, RawTable, Table};

/// Name of the positional index column written in front of the data.
pub const INDEX_HEADER: &str = "ID";

/// Read a delimited file. The first record is the header.
///
/// An empty input yields a `RawTable` with no headers.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> csv::Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<csv::Result<Vec<Vec<String>>>>()?;

    Ok(RawTable { headers, rows })
}

/// Write `table` with a header row and a leading positional `ID` column.
///
/// The index is regenerated on every write and carries no identity.
pub fn write_table<W: Write>(writer: W, table: &Table, delimiter: u8) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header = vec![INDEX_HEADER];
    header.extend(Column::ALL.iter().map(Column::as_str));
    wtr.write_record(&header)?;

    for (i, row) in table.iter().enumerate() {
        let id = i.to_string();
        wtr.write_record(std::iter::once(id.as_str()).chain(row.fields()))?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn table_to_string(table: &Table, delimiter: u8) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_table(&mut buf, table, delimiter)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnMap, Row};

    #[test]
    fn read_handles_quotes_and_crlf() {
        let raw = read_table("h1,h2\r\na,\"b,1\"\r\n\"say \"\"hi\"\"\",c\r\n".as_bytes(), b',').unwrap();
        assert_eq!(raw.headers, vec!["h1", "h2"]);
        assert_eq!(
            raw.rows,
            vec![
                vec!["a".to_string(), "b,1".to_string()],
                vec!["say \"hi\"".to_string(), "c".to_string()],
            ]
        );
    }

    #[test]
    fn read_skips_blank_lines_and_accepts_short_records() {
        let raw = read_table("ID,Date,Type\n\n0,2024-05-01\n\n1,2024-06-01,Road\n".as_bytes(), b',').unwrap();
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0], vec!["0", "2024-05-01"]);
    }

    #[test]
    fn empty_input_has_no_header() {
        let raw = read_table("".as_bytes(), b',').unwrap();
        assert!(raw.headers.is_empty());
        assert!(raw.rows.is_empty());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(read_table(&b"ID,Date\n0,\xff\xfe\n"[..], b',').is_err());
    }

    #[test]
    fn written_table_starts_with_index_header() {
        let table = Table::new(vec![Row::new("2024-05-01", "Road", "ClubA", "Race X", "F1", "S1")]);
        let text = table_to_string(&table, b',').unwrap();
        assert_eq!(
            text,
            "ID,Date,Type,Club,Label,FederationID,LeagueID\n0,2024-05-01,Road,ClubA,Race X,F1,S1\n"
        );
    }

    #[test]
    fn awkward_fields_survive_write_and_read() {
        let table = Table::new(vec![
            Row::new("2024-05-01", "Road", "Club, \"A\"", "Race\nX", "", " S1 "),
            Row::new("", "", "", "", "", ""),
        ]);
        let text = table_to_string(&table, b',').unwrap();
        let raw = read_table(text.as_bytes(), b',').unwrap();
        let back = Table::from_raw(&raw, &ColumnMap::canonical()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn tabs_are_quoted_in_tsv() {
        let table = Table::new(vec![Row::new("d", "t", "c", "Race\tY", "f", "s")]);
        let text = table_to_string(&table, b'\t').unwrap();
        assert!(text.contains("\"Race\tY\""), "{text}");
    }
}
