use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use racewatch::fetch::html;
use racewatch::store::diff::compare_tables;
use racewatch::store::SnapshotStore;
use racewatch::table::{Row, Table};
use tempfile::TempDir;

/// Calendar-shaped fixtures
mod fixtures {
    use super::*;

    pub fn calendar(rows: usize) -> Table {
        Table::new(
            (0..rows)
                .map(|i| {
                    Row::new(
                        format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                        if i % 3 == 0 { "Road" } else { "Track" },
                        format!("Club {}", i % 40),
                        format!("Race {i}"),
                        format!("F{i}"),
                        format!("S{}", i % 7),
                    )
                })
                .collect(),
        )
    }

    /// Every tenth row edited, every twentieth dropped, a few appended.
    pub fn edited(prior: &Table) -> Table {
        let mut rows: Vec<Row> = prior
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 20 != 19)
            .map(|(i, row)| {
                let mut row = row.clone();
                if i % 10 == 0 {
                    row.federation_id.push('b');
                }
                row
            })
            .collect();
        for i in 0..prior.len() / 50 {
            rows.push(Row::new("2025-01-01", "Road", "New club", format!("New race {i}"), "", ""));
        }
        Table::new(rows)
    }

    pub fn page(table: &Table) -> String {
        let mut html = String::from(
            "<table><tr><th>Date</th><th>Type</th><th>Club</th><th>Intitulé</th><th>FFC</th><th>SLF</th></tr>",
        );
        for row in table {
            html.push_str("<tr>");
            for cell in row.fields() {
                html.push_str(&format!("<td>{cell}</td>"));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>");
        html
    }
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_tables");

    for size in [100, 1_000, 10_000] {
        let prior = fixtures::calendar(size);
        let current = fixtures::edited(&prior);

        group.bench_with_input(BenchmarkId::new("edited", size), &size, |b, _| {
            b.iter(|| compare_tables(black_box(&current), black_box(&prior)));
        });
        group.bench_with_input(BenchmarkId::new("identical", size), &size, |b, _| {
            b.iter(|| compare_tables(black_box(&prior), black_box(&prior)));
        });
    }

    group.finish();
}

fn bench_parse_page(c: &mut Criterion) {
    let page = fixtures::page(&fixtures::calendar(1_000));
    c.bench_function("parse_tables_1000_rows", |b| {
        b.iter(|| html::parse_tables(black_box(&page)));
    });
}

fn bench_snapshot_io(c: &mut Criterion) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = SnapshotStore::new(dir.path());
    let table = fixtures::calendar(1_000);
    let path = store.save(&table).expect("failed to write snapshot");

    c.bench_function("load_snapshot_1000_rows", |b| {
        b.iter(|| store.load(black_box(&path)).expect("failed to load snapshot"));
    });
}

criterion_group!(benches, bench_compare, bench_parse_page, bench_snapshot_io);
criterion_main!(benches);
