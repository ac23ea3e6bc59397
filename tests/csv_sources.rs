mod common;

use std::fs;
use tempfile::TempDir;
use salesgrid::core::config::{Config, SourceMode};
use salesgrid::core::error::ErrorKind;
use salesgrid::core::types::RecordFields;
use salesgrid::query::ast::{Query, SortKey, SortOrder};
use salesgrid::reader::RecordSource;
use salesgrid::schema::schema::SalesField;
use salesgrid::search::executor::QueryEngine;

use common::{names, row, write_csv};

fn rows(prefix: &str, count: usize) -> Vec<RecordFields> {
    (0..count)
        .map(|i| {
            row(&format!("{} {:02}", prefix, i), "2023-03-01", &i.to_string())
                .with(SalesField::CustomerRegion, prefix)
        })
        .collect()
}

/// Three chunk files of twenty rows, written out of numeric order
fn chunked_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_csv(&dir.path().join("sales_data_part10.csv"), &rows("gamma", 20));
    write_csv(&dir.path().join("sales_data_part2.csv"), &rows("beta", 20));
    write_csv(&dir.path().join("sales_data_part1.csv"), &rows("alpha", 20));
    fs::write(dir.path().join("notes.txt"), "not data").unwrap();
    dir
}

fn config(dir: &TempDir, mode: SourceMode) -> Config {
    let mut config = Config::default();
    config.data.data_dir = dir.path().to_path_buf();
    config.data.mode = mode;
    config
}

fn unsorted(page_size: usize) -> Query {
    Query::new().with_sort(SortKey::None, SortOrder::Asc).with_page(1, page_size)
}

#[test]
fn in_memory_engine_reads_chunks_in_numeric_order() {
    let dir = chunked_dir();
    let engine = QueryEngine::open(&config(&dir, SourceMode::InMemory)).unwrap();

    assert_eq!(engine.source().files().len(), 3);
    assert_eq!(engine.source().len_hint(), Some(60));

    let page = engine.query(&unsorted(100)).unwrap();
    assert_eq!(page.pagination.total_items, 60);
    assert!(!page.capped);
    let all = names(&page);
    assert_eq!(all[0], "alpha 00");
    assert_eq!(all[20], "beta 00");
    assert_eq!(all[59], "gamma 19");
}

#[test]
fn single_file_is_used_without_chunks() {
    let dir = TempDir::new().unwrap();
    write_csv(&dir.path().join("sales_data.csv"), &rows("solo", 4));

    let engine = QueryEngine::open(&config(&dir, SourceMode::InMemory)).unwrap();
    let page = engine
        .query(&Query::new().with_sort(SortKey::Quantity, SortOrder::Desc))
        .unwrap();
    assert_eq!(names(&page), vec!["solo 03", "solo 02", "solo 01", "solo 00"]);
}

#[test]
fn missing_data_fails_at_startup() {
    let dir = TempDir::new().unwrap();
    for mode in [SourceMode::InMemory, SourceMode::Streaming] {
        let err = QueryEngine::open(&config(&dir, mode)).err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

#[test]
fn streaming_stops_at_the_result_budget() {
    let dir = chunked_dir();
    let engine = QueryEngine::open(&config(&dir, SourceMode::Streaming)).unwrap();
    assert_eq!(engine.source().len_hint(), None);

    // budget is page size times ten
    let page = engine.query(&unsorted(2)).unwrap();
    assert!(page.capped);
    assert_eq!(page.pagination.total_items, 20);
    assert_eq!(names(&page), vec!["alpha 00", "alpha 01"]);

    let page = engine.query(&unsorted(10)).unwrap();
    assert!(!page.capped);
    assert_eq!(page.pagination.total_items, 60);
}

#[test]
fn streaming_flags_capped_only_when_matches_remain() {
    let dir = chunked_dir();
    let engine = QueryEngine::open(&config(&dir, SourceMode::Streaming)).unwrap();

    // budget of 60 over exactly 60 matches: the count is exact
    let page = engine.query(&unsorted(6)).unwrap();
    assert!(!page.capped);
    assert_eq!(page.pagination.total_items, 60);

    // budget of 50: the 51st match stops the scan
    let page = engine.query(&unsorted(5)).unwrap();
    assert!(page.capped);
    assert_eq!(page.pagination.total_items, 50);
}

#[test]
fn streaming_and_in_memory_agree_below_the_budget() {
    let dir = chunked_dir();
    let streaming = QueryEngine::open(&config(&dir, SourceMode::Streaming)).unwrap();
    let in_memory = QueryEngine::open(&config(&dir, SourceMode::InMemory)).unwrap();

    let query = Query::new()
        .with_sort(SortKey::CustomerName, SortOrder::Desc)
        .with_page(2, 7)
        .with_search("a 1");
    let a = streaming.query(&query).unwrap();
    let b = in_memory.query(&query).unwrap();
    assert_eq!(names(&a), names(&b));
    assert_eq!(a.pagination, b.pagination);
}

#[test]
fn streaming_filter_options_come_from_the_first_chunk() {
    let dir = chunked_dir();
    let streaming = QueryEngine::open(&config(&dir, SourceMode::Streaming)).unwrap();
    assert_eq!(streaming.filter_options().unwrap().customer_regions, vec!["alpha"]);

    let in_memory = QueryEngine::open(&config(&dir, SourceMode::InMemory)).unwrap();
    assert_eq!(
        in_memory.filter_options().unwrap().customer_regions,
        vec!["alpha", "beta", "gamma"]
    );
}

#[test]
fn quoted_fields_and_short_rows_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("sales_data.csv"),
        "\u{feff}Customer Name,Date,Quantity,Tags\n\
         \"Doe, Jane\",2022-01-01,3,\"a,b\"\n\
         Short Row,2022-01-02\n",
    )
    .unwrap();

    let engine = QueryEngine::open(&config(&dir, SourceMode::InMemory)).unwrap();
    let page = engine.query(&unsorted(10)).unwrap();
    assert_eq!(names(&page), vec!["Doe, Jane", "Short Row"]);
    assert_eq!(page.data[0].value(SalesField::Tags), "a,b");
    assert_eq!(page.data[1].quantity(), 0);
}
