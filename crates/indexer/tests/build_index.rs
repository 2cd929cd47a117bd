use pervasive_indexer::{JsonSnapshotDir, OriginIndex};
use pervasive_protocol::{MonthKey, Record};
use tempfile::TempDir;

fn month(raw: &str) -> MonthKey {
    raw.parse().expect("month")
}

#[test]
fn build_reads_every_tracked_month_from_disk() {
    let temp = TempDir::new().expect("tempdir");
    let dir = JsonSnapshotDir::new(temp.path());
    dir.write_month(
        &month("2025-06"),
        &[
            Record::new("https://cdn.example/v/2/app.js", "script", 5_000, "b", 40_000),
            Record::new("https://cdn.example/v/2/app.js", "script", 5_000, "b", 2_000),
        ],
    )
    .expect("write current");
    dir.write_month(
        &month("2025-05"),
        &[
            Record::new("https://cdn.example/v/1/app.js", "script", 4_990, "a", 41_000),
            Record::new("https://old.example/gone.js", "script", 100, "z", 99_000),
        ],
    )
    .expect("write previous");

    let index = OriginIndex::build(&dir, month("2025-06").trailing(3)).expect("build");

    assert_eq!(index.months().len(), 3);
    assert_eq!(index.origins().collect::<Vec<_>>(), vec!["https://cdn.example"]);
    assert_eq!(
        index.path_keys("https://cdn.example"),
        vec!["/v/1/app.js".to_string(), "/v/2/app.js".to_string()]
    );

    let current = index
        .history("https://cdn.example", "/v/2/app.js")
        .expect("current path");
    assert_eq!(current.count_in(&month("2025-06")), 42_000);

    let stats = index.stats();
    assert_eq!(stats.unknown_origin, 1);
    assert_eq!(stats.empty_months, vec!["2025-04".to_string()]);
    assert_eq!(stats.total_records(), 3);
}

#[test]
fn build_fails_on_corrupt_snapshot() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::write(temp.path().join("2025-06.json"), "not json").expect("write");
    let dir = JsonSnapshotDir::new(temp.path());
    assert!(OriginIndex::build(&dir, [month("2025-06")]).is_err());
}
