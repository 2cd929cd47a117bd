use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn record(url: &str, hash: &str, num: u64) -> Value {
    json!({
        "url": url,
        "dest": "script",
        "size": 10_000,
        "request_headers": [{"name": "Accept", "value": "*/*"}],
        "response_headers": {"content-type": "text/javascript"},
        "body_hash": hash,
        "num": num,
    })
}

fn write_month(dir: &Path, month: &str, records: Vec<Value>) {
    fs::write(
        dir.join(format!("{month}.json")),
        serde_json::to_vec(&Value::Array(records)).unwrap(),
    )
    .unwrap();
}

fn setup_data(dir: &Path) {
    write_month(
        dir,
        "2025-06",
        vec![
            record("https://cdn.example/v/1.2.4/app.js", "b", 120_000),
            record("https://cdn.example/lib.js", "fixed", 150_000),
        ],
    );
    write_month(
        dir,
        "2025-05",
        vec![
            record("https://cdn.example/v/1.2.3/app.js", "a", 60_000),
            record("https://cdn.example/v/1.2.4/app.js", "b", 60_000),
            record("https://cdn.example/lib.js", "fixed", 150_000),
        ],
    );
    write_month(
        dir,
        "2025-04",
        vec![
            record("https://cdn.example/v/1.2.3/app.js", "a", 120_000),
            record("https://cdn.example/lib.js", "fixed", 150_000),
        ],
    );
}

#[allow(deprecated)]
fn pervasive() -> Command {
    let mut cmd = Command::cargo_bin("pervasive").expect("binary");
    cmd.env_remove("PERVASIVE_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn analyze_writes_sorted_patterns_file() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    setup_data(&data);
    let output = temp.path().join("patterns.txt");

    pervasive()
        .args(["analyze", "--months", "3", "--data-dir"])
        .arg(&data)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Pervasive pattern report"))
        .stdout(predicate::str::contains("2025-06, 2025-05, 2025-04"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "https://cdn.example/lib.js\nhttps://cdn.example/v/*/app.js\n"
    );
}

#[test]
fn analyze_json_report_is_the_only_stdout() {
    let temp = tempdir().unwrap();
    setup_data(temp.path());
    let output = temp.path().join("out/patterns.txt");

    let assert = pervasive()
        .args(["analyze", "--json", "--months", "3", "--current", "2025-06"])
        .arg("--data-dir")
        .arg(temp.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let body: Value = serde_json::from_slice(&assert.get_output().stdout).expect("valid json");
    assert_eq!(
        body["patterns"],
        json!(["https://cdn.example/lib.js", "https://cdn.example/v/*/app.js"])
    );
    assert_eq!(body["stats"]["pervasive_fixed"], 1);
    assert_eq!(body["stats"]["patterns_accepted"], 1);
    assert_eq!(body["months"], json!(["2025-06", "2025-05", "2025-04"]));
    assert!(output.exists());
}

#[test]
fn threshold_flag_beats_config_file() {
    let temp = tempdir().unwrap();
    setup_data(temp.path());
    let config = temp.path().join("pervasive.toml");
    fs::write(&config, "pervasive_threshold = 10\nmonths_tracked = 3\n").unwrap();
    let output = temp.path().join("patterns.txt");

    pervasive()
        .args(["analyze", "--threshold", "200000", "--data-dir"])
        .arg(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn config_from_environment_is_used() {
    let temp = tempdir().unwrap();
    setup_data(temp.path());
    let config = temp.path().join("pervasive.toml");
    fs::write(&config, "months_tracked = 3\nblocklist = [\"app\"]\n").unwrap();
    let output = temp.path().join("patterns.txt");

    pervasive()
        .env("PERVASIVE_CONFIG", &config)
        .args(["analyze", "--data-dir"])
        .arg(temp.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "https://cdn.example/lib.js\n"
    );
}

#[test]
fn invalid_config_fails_with_message() {
    let temp = tempdir().unwrap();
    setup_data(temp.path());
    let config = temp.path().join("bad.toml");
    fs::write(&config, "no_such_field = 1\n").unwrap();

    pervasive()
        .args(["analyze", "--data-dir"])
        .arg(temp.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn empty_data_dir_is_an_error() {
    let temp = tempdir().unwrap();

    pervasive()
        .args(["analyze", "--data-dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No YYYY-MM.json snapshots"));
}
