//! `dsa analyze` end to end over the CSV provider (no network).
//!
//! Validates that:
//! - key=value header lines and the text rendering reach stdout
//! - --format json --out writes a parseable document
//! - a run with no dividends prints the distinct message and exits 0
//! - an invalid --max-days fails before any output
//! - `dsa config-hash` prints a stable hash

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const PRICES: &str = "\
date,close
2024-01-01,100
2024-01-02,102
2024-01-03,101
2024-01-04,105
";

const DIVIDENDS: &str = "\
date,amount
2024-01-03,1.0
";

fn write_fixture(dir: &Path, dividends: &str) -> (String, String) {
    let p = dir.join("prices.csv");
    let d = dir.join("dividends.csv");
    fs::write(&p, PRICES).unwrap();
    fs::write(&d, dividends).unwrap();
    (
        p.to_string_lossy().to_string(),
        d.to_string_lossy().to_string(),
    )
}

fn dsa() -> Command {
    let mut cmd = Command::cargo_bin("dsa").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn analyze_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let (prices, dividends) = write_fixture(dir.path(), DIVIDENDS);

    dsa()
        .current_dir(dir.path())
        .args([
            "analyze",
            "--ticker",
            "KO",
            "--max-days",
            "2",
            "--prices-csv",
            &prices,
            "--dividends-csv",
            &dividends,
            "--as-of",
            "2024-06-30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ticker=KO"))
        .stdout(predicate::str::contains("source=csv"))
        .stdout(predicate::str::contains("rows=2"))
        .stdout(predicate::str::contains("events_aligned=1"))
        .stdout(predicate::str::contains("data_unavailable=false"))
        .stdout(predicate::str::contains("best_selling_day=Day 2"))
        .stdout(predicate::str::contains("Transaction log"));
}

#[test]
fn analyze_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let (prices, dividends) = write_fixture(dir.path(), DIVIDENDS);
    let out = dir.path().join("ko.json");

    dsa()
        .current_dir(dir.path())
        .args([
            "analyze",
            "--ticker",
            "KO",
            "--max-days",
            "2",
            "--prices-csv",
            &prices,
            "--dividends-csv",
            &dividends,
            "--as-of",
            "2024-06-30",
            "--format",
            "json",
            "--out",
            &out.to_string_lossy(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("out_path="));

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["ticker"], "KO");
    assert_eq!(v["records"].as_array().unwrap().len(), 2);
    assert_eq!(v["optimal"]["days_held"], 2);
}

#[test]
fn analyze_without_dividends_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (prices, dividends) = write_fixture(dir.path(), "date,amount\n");

    dsa()
        .current_dir(dir.path())
        .args([
            "analyze",
            "--ticker",
            "ZZZZ",
            "--prices-csv",
            &prices,
            "--dividends-csv",
            &dividends,
            "--as-of",
            "2024-06-30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("data_unavailable=true"))
        .stdout(predicate::str::contains(
            "No data found or no dividends in the lookback window.",
        ));
}

#[test]
fn analyze_rejects_zero_max_days() {
    let dir = tempfile::tempdir().unwrap();
    let (prices, dividends) = write_fixture(dir.path(), DIVIDENDS);

    dsa()
        .current_dir(dir.path())
        .args([
            "analyze",
            "--ticker",
            "KO",
            "--max-days",
            "0",
            "--prices-csv",
            &prices,
            "--dividends-csv",
            &dividends,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_days"));
}

#[test]
fn strict_config_fails_on_unused_keys() {
    let dir = tempfile::tempdir().unwrap();
    let (prices, dividends) = write_fixture(dir.path(), DIVIDENDS);
    let cfg = dir.path().join("cfg.yaml");
    fs::write(&cfg, "charts:\n  theme: dark\n").unwrap();

    dsa()
        .current_dir(dir.path())
        .args([
            "analyze",
            "--ticker",
            "KO",
            "--config",
            &cfg.to_string_lossy(),
            "--strict-config",
            "--prices-csv",
            &prices,
            "--dividends-csv",
            &dividends,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn config_hash_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("base.yaml");
    fs::write(&cfg, "backtest:\n  max_days: 10\n").unwrap();

    let run = || {
        let out = dsa()
            .current_dir(dir.path())
            .args(["config-hash", &cfg.to_string_lossy()])
            .output()
            .unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a, b);
    assert!(a.starts_with("config_hash="));
    assert!(a.contains(r#"{"backtest":{"max_days":10}}"#));
}
