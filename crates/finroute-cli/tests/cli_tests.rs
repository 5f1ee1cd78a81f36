//! Integration tests for the finroute binary
//!
//! Only offline paths are exercised: the feature-hashing index build, CSV
//! import, and input validation. The LLM URL points at a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn finroute_cmd() -> Command {
    let mut cmd = Command::cargo_bin("finroute").unwrap();
    cmd.env_remove("FINROUTE_CONFIG")
        .env_remove("FINROUTE_LLM_API_KEY")
        .env("FINROUTE_LLM_URL", "http://127.0.0.1:9");
    cmd
}

/// Write the five CSVs and a config pointing at them
fn setup(dir: &TempDir) -> PathBuf {
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();

    let files = [
        (
            "company_overview.csv",
            "Symbol,Name,Description\n\
             AAPL,Apple Inc,\"Designs smartphones, computers and wearables\"\n\
             ELF,e.l.f. Beauty,\"Cosmetics, skincare and beauty products\"\n\
             XOM,Exxon Mobil,\"Crude oil and natural gas\"\n",
        ),
        (
            "stock_weekly_data.csv",
            "symbol,date,close\nAAPL,2023-01-06,129.62\nAAPL,2023-01-13,134.76\n",
        ),
        (
            "news_sentiment.csv",
            "ticket_number,title,time_published\nAAPL,Apple beats,20240105T143000\n",
        ),
        (
            "quarterly_earnings.csv",
            "symbol,fiscalDateEnding,reportedEPS\nAAPL,2023-09-30,1.46\n",
        ),
        (
            "cash_flow.csv",
            "symbol,fiscalDateEnding,operatingCashflow\nAAPL,2023-09-30,110543000000\nMSFT,2023-06-30,87582000000\n",
        ),
    ];
    for (name, content) in files {
        fs::write(data.join(name), content).unwrap();
    }

    let config = format!(
        "index_path: {root}/tmp/vectorstore.bin\n\
         database_path: {root}/store.sqlite\n\
         datasets:\n  \
           stock_weekly_data: {data}/stock_weekly_data.csv\n  \
           news_sentiment: {data}/news_sentiment.csv\n  \
           quarterly_earnings: {data}/quarterly_earnings.csv\n  \
           cash_flow: {data}/cash_flow.csv\n  \
           company_overview: {data}/company_overview.csv\n",
        root = dir.path().display(),
        data = data.display()
    );
    let config_path = dir.path().join("finroute.yml");
    fs::write(&config_path, config).unwrap();
    config_path
}

fn index_path(dir: &TempDir) -> PathBuf {
    dir.path().join("tmp").join("vectorstore.bin")
}

fn with_config<'a>(cmd: &'a mut Command, config: &Path) -> &'a mut Command {
    cmd.arg("--config").arg(config)
}

#[test]
fn test_help_lists_commands() {
    finroute_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build-index"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_build_index_offline() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .args(["build-index", "--offline", "--dimensions", "64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 3 passages"))
        .stdout(predicate::str::contains("Indexed 3 passages (64 dimensions"));

    assert!(index_path(&dir).exists());
}

#[test]
fn test_build_index_custom_output() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    let output = dir.path().join("custom.bin");

    with_config(&mut finroute_cmd(), &config)
        .args(["build-index", "--offline", "--output"])
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
    assert!(!index_path(&dir).exists());
}

#[test]
fn test_import_all_collections() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("company_overview: 3 records"))
        .stdout(predicate::str::contains("cash_flow: 2 records"))
        .stdout(predicate::str::contains("news_sentiment: 1 records"));

    assert!(dir.path().join("store.sqlite").exists());
}

#[test]
fn test_import_single_collection_json() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    let output = with_config(&mut finroute_cmd(), &config)
        .args(["--format", "json", "import", "--collection", "cash_flow"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["collection"], "cash_flow");
    assert_eq!(parsed[0]["records"], 2);
}

#[test]
fn test_import_unknown_collection_fails() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .args(["import", "--collection", "posts"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Collection not found: posts"));
}

#[test]
fn test_empty_query_rejected() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .arg("ask")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Query is required"));

    with_config(&mut finroute_cmd(), &config)
        .args(["classify", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Query is required"));
}

#[test]
fn test_ask_without_index_fails() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .args(["ask", "--engine", "general", "What does Apple make?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read vector store"));
}

#[test]
fn test_classify_reports_unreachable_service() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    with_config(&mut finroute_cmd(), &config)
        .args(["classify", "What is Apple's cash flow?"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("finroute.yml");
    fs::write(&config, "iteration_budget: 0\n").unwrap();

    with_config(&mut finroute_cmd(), &config)
        .arg("import")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("iteration_budget"));
}
