use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Mock-backed command running inside `dir`, with timings shrunk so one run
/// covers four fixture items (1 s window / 250 ms delay).
fn skinbook(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("skinbook").unwrap();
    cmd.current_dir(dir.path())
        .env("SKINBOOK_USE_MOCK", "1")
        .env("RUST_LOG", "warn")
        .env_remove("SKINBOOK_GITHUB_TOKEN")
        .args([
            "--delay-ms",
            "250",
            "--run-window-secs",
            "1",
            "--error-pause-ms",
            "1",
            "--backoff-ms",
            "1",
        ]);
    cmd
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn mock_run_saves_budgeted_items() {
    let dir = TempDir::new().unwrap();

    skinbook(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done! Saved 4 items to data/cs2_items.json"))
        .stdout(predicate::str::contains("$1.00 = 0.92€"));

    let items = read_json(&dir.path().join("data/cs2_items.json"));
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["hash_name"], "AK-47 | Redline (Field-Tested)");
    assert_eq!(items[0]["item_nameid"], 176_288_467);
    assert!(items[0]["date_modified"].as_i64().unwrap() > 0);
    // The cursor file is only written once it exists.
    assert!(!dir.path().join("data/start_from.json").exists());
}

#[test]
fn second_run_resumes_and_wraps() {
    let dir = TempDir::new().unwrap();
    let cursor = dir.path().join("data/start_from.json");

    skinbook(&dir).arg("--create-cursor").assert().success();
    assert_eq!(read_json(&cursor), serde_json::json!({ "start_from": 4 }));

    // Item 5 has no name id; one failed round is enough to skip it.
    skinbook(&dir)
        .args(["--max-item-failures", "1", "--max-attempts", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done! Saved 6 items"))
        .stdout(predicate::str::contains("1 skipped"))
        .stdout(predicate::str::contains("next start: 0"));

    assert_eq!(read_json(&cursor), serde_json::json!({ "start_from": 0 }));
    let items = read_json(&dir.path().join("data/cs2_items.json"));
    assert!(
        items
            .as_array()
            .unwrap()
            .iter()
            .all(|i| i["hash_name"] != skinbook_mock::UNMAPPED)
    );
}

#[test]
fn zero_attempts_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    skinbook(&dir)
        .args(["--max-attempts", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_attempts"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    skinbook(&dir).arg("--no-such-flag").assert().code(2);
}

#[test]
fn unreachable_catalog_is_a_startup_failure() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("skinbook").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SKINBOOK_USE_MOCK")
        .env("RUST_LOG", "off")
        .args([
            "--market-base",
            "http://127.0.0.1:9/market/",
            "--catalog-url",
            "http://127.0.0.1:9/catalog.json",
            "--name-ids-url",
            "http://127.0.0.1:9/name_ids.json",
            "--fx-url",
            "http://127.0.0.1:9/fx.json",
            "--request-timeout-secs",
            "2",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("startup failed"));
    assert!(!dir.path().join("data/cs2_items.json").exists());
}

#[test]
fn market_base_without_path_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("skinbook").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SKINBOOK_USE_MOCK")
        .env("RUST_LOG", "off")
        .args(["--market-base", "mailto:ops@example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("building market connector"));
}

#[test]
fn boolish_env_values_enable_flags() {
    let dir = TempDir::new().unwrap();
    skinbook(&dir)
        .env("SKINBOOK_CREATE_CURSOR", "yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using Mock Connector"));
    assert_eq!(
        read_json(&dir.path().join("data/start_from.json")),
        serde_json::json!({ "start_from": 4 })
    );
}

#[test]
fn falsey_mock_env_value_disables_mock_mode() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("skinbook").unwrap();
    cmd.current_dir(dir.path())
        .env("SKINBOOK_USE_MOCK", "0")
        .env("RUST_LOG", "off")
        .args(["--market-base", "mailto:ops@example.com"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Using Mock Connector").not());
}
