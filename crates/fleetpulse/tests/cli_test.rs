//! Integration tests for the `fleetpulse` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! offline; API commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fleetpulse` binary with env isolation.
///
/// Clears all `FLEETPULSE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn fleetpulse_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fleetpulse");
    cmd.env("HOME", "/tmp/fleetpulse-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fleetpulse-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("FLEETPULSE_CONFIG")
        .env_remove("FLEETPULSE_OUTPUT")
        .env_remove("FLEETPULSE_API_HOST")
        .env_remove("FLEETPULSE_API_PORT")
        .env_remove("FLEETPULSE_API_PREFIX")
        .env_remove("FLEETPULSE_API_TIMEOUT_SECS")
        .env_remove("FLEETPULSE_DASHBOARD_POLL_INTERVAL_MS")
        .env_remove("FLEETPULSE_DASHBOARD_AUTO_REFRESH")
        .env_remove("RUST_LOG");
    cmd
}

/// A command aimed at `server`'s `/api` root.
fn api_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = fleetpulse_cmd();
    cmd.args([
        "--host",
        "127.0.0.1",
        "--port",
        &server.address().port().to_string(),
        "--timeout",
        "5",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_devices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/devices/company/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "device_id": 11, "device_name": "Boiler", "status": "online",
              "last_read_at": "2024-05-01T10:30:05Z" },
            { "device_id": 12, "device_name": "Pump", "status": "offline",
              "last_read_at": null }
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fleetpulse_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    fleetpulse_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("device status")
            .and(predicate::str::contains("companies"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    fleetpulse_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetpulse"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fleetpulse_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    fleetpulse_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = fleetpulse_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = fleetpulse_cmd()
        .args(["--output", "invalid", "companies"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid"));
}

#[test]
fn test_invalid_status_filter() {
    let output = fleetpulse_cmd()
        .args(["devices", "7", "--status", "sleeping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_devices_requires_company() {
    let output = fleetpulse_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("<COMPANY>"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    fleetpulse_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("# API root: http://localhost:5000/api")
                .and(predicate::str::contains("[dashboard]"))
                .and(predicate::str::contains("poll_interval_ms = 10000")),
        );
}

#[test]
fn test_config_show_layers_file_env_and_flags() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[api]\nhost = \"fleet.internal\"\nport = 7100\n\n[dashboard]\npoll_interval_ms = 2500"
    )
    .unwrap();

    fleetpulse_cmd()
        .env("FLEETPULSE_DASHBOARD_POLL_INTERVAL_MS", "500")
        .args(["--config"])
        .arg(file.path())
        .args(["--port", "7200", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://fleet.internal:7200/api")
                .and(predicate::str::contains("poll_interval_ms = 500")),
        );
}

#[test]
fn test_config_show_json() {
    let output = fleetpulse_cmd()
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["api"]["port"], 5000);
    assert_eq!(value["dashboard"]["auto_refresh"], true);
}

#[test]
fn test_config_missing_explicit_file() {
    fleetpulse_cmd()
        .args(["--config", "/tmp/fleetpulse-cli-test-nonexistent/nope.toml"])
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_config_path_honours_flag() {
    fleetpulse_cmd()
        .args(["--config", "/etc/fleetpulse.toml", "config", "path"])
        .assert()
        .success()
        .stdout("/etc/fleetpulse.toml\n");
}

#[test]
fn test_invalid_port_is_usage_error() {
    fleetpulse_cmd()
        .args(["--port", "0", "companies"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api.port"));
}

// ── Companies ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_companies_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Acme" },
            { "id": 7, "name": "Globex" }
        ])))
        .mount(&server)
        .await;

    api_cmd(&server)
        .arg("companies")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Acme")
                .and(predicate::str::contains("Globex"))
                .and(predicate::str::contains("ID")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_companies_plain_lists_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Acme" },
            { "id": "c-7", "name": "Globex" }
        ])))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["-o", "plain", "companies"])
        .assert()
        .success()
        .stdout("1\nc-7\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_companies_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    api_cmd(&server)
        .arg("companies")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTP 500"));
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_table_with_summary() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    api_cmd(&server)
        .args(["devices", "7"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Boiler")
                .and(predicate::str::contains("Pump"))
                .and(predicate::str::contains("never"))
                .and(predicate::str::contains("1 online / 2 total")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_status_filter_keeps_full_summary() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    api_cmd(&server)
        .args(["devices", "7", "--status", "offline"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Pump")
                .and(predicate::str::contains("Boiler").not())
                .and(predicate::str::contains("1 online / 2 total")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_search_is_case_insensitive() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    api_cmd(&server)
        .args(["-o", "plain", "devices", "7", "--search", "  BOIL "])
        .assert()
        .success()
        .stdout("11\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_json_is_normalized() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    let output = api_cmd(&server)
        .args(["-o", "json", "devices", "7"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let devices = value.as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id"], "11");
    assert_eq!(devices[0]["status"], "online");
    assert_eq!(devices[1]["last_read_at"], serde_json::Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_unknown_company() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices/company/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["devices", "9"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("company '9' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices/company/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["devices", "7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unexpected response"));
}

// ── Watch ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_single_refresh() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    api_cmd(&server)
        .args(["watch", "7", "--count", "1", "--status", "online"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1 online / 2 total")
                .and(predicate::str::contains("Boiler"))
                .and(predicate::str::contains("Pump").not()),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_polls_until_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices/company/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "device_id": 11, "device_name": "Boiler", "status": "online" }
        ])))
        .expect(2)
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["watch", "7", "--count", "2", "--interval-ms", "200"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_unknown_company_exits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/devices/company/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["watch", "9", "--count", "3"])
        .assert()
        .code(4);
}

// ── Health & endpoints ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_health_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["-o", "plain", "health"])
        .assert()
        .success()
        .stdout("ok\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "degraded" })))
        .mount(&server)
        .await;

    api_cmd(&server)
        .arg("health")
        .assert()
        .code(5)
        .stdout(predicate::str::contains("degraded"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_endpoints_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoints": {
                "companies": "/api/companies/",
                "health": "/api/health"
            }
        })))
        .mount(&server)
        .await;

    api_cmd(&server)
        .args(["-o", "plain", "endpoints"])
        .assert()
        .success()
        .stdout("/api/companies/\n/api/health\n");
}

// ── Connection errors ───────────────────────────────────────────────

#[test]
fn test_unreachable_api() {
    fleetpulse_cmd()
        .args(["--host", "127.0.0.1", "--port", "1", "--timeout", "2", "companies"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the device API"));
}
