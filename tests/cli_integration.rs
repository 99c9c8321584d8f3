//! End-to-end tests of the `learnmap` binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn learnmap() -> Command {
    let mut cmd = Command::cargo_bin("learnmap").expect("binary");
    cmd.env("LEARNMAP_CREDENTIAL_BACKEND", "memory")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("LEARNMAP_API_BASE_URL")
        .env_remove("LEARNMAP_CONFIG")
        .env_remove("LEARNMAP_PASSWORD")
        .env_remove("LEARNMAP_PROFILE")
        .env_remove("LEARNMAP_AUTH_FAILURE");
    cmd
}

#[test]
fn test_help_lists_commands() {
    learnmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("workspace"));
}

#[test]
fn test_status_reports_not_logged_in() {
    let (_dir, config) = common::temp_config_file(
        "api:\n  base_url: http://localhost:9999\ncredentials:\n  backend: memory\n",
    );
    learnmap()
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:9999"))
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn test_json_logs_writes_json_lines_to_stderr() {
    learnmap()
        .args(["--config", "does-not-exist.yaml", "--json-logs", "status"])
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""level":"WARN""#))
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    learnmap()
        .args(["--api-url", "ftp://example.com", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sessions_create_without_materials_fails_validation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/materials/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/learning/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    learnmap()
        .args(["--api-url", uri.as_str(), "sessions", "create", "--title", "Calc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Select at least one material."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_materials_unauthorized_asks_for_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/materials/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Not authenticated"))
        .mount(&server)
        .await;

    let uri = server.uri();
    learnmap()
        .args(["--api-url", uri.as_str(), "materials"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("learnmap login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sessions_create_does_not_depend_on_list_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("lists down"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/learning/sessions"))
        .and(header("Authorization", "Bearer stored-token"))
        .and(body_json(json!({
            "title": "Calculus",
            "objective": null,
            "material_ids": [1, 2]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "title": "Calculus",
            "prerequisites": [
                {"id": 1, "name": "Functions", "parent_id": null},
                {"id": 2, "name": "Limits", "parent_id": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let credentials = dir.path().join("credentials.json");
    std::fs::write(
        &credentials,
        r#"{"access_token":"stored-token","refresh_token":"r","token_type":"bearer"}"#,
    )
    .expect("write credentials");

    let uri = server.uri();
    learnmap()
        .env("LEARNMAP_CREDENTIAL_BACKEND", "file")
        .env("LEARNMAP_CREDENTIAL_FILE", &credentials)
        .args([
            "--api-url",
            uri.as_str(),
            "sessions",
            "create",
            "--title",
            "Calculus",
            "-m",
            "2",
            "-m",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Calculus"))
        .stdout(predicate::str::contains("  - Limits"));
}

#[test]
fn test_sessions_create_without_credential_sends_nothing() {
    learnmap()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "sessions",
            "create",
            "--title",
            "Calculus",
            "-m",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("learnmap login"));
}
