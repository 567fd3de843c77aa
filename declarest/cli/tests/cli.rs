use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_YAML: &str = r#"
defaults:
  base_url: /api
endpoints:
  users: {}
  posts:
    url: users/:user/posts/:id
    merge_default_params: true
    params:
      user: '@author.id'
    merge_default_actions: true
    actions:
      publish:
        method: POST
        url: publish
"#;

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("api.yaml");
    std::fs::write(&path, API_YAML).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_mentions_subcommands() {
    cargo_bin_cmd!("declarest")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("call"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_shows_endpoints_and_actions() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    cargo_bin_cmd!("declarest")
        .arg("list")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("users /api/users/:id"))
        .stdout(predicate::str::contains("posts /api/users/:user/posts/:id"))
        .stdout(predicate::str::is_match(r"POST\s+publish\s+/api/users/:user/posts/:id/publish").unwrap())
        .stdout(predicate::str::is_match(r"DELETE\s+delete\s+/api/users/:id").unwrap());
}

#[test]
fn test_list_missing_config_fails() {
    cargo_bin_cmd!("declarest")
        .args(["list", "/no/such/api.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load API definition"));
}

// ============================================================================
// render
// ============================================================================

fn render(config: &Path, args: &[&str]) -> Value {
    let output = cargo_bin_cmd!("declarest")
        .arg("render")
        .arg(config)
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    stdout_json(&output.stdout)
}

#[test]
fn test_render_get_with_param() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let request = render(&config, &["users", "get", "-p", "id=7"]);
    assert_eq!(request, json!({"method": "GET", "url": "/api/users/7"}));
}

#[test]
fn test_render_keeps_long_numeric_id_verbatim() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let request = render(&config, &["users", "get", "-p", "id=123456789012345678901234"]);
    assert_eq!(request["url"], json!("/api/users/123456789012345678901234"));

    let request = render(&config, &["users", "get", "-p", "id=1e3"]);
    assert_eq!(request["url"], json!("/api/users/1e3"));
}

#[test]
fn test_render_query_params() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let request = render(&config, &["users", "query", "-p", "page=2", "-p", "sort=name"]);
    assert_eq!(request["url"], json!("/api/users"));
    assert_eq!(request["params"], json!({"page": 2, "sort": "name"}));
}

#[test]
fn test_render_update_takes_id_from_data() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let request = render(
        &config,
        &["posts", "update", "--data", r#"{"id": 3, "author": {"id": 9}, "title": "t"}"#],
    );
    assert_eq!(request["method"], json!("PUT"));
    assert_eq!(request["url"], json!("/api/users/9/posts/3"));
    assert_eq!(request["data"]["title"], json!("t"));
}

#[test]
fn test_render_unknown_endpoint_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    cargo_bin_cmd!("declarest")
        .arg("render")
        .arg(&config)
        .args(["groups", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown endpoint: groups"));
}

#[test]
fn test_render_bad_param_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    cargo_bin_cmd!("declarest")
        .arg("render")
        .arg(&config)
        .args(["users", "get", "-p", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

// ============================================================================
// call
// ============================================================================

#[tokio::test]
async fn test_call_prints_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/5/posts"))
        .and(query_param("draft", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "title": "a"}])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let base_url = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("declarest")
            .arg("call")
            .arg(&config)
            .args(["posts", "query", "-p", "user=5", "-p", "draft=false"])
            .args(["--base-url", &base_url, "--dedupe"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output.stdout), json!([{"id": 1, "title": "a"}]));
}

#[tokio::test]
async fn test_call_http_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let base_url = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("declarest")
            .arg("call")
            .arg(&config)
            .args(["users", "delete", "-p", "id=1", "--base-url", &base_url])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("HTTP 500 for DELETE /api/users/1"));
}
