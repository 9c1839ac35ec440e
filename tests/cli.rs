//
//  gitlab-tools
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! End-to-end checks of the `glt` binary that need no GitLab instance.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GITLAB_VARS: [&str; 9] = [
    "GITLAB_URL",
    "GITLAB_TOKEN",
    "GITLAB_READ_ONLY",
    "GITLAB_TIMEZONE",
    "GITLAB_USE_STRUCTURED_CONTENT",
    "GITLAB_NAMESPACES",
    "GITLAB_MEMBERSHIP_ONLY",
    "GITLAB_TIMEOUT_SECS",
    "GITLAB_BATCH_CONCURRENCY",
];

/// A `glt` invocation isolated from the caller's environment and config file.
fn glt(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("glt").unwrap();
    for var in GITLAB_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("GLT_COMPACT")
        .env("GLT_CONFIG", config_dir.path().join("config.toml"))
        .env("GLT_LOG", "off");
    cmd
}

/// Same as [`glt`] with a reachable-looking instance configured.
fn configured(config_dir: &TempDir) -> Command {
    let mut cmd = glt(config_dir);
    // Port 9 is discard; tests using this never reach the network.
    cmd.env("GITLAB_URL", "http://127.0.0.1:9")
        .env("GITLAB_TOKEN", "glpat-secret-value");
    cmd
}

fn write_config(dir: &TempDir, content: &str) {
    std::fs::write(dir.path().join("config.toml"), content).unwrap();
}

#[test]
fn help_lists_tool_groups() {
    let dir = TempDir::new().unwrap();
    glt(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("project"))
        .stdout(predicate::str::contains("pipeline"))
        .stdout(predicate::str::contains("tag"));
}

#[test]
fn version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    glt(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("glt version "))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_url_is_a_configuration_failure() {
    let dir = TempDir::new().unwrap();
    glt(&dir)
        .args(["project", "list"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(r#""success": false"#))
        .stdout(predicate::str::contains(r#""kind": "configuration""#))
        .stdout(predicate::str::contains("GITLAB_URL"));
}

#[test]
fn tag_creation_is_refused_by_default() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .args(["tag", "create", "team/api", "v1.2.3", "--ref", "main"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains(r#""success": false"#))
        .stdout(predicate::str::contains(r#""kind": "permission""#))
        .stdout(predicate::str::contains("GITLAB_READ_ONLY=false"));
}

#[test]
fn invalid_tag_name_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .env("GITLAB_READ_ONLY", "false")
        .args(["tag", "create", "team/api", "release-7", "--ref", "main"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(r#""field": "tagName""#));
}

#[test]
fn out_of_range_page_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .args(["project", "list", "--per-page", "101"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(r#""field": "perPage""#));
}

#[test]
fn download_without_confirm_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("trace.log");

    configured(&dir)
        .args(["job", "download", "team/api", "77", "--output"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""written": false"#))
        .stdout(predicate::str::contains("--confirm"));

    assert!(!Path::new(&target).exists());
}

#[test]
fn pending_download_reports_absolute_path() {
    let dir = TempDir::new().unwrap();
    let output = configured(&dir)
        .current_dir(dir.path())
        .args(["--compact", "job", "download", "team/api", "77"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let path = Path::new(envelope["payload"]["path"].as_str().unwrap());
    assert!(path.is_absolute());
    assert!(path.ends_with("job-77.log"));
    assert!(!dir.path().join("job-77.log").exists());
}

#[test]
fn download_window_is_checked_before_any_request() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .args(["job", "download", "team/api", "77", "--confirm", "--max-bytes", "10"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(r#""field": "maxBytes""#));
}

#[test]
fn compact_flag_emits_single_line_envelope() {
    let dir = TempDir::new().unwrap();
    let output = configured(&dir)
        .args(["--compact", "info"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1);

    let envelope: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["payload"]["readOnly"], true);
    assert_eq!(envelope["payload"]["tokenConfigured"], true);
}

#[test]
fn info_never_prints_the_token() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("glpat-secret-value").not());
}

#[test]
fn config_file_is_layered_under_environment() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
read_only = false
timezone = "Europe/Berlin"

[gitlab]
url = "https://gitlab.example.com"
token = "glpat-from-file"
"#,
    );

    let output = glt(&dir)
        .env("GITLAB_TIMEZONE", "Africa/Harare")
        .args(["--compact", "info"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let payload = &envelope["payload"];
    assert_eq!(payload["gitlabUrl"], "https://gitlab.example.com/");
    assert_eq!(payload["readOnly"], false);
    assert_eq!(payload["timezone"], "Africa/Harare");
    assert!(payload["configFile"].as_str().unwrap().ends_with("config.toml"));
}

#[test]
fn unstructured_mode_prints_summary_line() {
    let dir = TempDir::new().unwrap();
    configured(&dir)
        .env("GITLAB_USE_STRUCTURED_CONTENT", "false")
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("glt "))
        .stdout(predicate::str::contains("read-only"))
        .stdout(predicate::str::contains(r#""success""#).not());
}

#[test]
fn completion_script_is_generated() {
    let dir = TempDir::new().unwrap();
    glt(&dir)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("glt"));
}
