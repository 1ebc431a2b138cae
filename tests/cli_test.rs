//! Integration tests for the command-line tool.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: [&str; 6] = [
    "TEMPLATE_RESOLVER_LOCAL_TTL",
    "TEMPLATE_RESOLVER_NEGATIVE_TTL",
    "TEMPLATE_RESOLVER_HTTP_TIMEOUT",
    "TEMPLATE_RESOLVER_URL_TEMPLATE",
    "TEMPLATE_RESOLVER_DEFAULT_TEMPLATE",
    "TEMPLATE_RESOLVER_SHARED_DIR",
];

fn resolver_cmd() -> Command {
    let mut cmd = Command::new(cargo_bin("template-resolver"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("resolver.yml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("config"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn resolve_prints_origin_body() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/shop/layout.html");
        then.status(200).body("<html>{{{body}}}</html>");
    });

    resolver_cmd()
        .env(
            "TEMPLATE_RESOLVER_URL_TEMPLATE",
            server.url("/{app}/{name}.html"),
        )
        .args(["resolve", "redis:layout", "-C", "app=shop"])
        .assert()
        .success()
        .stdout("<html>{{{body}}}</html>");

    mock.assert_calls(1);
    Ok(())
}

#[test]
fn resolve_shows_source_on_stderr() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .env("TEMPLATE_RESOLVER_DEFAULT_TEMPLATE", "fallback")
        .args(["resolve", "redis:missing", "--prefix", "layouts", "--show-source"])
        .assert()
        .success()
        .stdout("fallback")
        .stderr(predicate::str::contains("from default"));
    Ok(())
}

#[test]
fn resolve_foreign_name_exits_3() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .args(["resolve", "layouts/application"])
        .assert()
        .code(3)
        .stdout("");
    Ok(())
}

#[test]
fn shared_directory_survives_between_runs() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/nav");
        then.status(200).body("<nav/>");
    });
    let config = write_config(
        &temp,
        &format!(
            "shared:\n  directory: {}\norigin:\n  url_template: \"{}\"\n",
            temp.path().join("shared").display(),
            server.url("/{name}")
        ),
    );

    for _ in 0..2 {
        resolver_cmd()
            .arg("--config")
            .arg(&config)
            .args(["resolve", "redis:nav"])
            .assert()
            .success()
            .stdout("<nav/>");
    }

    mock.assert_calls(1);
    Ok(())
}

#[test]
fn config_prints_effective_yaml() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "local_cache:\n  ttl: 120\n");

    resolver_cmd()
        .env("TEMPLATE_RESOLVER_NEGATIVE_TTL", "7")
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("ttl: 120"))
        .stdout(predicate::str::contains("negative_ttl: 7"));
    Ok(())
}

#[test]
fn config_json_output() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .args(["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"negative_ttl\": 10"));
    Ok(())
}

#[test]
fn missing_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    resolver_cmd()
        .arg("--config")
        .arg(temp.path().join("absent.yml"))
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("absent.yml"));
    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    resolver_cmd()
        .env("TEMPLATE_RESOLVER_NEGATIVE_TTL", "90")
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("negative_ttl"));
    Ok(())
}
