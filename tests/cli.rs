use assert_cmd::prelude::*;
use mockito::Matcher;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path, api_url: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!("org: acme\napi_url: {api_url}\ndenylist: [\".github\"]\n");
    fs::write(&path, contents).expect("failed to write config");
    path
}

/// Binary with a hermetic environment: no real token, no real config
fn ghops(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ghops"));
    cmd.env("HOME", home)
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GHOPS_ORG")
        .env_remove("GHOPS_CONFIG")
        .env_remove("GHOPS_API_URL");
    cmd
}

#[test]
fn approve_by_number_without_repo_fails_before_auth() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    // No token anywhere: the flag check must come first
    ghops(temp.path())
        .args(["pull-requests", "--approve", "42"])
        .env("PATH", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("repo flag is required"));

    Ok(())
}

#[test]
fn invalid_quarter_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    ghops(temp.path())
        .args(["release-notes", "--quarter", "Q5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Q5"));

    Ok(())
}

#[test]
fn invalid_year_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    ghops(temp.path())
        .args(["release-notes", "--year", "24"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("four-digit year"));

    Ok(())
}

#[test]
fn unknown_flag_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    ghops(temp.path())
        .args(["security-alerts", "--no-such-flag"])
        .assert()
        .code(1);

    Ok(())
}

#[test]
fn help_exits_zero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    ghops(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pr-metrics"));

    Ok(())
}

#[test]
fn missing_gh_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://127.0.0.1:9");

    ghops(temp.path())
        .args(["security-alerts", "--config"])
        .arg(&config_path)
        .env("PATH", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing dependency"));

    Ok(())
}

#[test]
fn completion_prints_script() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    ghops(temp.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghops"));

    Ok(())
}

#[test]
fn security_alerts_high_risk_against_mock_api() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    let _repo = server
        .mock("GET", "/repos/acme/web")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"name":"web","full_name":"acme/web","owner":{"login":"acme"},
                "archived":false,"default_branch":"main"}"#,
        )
        .create();

    let _alerts = server
        .mock("GET", "/repos/acme/web/dependabot/alerts")
        .match_query(Matcher::UrlEncoded("state".into(), "open".into()))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
              {"number":1,"state":"open",
               "dependency":{"package":{"ecosystem":"npm","name":"minimist"}},
               "security_advisory":{"ghsa_id":"GHSA-aaaa-bbbb-cccc","summary":"Prototype pollution",
                                    "severity":"medium","published_at":"2024-01-01T00:00:00Z"},
               "html_url":"https://github.com/acme/web/security/dependabot/1",
               "created_at":"2024-01-01T00:00:00Z"},
              {"number":2,"state":"open",
               "dependency":{"package":{"ecosystem":"npm","name":"lodash"}},
               "security_advisory":{"ghsa_id":"GHSA-dddd-eeee-ffff","summary":"Command injection",
                                    "severity":"critical","published_at":"2024-01-02T00:00:00Z"},
               "html_url":"https://github.com/acme/web/security/dependabot/2",
               "created_at":"2024-01-02T00:00:00Z"}
            ]"#,
        )
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    let assert = ghops(temp.path())
        .args(["security-alerts", "--high-risk", "--repo", "web", "--config"])
        .arg(&config_path)
        .env("GH_TOKEN", "test-token")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("lodash"));
    assert!(stdout.contains("GHSA-dddd-eeee-ffff"));
    assert!(!stdout.contains("minimist"));

    Ok(())
}

#[test]
fn security_alerts_csv_against_mock_api() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    let _repo = server
        .mock("GET", "/repos/acme/web")
        .with_status(200)
        .with_body(r#"{"name":"web","full_name":"acme/web","owner":{"login":"acme"}}"#)
        .create();

    let _alerts = server
        .mock("GET", "/repos/acme/web/dependabot/alerts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"number":3,"state":"open",
                 "dependency":{"package":{"ecosystem":"pip","name":"requests"}},
                 "security_advisory":{"ghsa_id":"GHSA-1111-2222-3333","summary":"Leak, with comma",
                                      "severity":"high","published_at":"2024-05-06T07:08:09Z"},
                 "html_url":"https://github.com/acme/web/security/dependabot/3",
                 "created_at":"2024-05-06T07:08:09Z"}]"#,
        )
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    ghops(temp.path())
        .args(["security-alerts", "--csv", "-r", "web", "--config"])
        .arg(&config_path)
        .env("GH_TOKEN", "test-token")
        .assert()
        .success()
        .stdout(
            "Repository,Package,Severity,GHSA ID,Published,URL\n\
             acme/web,requests,high,GHSA-1111-2222-3333,2024-05-06T07:08:09Z,https://github.com/acme/web/security/dependabot/3\n",
        );

    Ok(())
}

#[test]
fn missing_repository_is_terminal() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    let _repo = server
        .mock("GET", "/repos/acme/ghost")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    ghops(temp.path())
        .args(["pending-releases", "--repo", "ghost", "--config"])
        .arg(&config_path)
        .env("GH_TOKEN", "test-token")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "repository not found or not accessible: acme/ghost",
        ));

    Ok(())
}

#[test]
fn repo_settings_without_matching_repositories_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    // One archived repository and one on the denylist: nothing is left to configure
    let _repos = server
        .mock("GET", "/orgs/acme/repos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"name":"legacy","full_name":"acme/legacy","owner":{"login":"acme"},"archived":true},
                {"name":".github","full_name":"acme/.github","owner":{"login":"acme"}}]"#,
        )
        .create();

    let patch = server
        .mock("PATCH", Matcher::Any)
        .expect(0)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    ghops(temp.path())
        .args(["repo-settings", "auto-merge", "--config"])
        .arg(&config_path)
        .env("GH_TOKEN", "test-token")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no repositories found in acme"));

    patch.assert();
    Ok(())
}

#[test]
fn approve_followed_by_filter_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://127.0.0.1:9");

    // Parsing succeeds and the run stops at token lookup
    ghops(temp.path())
        .args(["pull-requests", "--approve", "web", "--config"])
        .arg(&config_path)
        .env("PATH", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing dependency"));

    Ok(())
}
