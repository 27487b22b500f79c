//! End-to-end CLI tests for the disclosure-dl and disclosure-catalog binaries.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("disclosure-dl").unwrap();
    // Keep any real user config file out of the test.
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch discover and download"))
        .stdout(predicate::str::contains("--wordlist"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("disclosure-dl"));
}

/// Test that the article type is required.
#[test]
fn test_binary_missing_article_type_returns_error() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .args(["ann", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that a run without query terms fails before any network work.
#[test]
fn test_binary_without_terms_fails_with_configuration_error() {
    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    downloader(&config_home)
        .args(["ann", "--endpoint", "http://127.0.0.1:9/AdvancedSearch.aspx", "-o"])
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no query terms"));
}

/// Test that a category on an announcement search is rejected.
#[test]
fn test_binary_category_without_news_fails() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .args(["ann", "-n", "Tesco", "-c", "results"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only valid for news"));
}

/// Test that an unreadable explicit config file is reported.
#[test]
fn test_binary_missing_config_file_fails() {
    let config_home = TempDir::new().unwrap();
    downloader(&config_home)
        .args(["ann", "-n", "Tesco", "--config"])
        .arg(config_home.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

/// Test a full run against a mock portal.
#[tokio::test(flavor = "multi_thread")]
async fn test_binary_downloads_documents_from_mock_portal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/AdvancedSearch.aspx"))
        .and(query_param("qsArticleType", "ann"))
        .and(query_param("qsSearchFor", "S2"))
        .and(query_param("qsContains", "TSCO"))
        .and(query_param("pno", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table><tr><td><a href="CompData.aspx?code=TSCO&amp;src=s"><b>Tesco PLC (TSCO)</b></a></td><td><a href="/Article.aspx/TSCO/20090515_070000/">Final Results</a></td></tr></table>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/AdvancedSearch.aspx"))
        .and(query_param("pno", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>No results</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Article.aspx/TSCO/20090515_070000/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<p>15 May, 2009</p><p>Results body.</p><p>This information is provided by RNS</p>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let endpoint = format!("{}/AdvancedSearch.aspx", server.uri());
    let output_dir = output.path().to_path_buf();

    let home = config_home.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::cargo_bin("disclosure-dl").unwrap();
        cmd.env("XDG_CONFIG_HOME", &home)
            .env_remove("RUST_LOG")
            .args(["ann", "-s", "S2", "-n", "TSCO", "-r", "2", "--endpoint", &endpoint, "-o"])
            .arg(&output_dir)
            .assert()
            .success();
    })
    .await
    .unwrap();

    let written = std::fs::read_to_string(
        output
            .path()
            .join("TSCO_Tesco PLC_Final Results_20090515.txt"),
    )
    .unwrap();
    assert_eq!(written, "Results body.");
}

/// Test that the catalog binary exports a document directory.
#[test]
fn test_catalog_binary_writes_csv() {
    let docs = TempDir::new().unwrap();
    std::fs::write(docs.path().join("ABC_Foo_Bar_20090101.txt"), "a").unwrap();
    std::fs::write(docs.path().join("TSCO_Tesco PLC_Final Results_20090515.txt"), "b").unwrap();
    let out = docs.path().join("catalog.csv");

    Command::cargo_bin("disclosure-catalog")
        .unwrap()
        .arg(docs.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        csv,
        "code,company_name,title,timestamp,filename\n\
         ABC,Foo,Bar,2009-01-01,ABC_Foo_Bar_20090101.txt\n\
         TSCO,Tesco PLC,Final Results,2009-05-15,TSCO_Tesco PLC_Final Results_20090515.txt\n"
    );
}
