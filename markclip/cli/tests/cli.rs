//! Integration tests for the markclip CLI.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PAGE: &str = r#"<html>
<head><title>My Page</title><meta name="author" content="Ada"></head>
<body><h1>Hello</h1><p>World <a href="/x">link</a></p></body>
</html>"#;

fn markclip(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("markclip").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

fn page(dir: &TempDir, name: &str, title: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, PAGE.replace("My Page", title)).unwrap();
    path
}

#[test]
fn cli_shows_help() {
    Command::cargo_bin("markclip")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clip HTML pages to Markdown files"))
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("link"))
        .stdout(predicate::str::contains("options"));
}

#[test]
fn cli_shows_version() {
    Command::cargo_bin("markclip")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("markclip 0.1.0"));
}

#[test]
fn convert_prints_markdown() {
    let dir = TempDir::new().unwrap();
    let html = page(&dir, "page.html", "My Page");

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "--stdout", "--base-url", "https://ex.com/a/"])
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Hello\n\nWorld [link](https://ex.com/x)"));
}

#[test]
fn convert_reads_stdin() {
    let dir = TempDir::new().unwrap();

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "-", "--stdout", "--base-url", "https://ex.com/"])
        .write_stdin(PAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("World [link](https://ex.com/x)"));
}

#[test]
fn convert_uses_the_selection() {
    let dir = TempDir::new().unwrap();
    let html = page(&dir, "page.html", "My Page");
    let selection = dir.path().join("selection.html");
    fs::write(&selection, "<p>Only <strong>this</strong></p>").unwrap();

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "--stdout", "--selection"])
        .arg(&selection)
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Only **this**"))
        .stdout(predicate::str::contains("Hello").not());
}

#[test]
fn convert_writes_the_clip_file() {
    let dir = TempDir::new().unwrap();
    let html = page(&dir, "page.html", "Notes: Day #1");
    let out = dir.path().join("out");

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "--base-url", "https://ex.com/", "-o"])
        .arg(&out)
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes Day 1.md"));

    let markdown = fs::read_to_string(out.join("Notes Day 1.md")).unwrap();
    assert_eq!(markdown, "# Hello\n\nWorld [link](https://ex.com/x)");
}

#[test]
fn convert_applies_the_settings_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("options.yaml");
    fs::write(
        &config,
        "includeTemplate: true\nfrontmatter: \"author: {byline}\"\nlinkStyle: stripLinks\n",
    )
    .unwrap();
    let html = page(&dir, "page.html", "My Page");

    markclip(&config)
        .args(["convert", "--stdout", "--base-url", "https://ex.com/"])
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("author: Ada\n"))
        .stdout(predicate::str::contains("World link"));
}

#[test]
fn convert_fails_on_missing_input() {
    let dir = TempDir::new().unwrap();

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "--stdout"])
        .arg(dir.path().join("missing.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn convert_rejects_download_with_stdout() {
    let dir = TempDir::new().unwrap();

    markclip(&dir.path().join("options.yaml"))
        .args(["convert", "--stdout", "--download-images", "page.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn link_prints_one_link_or_a_list() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("options.yaml");
    let one = page(&dir, "one.html", "One");
    let two = page(&dir, "two.html", "Two");

    markclip(&config)
        .args(["link", "--base-url", "https://ex.com/"])
        .arg(&one)
        .assert()
        .success()
        .stdout("[One](https://ex.com/)\n");

    markclip(&config)
        .args(["link", "--base-url", "https://ex.com/"])
        .arg(&one)
        .arg(&two)
        .assert()
        .success()
        .stdout("- [One](https://ex.com/)\n- [Two](https://ex.com/)\n");
}

#[test]
fn options_prints_yaml_with_overrides() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("options.yaml");
    fs::write(&config, "downloadImages: true\n").unwrap();

    markclip(&config)
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("downloadImages: true"))
        .stdout(predicate::str::contains("headingStyle: atx"));
}

#[test]
fn toggle_persists_the_setting() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("options.yaml");

    markclip(&config)
        .args(["toggle", "includeTemplate"])
        .assert()
        .success()
        .stdout("includeTemplate: true\n");

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("includeTemplate: true"));
}

#[test]
fn toggle_rejects_non_boolean_settings() {
    let dir = TempDir::new().unwrap();

    markclip(&dir.path().join("options.yaml"))
        .args(["toggle", "hr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'hr' is not a boolean setting"));
}
