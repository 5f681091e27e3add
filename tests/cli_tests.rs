//! CLI Integration Tests for Adalat
//!
//! Runs the built `adalat-server` binary in temporary directories.

mod common;

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_adalat(args: &[&str], working_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_adalat-server"))
        .args(args)
        .arg("--no-color")
        .current_dir(working_dir)
        .env_remove("ADALAT_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute adalat-server")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_adalat(&["--help"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Adalat"));
    for command in ["serve", "init", "ingest", "build-index", "ask", "stats", "check"] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_adalat(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_scaffolds_working_directory() {
    let dir = TempDir::new().unwrap();
    let output = run_adalat(&["init"], dir.path());

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(dir.path().join("adalat.toml").is_file());
    assert!(dir.path().join(".env.example").is_file());
    assert!(dir.path().join(".gitignore").is_file());
    assert!(dir.path().join("data").is_dir());
    assert!(dir.path().join("vectorstore").is_dir());
    assert!(dir.path().join("logs").is_dir());

    // A second run leaves the existing config alone
    std::fs::write(dir.path().join("adalat.toml"), "# edited\n").unwrap();
    let output = run_adalat(&["init"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("already exists"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("adalat.toml")).unwrap(),
        "# edited\n"
    );
}

#[test]
fn test_check_fails_without_corpus() {
    let dir = TempDir::new().unwrap();
    run_adalat(&["init"], dir.path());

    let output = run_adalat(&["check"], dir.path());
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("corpus"));
    assert!(text.contains("vector store"));
}

#[test]
fn test_stats_and_ingest_on_fixture_corpus() {
    let dir = TempDir::new().unwrap();
    run_adalat(&["init"], dir.path());
    common::write_fixture_csv(&dir.path().join("data").join("laws.csv"));

    let output = run_adalat(&["stats"], dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Total acts: 3"));
    assert!(text.contains("Repealed acts: 1"));

    let output = run_adalat(&["ingest"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("7 chunks from 3 acts"));
    assert!(dir.path().join("data/processed_documents.json").is_file());
}

#[test]
fn test_ask_without_index_fails() {
    let dir = TempDir::new().unwrap();
    run_adalat(&["init"], dir.path());

    let output = run_adalat(&["ask", "What is theft?"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("build-index"));
}
