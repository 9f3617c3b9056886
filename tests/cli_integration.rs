//! Integration tests for the command-line interface
//!
//! Tests write mode, check mode, diff output, JSON output and config handling

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MIXED: &str = "x = 'foo'\n# 'That's a \"test\"'\ny = \"bar\"\n";
const CLEAN: &str = "x = \"foo\"\n# 'That's a \"test\"'\ny = \"bar\"\n";

fn pyquote(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pyquote"))
        .args(args)
        .env_remove("PYQUOTE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Helper to create a project with one inconsistent and one clean file
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg/mixed.py"), MIXED).unwrap();
    fs::write(dir.path().join("pkg/clean.py"), CLEAN).unwrap();
    fs::write(dir.path().join("notes.txt"), "'not python'\n").unwrap();
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help() {
    let output = pyquote(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rewrite single-quoted Python string literals"));
    assert!(stdout.contains("--check"));
}

#[test]
fn test_write_mode_rewrites_directory() {
    let project = setup_project();

    let output = pyquote(&[path_str(project.path())]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rewrote 1 literal(s)"));
    assert!(stdout.contains("Summary:"));

    let mixed = fs::read_to_string(project.path().join("pkg/mixed.py")).unwrap();
    assert_eq!(mixed, CLEAN);
    let notes = fs::read_to_string(project.path().join("notes.txt")).unwrap();
    assert_eq!(notes, "'not python'\n");
}

#[test]
fn test_write_mode_is_idempotent() {
    let project = setup_project();
    let file = project.path().join("pkg/mixed.py");

    assert!(pyquote(&[path_str(&file)]).status.success());
    let output = pyquote(&["--check", path_str(&file)]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), CLEAN);
}

#[test]
fn test_check_mode_reports_and_fails() {
    let project = setup_project();
    let file = project.path().join("pkg/mixed.py");

    let output = pyquote(&["--check", path_str(&file)]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("would be rewritten"));
    assert_eq!(fs::read_to_string(&file).unwrap(), MIXED);
}

#[test]
fn test_check_mode_on_clean_file_succeeds() {
    let project = setup_project();
    let file = project.path().join("pkg/clean.py");

    let output = pyquote(&["--check", path_str(&file)]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), CLEAN);
}

#[test]
fn test_diff_output() {
    let project = setup_project();
    let file = project.path().join("pkg/mixed.py");

    let output = pyquote(&["--check", "--diff", path_str(&file)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-x = 'foo'"));
    assert!(stdout.contains("+x = \"foo\""));
    assert!(!stdout.contains("+# "));
}

#[test]
fn test_json_output() {
    let project = setup_project();

    let output = pyquote(&["--check", "--format", "json", path_str(project.path())]);
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["inconsistent"], 1);
    assert_eq!(report["summary"]["consistent"], 1);
    assert_eq!(report["summary"]["failed"], 0);
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_broken_file_fails_without_stopping_batch() {
    let project = setup_project();
    let broken = project.path().join("pkg/broken.py");
    fs::write(&broken, "x = 'a'\ndef (:\n").unwrap();

    let output = pyquote(&[path_str(project.path())]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.py"));
    assert_eq!(fs::read_to_string(&broken).unwrap(), "x = 'a'\ndef (:\n");
    assert_eq!(
        fs::read_to_string(project.path().join("pkg/mixed.py")).unwrap(),
        CLEAN
    );
}

#[test]
fn test_config_restricts_prefixes() {
    let project = setup_project();
    let file = project.path().join("bytes.py");
    fs::write(&file, "x = b'a'\n").unwrap();
    let config = project.path().join("pyquote.toml");
    fs::write(&config, "[grammar]\nprefixes = [\"r\"]\n").unwrap();

    let output = pyquote(&["--config", path_str(&config), path_str(&file)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not match the quote grammar"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "x = b'a'\n");
}

#[test]
fn test_invalid_config_is_rejected() {
    let project = setup_project();
    let config = project.path().join("pyquote.toml");
    fs::write(&config, "[files]\nextensions = [\".py\"]\n").unwrap();

    let output = pyquote(&["--config", path_str(&config), path_str(project.path())]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}

#[test]
fn test_no_python_files() {
    let dir = TempDir::new().unwrap();
    let output = pyquote(&[path_str(dir.path())]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Python files found"));
}
