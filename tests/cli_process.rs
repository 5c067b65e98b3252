//! Integration tests for the process command, run against the built binary.

use std::path::Path;
use std::process::Command;

fn write_fast_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        "[session]\ntick_interval_ms = 1\nsettle_delay_ms = 1\nproducer_timeout_secs = 5\n",
    )
    .unwrap();
    path
}

fn notegenius() -> Command {
    Command::new(env!("CARGO_BIN_EXE_notegenius"))
}

#[test]
fn test_version() {
    let output = notegenius().arg("version").output().expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("NoteGenius "));
}

#[test]
fn test_process_text_prints_summary_and_actions() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fast_config(dir.path());

    let output = notegenius()
        .args(["process", "--no-progress", "--text", "Q3 planning notes..."])
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("📋 MEETING SUMMARY"));
    assert!(stdout.contains("✅ ACTION ITEMS"));
    assert!(stdout.contains("(Due: July 15, 2025)"));
}

#[test]
fn test_process_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fast_config(dir.path());

    let output = notegenius()
        .args(["process", "--no-progress", "nonexistent.wav"])
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("File not found"),
        "Expected 'File not found' error, got: {}",
        stderr
    );
}

#[test]
fn test_process_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fast_config(dir.path());
    let audio = dir.path().join("call.ogg");
    std::fs::write(&audio, b"OggS").unwrap();

    let output = notegenius()
        .args(["process", "--no-progress"])
        .arg(&audio)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Please upload an audio file (MP3 or WAV)"),
        "Expected rejection message, got: {}",
        stderr
    );
}

#[test]
fn test_config_creates_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("fresh").join("config.toml");

    let output = notegenius()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success());
    assert!(config.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("provider = \"sample\""));
    assert!(stdout.contains("port = 3838"));
}
