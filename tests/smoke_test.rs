/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

#[test]
fn binary_shows_help() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("alumni-atlas"),
        "Help output should mention alumni-atlas"
    );
}

#[test]
fn binary_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "nonexistent-command"])
        .output()
        .expect("Failed to execute cargo run");

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    // Should show helpful error, not a panic backtrace
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn resolve_prints_coordinates() {
    let output = Command::new("cargo")
        .args(["run", "--", "resolve", "Pune, India", "Atlantis"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "resolve failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pune, India → 18.5204, 73.8567"));
    assert!(stdout.contains("Atlantis → not found"));
}

#[test]
fn svg_writes_document() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("map.svg");
    let output = Command::new("cargo")
        .args(["run", "--", "svg", "--out"])
        .arg(&out)
        .args(["--zoom", "20"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "svg failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let svg = std::fs::read_to_string(&out).expect("SVG not written");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("scale(6)"), "zoom should clamp to 6");
}

#[test]
fn missing_roster_is_an_error() {
    let output = Command::new("cargo")
        .args(["run", "--", "resolve", "--roster", "/nonexistent/people.toml"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn quiet_resolve_hides_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[map]\nmin_zoom = 0.0\n").unwrap();

    let output = Command::new("cargo")
        .args(["run", "--", "-q", "--config"])
        .arg(&config)
        .args(["resolve", "Pune"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Pune → 18.5204, 73.8567"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("must be a positive number"), "{stderr}");
}

#[test]
fn quiet_and_verbose_conflict() {
    let output = Command::new("cargo")
        .args(["run", "--", "-q", "-v", "resolve", "Pune"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be used with"));
}
