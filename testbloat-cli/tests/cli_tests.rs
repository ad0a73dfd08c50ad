use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn testbloat_bin() -> &'static str {
    env!("CARGO_BIN_EXE_testbloat")
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent directory");
    }
    fs::write(path, contents).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(testbloat_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute testbloat")
}

fn sample_suite() -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    write_file(
        &temp_dir.path().join("small.test.js"),
        "it('small', () => {\n  a();\n});",
    );
    write_file(
        &temp_dir.path().join("spec/big.spec.js"),
        "describe('big', () => {\n  it('big', () => {\n    a();\n    b();\n    c();\n    d();\n  });\n});",
    );
    temp_dir
}

#[test]
fn cli_prints_ranked_text_report() {
    let suite = sample_suite();
    let output = run(&[suite.path().to_str().unwrap()]);

    assert!(
        output.status.success(),
        "expected success, got status {:?}, stderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let big = stdout.find("it('big'").expect("big test missing");
    let small = stdout.find("it('small'").expect("small test missing");
    assert!(big < small, "longest test should come first: {stdout}");
    assert!(
        stdout.contains("Showing 2 of 2 test(s) with at least 0 line(s)"),
        "summary missing: {stdout}"
    );
}

#[test]
fn cli_json_output_has_public_shape() {
    let suite = sample_suite();
    let output = run(&[
        suite.path().to_str().unwrap(),
        "--format",
        "json",
        "--min-lines",
        "3",
    ]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["numTotalTests"], 1);
    assert_eq!(value["largeTests"][0][1], 6);
    assert!(value["largeTests"][0][0]
        .as_str()
        .unwrap()
        .ends_with(":2 - it('big', () => {"));
}

#[test]
fn cli_top_zero_keeps_total() {
    let suite = sample_suite();
    let output = run(&[
        suite.path().to_str().unwrap(),
        "--format",
        "json",
        "--top",
        "0",
    ]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["largeTests"].as_array().unwrap().len(), 0);
    assert_eq!(value["numTotalTests"], 2);
}

#[test]
fn cli_rejects_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");
    let output = run(&[missing.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no report on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is not a directory"), "stderr: {stderr}");
    assert!(stderr.contains("nope"), "diagnostic should name the path: {stderr}");
}

#[test]
fn cli_rejects_negative_min_lines() {
    let suite = sample_suite();
    let output = run(&[suite.path().to_str().unwrap(), "--min-lines", "-1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Number of lines (-1) cannot be negative"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_negative_top() {
    let suite = sample_suite();
    let output = run(&[suite.path().to_str().unwrap(), "--top=-4"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Number of tests (-4) cannot be negative"), "stderr: {stderr}");
}

#[test]
fn cli_argument_errors_win_over_broken_config() {
    let suite = sample_suite();
    write_file(&suite.path().join("package.json"), "{ not json");

    let output = run(&[suite.path().to_str().unwrap(), "--min-lines", "-1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Number of lines (-1) cannot be negative"), "stderr: {stderr}");
    assert!(!stderr.contains("failed to load configuration"), "stderr: {stderr}");

    let output = run(&[suite.path().to_str().unwrap()]);
    assert!(!output.status.success(), "broken config still fails valid runs");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "stderr: {stderr}");
}

#[test]
fn cli_skip_unreadable_from_package_json() {
    let suite = sample_suite();
    write_file(
        &suite.path().join("package.json"),
        r#"{"name": "app", "testbloat": {"skip_unreadable": true}}"#,
    );
    #[cfg(unix)]
    std::os::unix::fs::symlink(
        suite.path().join("missing-target"),
        suite.path().join("broken.test.js"),
    )
    .unwrap();

    let output = run(&[suite.path().to_str().unwrap(), "--format", "json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["numTotalTests"], 2);
}

#[test]
fn cli_reads_config_from_scanned_directory() {
    let suite = sample_suite();
    write_file(&suite.path().join(".testbloatrc.json"), r#"{"min_lines": 4}"#);

    let output = run(&[suite.path().to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["numTotalTests"], 1);

    // CLI flag wins over the config file
    let output = run(&[
        suite.path().to_str().unwrap(),
        "--format",
        "json",
        "--min-lines",
        "0",
    ]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["numTotalTests"], 2);
}

#[test]
fn cli_rejects_invalid_config() {
    let suite = sample_suite();
    write_file(&suite.path().join("testbloat.config.json"), r#"{"bogus": 1}"#);

    let output = run(&[suite.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "stderr: {stderr}");
}

#[cfg(unix)]
#[test]
fn cli_skip_unreadable_warns_and_continues() {
    let suite = sample_suite();
    std::os::unix::fs::symlink(
        suite.path().join("missing-target"),
        suite.path().join("broken.test.js"),
    )
    .unwrap();

    let output = run(&[suite.path().to_str().unwrap()]);
    assert!(!output.status.success(), "unreadable file is fatal by default");

    let output = run(&[
        suite.path().to_str().unwrap(),
        "--skip-unreadable",
        "--sequential",
    ]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.test.js"), "warning should name the file: {stderr}");
}

#[test]
fn cli_output_is_deterministic() {
    let suite = sample_suite();
    let first = run(&[suite.path().to_str().unwrap(), "--format", "json"]);
    let second = run(&[suite.path().to_str().unwrap(), "--format", "json", "--sequential"]);
    assert_eq!(first.stdout, second.stdout);
}
