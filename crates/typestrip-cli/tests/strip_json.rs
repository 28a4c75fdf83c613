//! Integration tests for `typestrip strip`.
//!
//! These tests verify:
//! - Single files are printed to stdout
//! - Directories produce sibling `.js` files with the original line count
//! - `--json` output is valid JSON with `schema_version`, `ok` and `notes`
//! - Failures exit non-zero and carry SCREAMING_SNAKE_CASE codes

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "--quiet", "-p", "typestrip-cli", "--bin", "typestrip", "--"]);
    cmd
}

#[test]
fn test_strip_single_file_to_stdout() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.ts"),
        "function foo(a: number, b: string): void {}\n",
    )
    .unwrap();

    let output = cargo_bin()
        .args(["strip", "a.ts", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    assert!(output.status.success(), "strip should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "function foo(a, b) {}\n");
}

#[test]
fn test_strip_directory_writes_siblings() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    let source = "interface P {\n  x: number\n}\nexport const p: P = { x: 1 }\n";
    std::fs::write(src.join("p.ts"), source).unwrap();
    std::fs::write(src.join("q.mts"), "let q: string = 'q'\n").unwrap();

    let output = cargo_bin()
        .args(["strip", "src", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    assert!(output.status.success(), "strip should succeed");
    let p = std::fs::read_to_string(src.join("p.js")).expect("p.js should be written");
    assert_eq!(p, "\n\n\nexport const p = { x: 1 }\n");
    assert_eq!(p.lines().count(), source.lines().count());
    let q = std::fs::read_to_string(src.join("q.mjs")).expect("q.mjs should be written");
    assert_eq!(q, "let q = 'q'\n");
}

#[test]
fn test_strip_out_dir_json() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("lib")).unwrap();
    std::fs::write(src.join("lib/a.cts"), "const a: number = 4").unwrap();

    let output = cargo_bin()
        .args(["--json", "strip", "src", "--out-dir", "dist", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");

    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["ok"], true);
    assert!(json["notes"].is_array(), "notes should be an array");
    assert_eq!(json["counts"]["stripped"], 1);
    assert_eq!(json["files"][0]["elided_spans"], 1);

    let written = std::fs::read_to_string(dir.path().join("dist/lib/a.cjs")).unwrap();
    assert_eq!(written, "const a = 4");
}

#[test]
fn test_strip_failure_reports_code_and_exits_nonzero() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.ts"), "let ok = 1\nenum E { A }\n").unwrap();

    let output = cargo_bin()
        .args(["--json", "strip", "bad.ts", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    assert!(!output.status.success(), "strip should fail");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], false);

    let error = &json["files"][0]["error"];
    let code = error["code"].as_str().unwrap();
    assert_eq!(code, "STRIP_UNEXPECTED_TYPE_SYNTAX");
    assert!(
        code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
        "error code should be SCREAMING_SNAKE_CASE: {code}"
    );
    assert_eq!(error["line"], 2);
    assert_eq!(error["column"], 1);
}

#[test]
fn test_check_writes_nothing() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.ts"), "let a: T = 1").unwrap();

    let output = cargo_bin()
        .args(["strip", "--check", "a.ts", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("a.js").exists());
}

#[test]
fn test_config_file_and_flag_override() {
    let dir = tempdir().unwrap();
    let source = "class A {\n  private x!: number\n}\n";
    std::fs::write(dir.path().join("a.ts"), source).unwrap();

    // Modifiers are off by default.
    let output = cargo_bin()
        .args(["strip", "a.ts", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");
    assert!(!output.status.success());

    std::fs::write(
        dir.path().join("typestrip.json"),
        r#"{"modifiers": "bare-keyword-v1"}"#,
    )
    .unwrap();
    let output = cargo_bin()
        .args(["strip", "a.ts", "--non-null", "postfix-bang-v1", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "class A {\n   x\n}\n"
    );
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.ts"), "let a = 1").unwrap();
    std::fs::write(dir.path().join("typestrip.json"), r#"{"enums": true}"#).unwrap();

    let output = cargo_bin()
        .args(["strip", "a.ts", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run strip command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config"), "stderr: {stderr}");
}
