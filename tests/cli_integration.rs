use std::io::Write;
use std::process::{Command, Stdio};

fn run_rpncalc(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_rpncalc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run rpncalc");
    (
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_cli_basic_arithmetic() {
    let (stdout, _stderr, code) = run_rpncalc(&["2 + 3 * 4"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "14");
}

#[test]
fn test_cli_float_and_negative_expression() {
    let (stdout, _stderr, code) = run_rpncalc(&["-3/2"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "-1.5");
}

#[test]
fn test_cli_with_modules() {
    let (stdout, _stderr, code) = run_rpncalc(&["sqrt(-1)", "-m", "cmath"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "1j");
}

#[test]
fn test_cli_division_by_zero() {
    let (stdout, stderr, code) = run_rpncalc(&["1/0"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("ERROR: Division by zero"));
}

#[test]
fn test_cli_unknown_module() {
    let (_stdout, stderr, code) = run_rpncalc(&["1", "-m", "nosuchmodule"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Module not found: nosuchmodule"));
}

#[test]
fn test_cli_verbose_prints_stages() {
    let (stdout, stderr, code) = run_rpncalc(&["2(3+4)", "-v"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "14");
    assert!(stderr.contains("EXPR:"));
    assert!(stderr.contains("2*(3+4)"));
    assert!(stderr.contains("TOKENS:"));
    assert!(stderr.contains("RPN:"));
    assert!(stderr.contains("+:PLUS  *:TIMES"));
}

#[test]
fn test_cli_json_output() {
    let (stdout, _stderr, code) = run_rpncalc(&["max(1, 2.5)", "--output-json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["result"], serde_json::json!(2.5));
    assert_eq!(parsed["type"], "float");
    assert!(parsed["execution_time"].as_str().unwrap().ends_with("ms"));
}

#[test]
fn test_cli_interactive_mode() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rpncalc"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start rpncalc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"1+1\n1/0\n2^10\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stdout.contains(">>2\n"));
    assert!(stdout.contains("1024"));
    assert!(stderr.contains("ERROR: Division by zero"));
}
