//! Tests that run the compiled `row-dump` binary.

use std::process::Command;

fn row_dump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_row-dump"))
}

#[test]
fn test_failure_prints_diagnostic_with_logging_off() {
    let output = row_dump()
        .arg("mysql://localhost/mydb")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Configuration Error: Configuration error: Invalid scheme 'mysql'"),
        "Expected diagnostic on stderr, got: {stderr}"
    );
}

#[test]
fn test_unreachable_server_exits_nonzero_without_output() {
    let output = row_dump()
        .args(["--host", "127.0.0.1", "--port", "1", "--delay", "0"])
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Connection Error"));
}
