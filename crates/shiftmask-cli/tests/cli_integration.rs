//! Integration tests for the shiftmask binary.

use std::process::{Command, Output};

fn shiftmask(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shiftmask"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run shiftmask")
}

#[test]
fn test_eight_bit_domains_verify() {
    let output = shiftmask(&["--domain", "u8", "--domain", "i8"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("Starting u8..."));
    assert!(stderr.contains("...Finished u8."));
    assert!(stderr.contains("...Finished i8."));
    assert!(!stderr.contains("u16"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_thread_limit_and_progress() {
    let output = shiftmask(&["-d", "sbyte", "-j", "2", "--progress", "-v"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("...Finished i8."));
}

#[test]
fn test_quiet_suppresses_progress_lines() {
    let output = shiftmask(&["--domain", "u8", "--quiet"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Starting"));
}

#[test]
fn test_wide_domain_fails_loudly() {
    let output = shiftmask(&["--domain", "u32"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be verified exhaustively"), "stderr: {stderr}");
}

#[test]
fn test_unsupported_width_is_rejected() {
    let output = shiftmask(&["--domain", "u24"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported domain width"), "stderr: {stderr}");
}

#[test]
fn test_unknown_domain_is_rejected() {
    let output = shiftmask(&["--domain", "float"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown domain"), "stderr: {stderr}");
}

#[test]
#[ignore = "exhaustive 16-bit run; cargo test --release -- --ignored"]
fn test_default_run_covers_every_exhaustive_domain() {
    let output = shiftmask(&[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    for name in ["i8", "i16", "u8", "u16"] {
        assert!(stderr.contains(&format!("...Finished {name}.")), "stderr: {stderr}");
    }
}
