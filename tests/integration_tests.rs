//! Integration tests for the maptool CLI
//!
//! These drive the compiled binary over piped stdin and only exercise
//! commands that never touch the network (help, quit, arity and format
//! validation).

use std::io::Write;
use std::process::{Command, Stdio};

/// Run the binary with scripted input and capture its stdout.
fn run_with_input(input: &str) -> String {
    let mut child = Command::new("cargo")
        .args(["run", "--quiet"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start maptool");

    child
        .stdin
        .as_mut()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("Failed to write to stdin");

    let output = child.wait_with_output().expect("Failed to wait for maptool");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_all_commands() {
    let stdout = run_with_input("help\nquit\n");

    for verb in [
        "geocode", "reverse", "search", "distance", "route", "config", "test", "quit",
    ] {
        assert!(stdout.contains(verb), "help is missing '{verb}': {stdout}");
    }
}

#[test]
fn test_quit_prints_farewell_and_exits() {
    let stdout = run_with_input("quit\n");
    assert!(stdout.contains("Goodbye"), "no farewell in: {stdout}");
}

#[test]
fn test_unknown_command_is_reported() {
    let stdout = run_with_input("frobnicate now\nquit\n");
    assert!(
        stdout.contains("Unrecognized command"),
        "no rejection in: {stdout}"
    );
}

#[test]
fn test_non_numeric_coordinates_are_rejected_before_any_lookup() {
    let stdout = run_with_input("reverse abc 116.4\nquit\n");
    assert!(
        stdout.contains("Invalid coordinate format"),
        "no format error in: {stdout}"
    );
}

#[test]
fn test_wrong_arity_echoes_expected_form() {
    let stdout = run_with_input("distance 39.9 116.4\nquit\n");
    assert!(stdout.contains("Wrong usage"), "no usage hint in: {stdout}");
    assert!(stdout.contains("distance <lat1> <lon1> <lat2> <lon2>"));
}

#[test]
fn test_eof_terminates_the_loop() {
    // No quit command; the loop must end on EOF instead of hanging.
    let stdout = run_with_input("help\n");
    assert!(stdout.contains("Available commands"));
}
