//! Integration tests for session resolution through the CLI.

use std::fs;
use std::time::{Duration, UNIX_EPOCH};

use tempfile::TempDir;

use crate::helpers::{marked_prompt, run_context, three_command_cast, CastBuilder};

fn age(path: &std::path::Path, mtime_secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

#[test]
fn env_variable_names_the_session() {
    let dir = TempDir::new().unwrap();
    let cast = three_command_cast(dir.path(), "mine.cast");

    let (stdout, _stderr, exit_code) = run_context(
        &[],
        &[("TERMCTX_SESSION_FILE", cast.to_str().unwrap())],
    );

    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "$ echo three\n  three\n");
}

#[test]
fn stale_env_variable_is_an_error_not_a_fallback() {
    let dir = TempDir::new().unwrap();
    // A perfectly good recording exists, but the pinned file is gone.
    three_command_cast(dir.path(), "other.cast");
    let gone = dir.path().join("gone.cast");

    let (_stdout, stderr, exit_code) = run_context(
        &[],
        &[
            ("TERMCTX_SESSION_FILE", gone.to_str().unwrap()),
            ("TERMCTX_SESSION_DIR", dir.path().to_str().unwrap()),
        ],
    );

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("No session transcript found"));
    assert!(stderr.contains("TERMCTX_SESSION_FILE"));
    assert!(stderr.contains("gone.cast"));
}

#[test]
fn directory_scan_picks_the_newest_recording() {
    let dir = TempDir::new().unwrap();
    let old = CastBuilder::new()
        .output(&format!("{}echo old\r\n", marked_prompt(None)))
        .output("old\r\n")
        .output(&marked_prompt(Some(0)))
        .write(dir.path(), "old.cast");
    let fresh = CastBuilder::new()
        .output(&format!("{}echo fresh\r\n", marked_prompt(None)))
        .output("fresh\r\n")
        .output(&marked_prompt(Some(0)))
        .write(dir.path(), "fresh.cast");
    age(&old, 1_000_000);
    age(&fresh, 2_000_000);

    let (stdout, _stderr, exit_code) = run_context(
        &[],
        &[("TERMCTX_SESSION_DIR", dir.path().to_str().unwrap())],
    );

    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "$ echo fresh\n  fresh\n");
}

#[test]
fn nothing_to_resolve_exits_with_a_hint() {
    let dir = TempDir::new().unwrap();

    let (_stdout, stderr, exit_code) = run_context(
        &[],
        &[("TERMCTX_SESSION_DIR", dir.path().to_str().unwrap())],
    );

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("No session transcript found"));
    assert!(stderr.contains("TERMCTX_SESSION_FILE"));
}

#[test]
fn export_prints_a_pinned_assignment() {
    let dir = TempDir::new().unwrap();
    let cast = three_command_cast(dir.path(), "mine.cast");

    let (stdout, _stderr, exit_code) = run_context(
        &["-e"],
        &[("TERMCTX_SESSION_FILE", cast.to_str().unwrap())],
    );

    assert_eq!(exit_code, 0);
    assert_eq!(
        stdout,
        format!("export TERMCTX_SESSION_FILE='{}'\n", cast.display())
    );
}

#[test]
fn export_respects_file_override() {
    let dir = TempDir::new().unwrap();
    let cast = three_command_cast(dir.path(), "elsewhere.cast");

    let (stdout, _stderr, exit_code) =
        run_context(&["-e", "--file", cast.to_str().unwrap()], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("elsewhere.cast"));
}
