//! CLI surface tests: flags, help, hooks, and error paths.

use std::fs;

use tempfile::TempDir;

use crate::helpers::{run_context, run_context_stdin};
use termctx::detect::markers::{INPUT_START, PROMPT_START};

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn help_shows_the_query_surface() {
    let (stdout, _stderr, exit_code) = run_context(&["--help"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("[COUNT]"));
    assert!(stdout.contains("--json"));
    assert!(stdout.contains("--since"));
    assert!(stdout.contains("--hook"));
    assert!(stdout.contains("TERMCTX_SESSION_FILE"));
}

#[test]
fn hidden_plumbing_flags_stay_out_of_help() {
    let (stdout, _stderr, exit_code) = run_context(&["--help"], &[]);

    assert_eq!(exit_code, 0);
    assert!(!stdout.contains("--wrap-prompt"));
    assert!(!stdout.contains("--wrap-continuation"));
}

#[test]
fn version_includes_the_package_version() {
    let (stdout, _stderr, exit_code) = run_context(&["--version"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.starts_with("context "));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_generate_for_zsh() {
    let (stdout, _stderr, exit_code) = run_context(&["--completions", "zsh"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("context"));
    assert!(stdout.contains("--json"));
}

// ============================================================================
// Shell Hooks
// ============================================================================

#[test]
fn zsh_hook_snippet_is_complete() {
    let (stdout, _stderr, exit_code) = run_context(&["--hook", "zsh"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("TERMCTX_HOOKED"));
    assert!(stdout.contains("add-zsh-hook precmd"));
    assert!(stdout.contains("--wrap-prompt"));
    assert!(stdout.contains("--wrap-continuation"));
}

#[test]
fn bash_hook_snippet_is_complete() {
    let (stdout, _stderr, exit_code) = run_context(&["--hook", "bash"], &[]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("TERMCTX_HOOKED"));
    assert!(stdout.contains("PROMPT_COMMAND"));
    assert!(stdout.contains("--wrap-prompt"));
}

#[test]
fn wrap_prompt_brackets_the_prompt_with_markers() {
    let (stdout, _stderr, exit_code) =
        run_context_stdin(&["--wrap-prompt", "0"], "$ ");

    assert_eq!(exit_code, 0);
    assert!(stdout.starts_with(PROMPT_START));
    assert!(stdout.ends_with(INPUT_START));
    assert!(stdout.contains("$ "));
}

#[test]
fn wrap_prompt_is_idempotent() {
    let (wrapped, _stderr, _) = run_context_stdin(&["--wrap-prompt", "0"], "$ ");
    let (rewrapped, _stderr, exit_code) =
        run_context_stdin(&["--wrap-prompt", "7"], &wrapped);

    assert_eq!(exit_code, 0);
    assert_eq!(rewrapped, wrapped, "re-wrapping must not stack markers");
}

#[test]
fn wrap_continuation_appends_the_input_marker() {
    let (stdout, _stderr, exit_code) =
        run_context_stdin(&["--wrap-continuation"], "> ");

    assert_eq!(exit_code, 0);
    assert_eq!(stdout, format!("> {INPUT_START}"));
}

#[test]
fn duration_requires_wrap_prompt() {
    let (_stdout, _stderr, exit_code) = run_context(&["--duration", "3"], &[]);

    assert_eq!(exit_code, 2);
}

// ============================================================================
// Error Paths
// ============================================================================

#[test]
fn unknown_flag_is_a_usage_error() {
    let (_stdout, stderr, exit_code) = run_context(&["--frobnicate"], &[]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("--frobnicate"));
}

#[test]
fn missing_file_reports_the_path() {
    let (_stdout, stderr, exit_code) =
        run_context(&["--file", "/nonexistent/session.cast"], &[]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("/nonexistent/session.cast"));
}

#[test]
fn garbage_header_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.cast");
    fs::write(&path, "this is not a recording\n[0.1, \"o\", \"hi\"]\n").unwrap();

    let (_stdout, stderr, exit_code) =
        run_context(&["--file", path.to_str().unwrap()], &[]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Unrecognized transcript format"));
}

#[test]
fn unsupported_version_names_the_expected_ones() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.cast");
    fs::write(
        &path,
        "{\"version\": 9, \"width\": 80, \"height\": 24}\n[0.1, \"o\", \"hi\"]\n",
    )
    .unwrap();

    let (_stdout, stderr, exit_code) =
        run_context(&["--file", path.to_str().unwrap()], &[]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("version 9 not supported"));
    assert!(stderr.contains("expected 2 or 3"));
}

#[test]
fn broken_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[detect\nextra_patterns = 3").unwrap();
    let cast = crate::helpers::three_command_cast(dir.path(), "s.cast");

    let (_stdout, stderr, exit_code) = run_context(
        &["--file", cast.to_str().unwrap()],
        &[("TERMCTX_CONFIG", config_path.to_str().unwrap())],
    );

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Invalid configuration"));
}
