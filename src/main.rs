//! Entry point for the `context` binary.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use termctx::commands::{self, hook::HookShell, query::QueryArgs};

/// Version string with git hash and build date (dev builds).
#[cfg(not(feature = "release"))]
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("TERMCTX_BUILD_DATE"),
    ")"
);

/// Version string with build date only (official release builds).
#[cfg(feature = "release")]
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TERMCTX_BUILD_DATE"),
    ")"
);

/// Answer "what just happened in this terminal?" from a recorded session.
#[derive(Debug, Parser)]
#[command(
    name = "context",
    version,
    long_version = LONG_VERSION,
    about = "Reconstructs recent commands and their output from a recorded terminal session",
    long_about = "Reconstructs recent commands and their output from a recorded terminal \
                  session.\n\nWith no arguments, prints the most recent command of the \
                  active session. Pass a count for more history, \"all\" for the whole \
                  session, or --json for a machine-readable answer. The active session is \
                  the file named by TERMCTX_SESSION_FILE, falling back to the newest .cast \
                  recording in the session directory."
)]
struct Cli {
    /// How many recent commands to show, or "all" for the whole session
    #[arg(value_name = "COUNT")]
    count: Option<String>,

    /// Print an export statement pinning the current transcript file
    #[arg(short = 'e', long)]
    export: bool,

    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Only include records starting at or after this buffer offset
    #[arg(long, value_name = "OFFSET")]
    since: Option<usize>,

    /// Read this transcript instead of resolving the active session
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Print the shell integration snippet for SHELL (zsh or bash)
    #[arg(long, value_name = "SHELL")]
    hook: Option<HookShell>,

    /// Wrap a prompt read from stdin with markers recording this exit code
    #[arg(long, value_name = "EXIT_CODE", hide = true)]
    wrap_prompt: Option<i32>,

    /// Seconds the previous command ran, recorded with --wrap-prompt
    #[arg(long, value_name = "SECONDS", hide = true, requires = "wrap_prompt")]
    duration: Option<u64>,

    /// Wrap a continuation prompt read from stdin
    #[arg(long, hide = true)]
    wrap_continuation: bool,

    /// Generate shell completions for SHELL
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[cfg(not(tarpaulin_include))]
fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("context: {err:#}");
        process::exit(1);
    }
}

#[cfg(not(tarpaulin_include))]
fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }
    if let Some(shell) = cli.hook {
        commands::hook::handle_hook(shell);
        return Ok(());
    }
    if cli.wrap_continuation {
        return commands::hook::handle_wrap_continuation();
    }
    if let Some(exit_code) = cli.wrap_prompt {
        return commands::hook::handle_wrap_prompt(exit_code, cli.duration);
    }
    if cli.export {
        return commands::handle_export(cli.file.as_deref());
    }
    commands::query::handle_query(&QueryArgs {
        count: cli.count,
        json: cli.json,
        since: cli.since,
        file: cli.file,
    })
}
