//! Command handlers for the `context` binary.

pub mod hook;
pub mod query;

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::session;

/// Print a shell `export` statement binding the resolved transcript file.
///
/// Meant for `eval "$(context -e)"`: it pins every later query in that
/// shell to one session, even after newer recordings appear in the
/// session directory.
#[cfg(not(tarpaulin_include))]
pub fn handle_export(file: Option<&Path>) -> Result<()> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => session::resolve(&Config::load()?)?,
    };
    println!(
        "export {}={}",
        session::SESSION_FILE_ENV,
        shell_quote(&path.display().to_string())
    );
    Ok(())
}

/// Single-quotes a value for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
