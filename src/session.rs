//! Locating the transcript of the current session.
//!
//! Resolution order: the exact file named by `TERMCTX_SESSION_FILE`, then
//! the most recently modified `.cast` file in the session directory
//! (`TERMCTX_SESSION_DIR`, the configured directory, or the platform
//! default), then [`ContextError::SessionNotFound`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::config::Config;
use crate::error::{ContextError, Result};

/// Names the exact transcript file of the current session. Recorders export
/// this into the shells they spawn.
pub const SESSION_FILE_ENV: &str = "TERMCTX_SESSION_FILE";

/// Overrides the directory scanned for recordings.
pub const SESSION_DIR_ENV: &str = "TERMCTX_SESSION_DIR";

/// Resolves the transcript to answer queries from.
pub fn resolve(config: &Config) -> Result<PathBuf> {
    resolve_with(
        env::var(SESSION_FILE_ENV).ok().as_deref(),
        env::var(SESSION_DIR_ENV).ok().as_deref(),
        config,
    )
}

fn resolve_with(
    file_var: Option<&str>,
    dir_var: Option<&str>,
    config: &Config,
) -> Result<PathBuf> {
    if let Some(raw) = file_var.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(raw);
        if path.is_file() {
            debug!(path = %path.display(), "session file from environment");
            return Ok(path);
        }
        // The variable is authoritative when set: a stale value is an
        // error, not a cue to scan elsewhere and answer from the wrong
        // session.
        return Err(ContextError::SessionNotFound {
            hint: format!(
                "{SESSION_FILE_ENV} points to missing file {}",
                path.display()
            ),
        });
    }

    let dir = match dir_var.filter(|d| !d.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => config.session_dir(),
    };
    if let Some(dir) = dir {
        if let Some(newest) = newest_cast(&dir) {
            debug!(path = %newest.display(), "session file from directory scan");
            return Ok(newest);
        }
    }
    Err(ContextError::SessionNotFound {
        hint: format!("no recordings found (set {SESSION_FILE_ENV} or record a session first)"),
    })
}

/// Most recently modified `.cast` file in `dir`. A directory that does not
/// exist or cannot be read scans as empty. Equal timestamps tie-break on
/// the filename, which sorts recorder-named files by start time.
fn newest_cast(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("cast") {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };
        let replace = match &newest {
            Some((best, best_path)) => {
                modified > *best || (modified == *best && path > *best_path)
            }
            None => true,
        };
        if replace {
            newest = Some((modified, path));
        }
    }
    newest.map(|(_, path)| path)
}
