//! Reconstructs what happened in a recorded terminal session.
//!
//! `termctx` reads asciicast-style recordings while they are still being
//! written, replays the output through a terminal emulator into a plain
//! text buffer, finds the prompt boundaries, and cuts the buffer into
//! command/output records that can be queried: "show me the last command
//! and what it printed".
//!
//! Every query is stateless and re-reads the file from scratch, so a
//! recorder appending concurrently is harmless; at worst the final record
//! is shorter than it will be a moment later.
//!
//! ```no_run
//! use termctx::{load_transcript, Config};
//!
//! let config = Config::load()?;
//! let path = termctx::session::resolve(&config)?;
//! let transcript = load_transcript(&path, &config)?;
//! for record in transcript.last(1)? {
//!     println!("{} -> {:?}", record.command, record.exit_code);
//! }
//! # Ok::<(), termctx::ContextError>(())
//! ```

use std::path::Path;

use tracing::debug;

pub mod cast;
pub mod commands;
pub mod config;
pub mod detect;
pub mod error;
pub mod session;
pub mod terminal;
pub mod transcript;

pub use config::Config;
pub use detect::DetectionMethod;
pub use error::{ContextError, Result};
pub use transcript::{CommandRecord, Transcript};

/// Reads, normalizes, and segments one transcript file.
pub fn load_transcript(path: &Path, config: &Config) -> Result<Transcript> {
    let stream = cast::EventStream::parse(path)?;
    let buffer = terminal::normalize(&stream);
    let extra = detect::patterns::compile_extra(&config.detect.extra_patterns);
    let detection = detect::detect(&buffer, &extra);
    let transcript = transcript::segment(&buffer, &detection);
    debug!(
        method = %transcript.method,
        records = transcript.len(),
        "session reconstructed"
    );
    Ok(transcript)
}
