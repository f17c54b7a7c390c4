//! The default command: print recent commands and their output.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::error::ContextError;
use crate::session;
use crate::transcript::format::{self, ContextResponse};
use crate::transcript::CommandRecord;

/// Query parameters collected from the command line.
#[derive(Debug, Default)]
pub struct QueryArgs {
    /// `None` means the most recent command; `"all"` the whole session.
    pub count: Option<String>,
    pub json: bool,
    pub since: Option<usize>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Count {
    Last(usize),
    All,
}

fn parse_count(raw: Option<&str>) -> Result<Count, ContextError> {
    let Some(raw) = raw else {
        return Ok(Count::Last(1));
    };
    if raw.eq_ignore_ascii_case("all") {
        return Ok(Count::All);
    }
    match raw.parse::<usize>() {
        Ok(0) => Err(ContextError::InvalidArgument(
            "count must be at least 1".into(),
        )),
        Ok(n) => Ok(Count::Last(n)),
        Err(_) => Err(ContextError::InvalidArgument(format!(
            "count must be a number or \"all\", got {raw:?}"
        ))),
    }
}

#[cfg(not(tarpaulin_include))]
pub fn handle_query(args: &QueryArgs) -> Result<()> {
    let count = parse_count(args.count.as_deref())?;
    let config = Config::load()?;
    let path = match &args.file {
        Some(path) => path.clone(),
        None => session::resolve(&config)?,
    };
    let transcript = crate::load_transcript(&path, &config)
        .with_context(|| format!("while reading {}", path.display()))?;

    let base = match args.since {
        Some(offset) => transcript.since(offset),
        None => transcript.all(),
    };
    let selection: &[CommandRecord] = match count {
        Count::All => base,
        Count::Last(n) => &base[base.len().saturating_sub(n)..],
    };

    if args.json {
        let response =
            ContextResponse::new(path.display().to_string(), &transcript, selection);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if !transcript.is_empty() {
        if let Some(warning) = transcript.method.degradation_warning() {
            eprintln!("warning: {warning}");
        }
    }
    if selection.is_empty() {
        eprintln!("session has no completed commands yet");
        return Ok(());
    }
    print!("{}", format::plain(selection));
    Ok(())
}
