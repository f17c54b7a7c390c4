//! Output rendering for context queries.
//!
//! Two surfaces: a plain-text form meant to be pasted into a conversation,
//! and a JSON form for tool calls. Plain text re-prefixes commands with a
//! uniform `$ ` regardless of the prompt theme the session was recorded
//! under; JSON keeps every field the transcript recovered.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{CommandRecord, Transcript};
use crate::detect::DetectionMethod;

/// Renders records as readable plain text.
///
/// Commands are prefixed `$ ` (continuation lines `> `), output is indented
/// two spaces, records are separated by a blank line. Non-zero exit codes
/// are annotated on the command line; successful ones stay quiet. Records
/// with an empty command, such as raw dumps and preambles, render as output
/// only: the annotation rides the command line, so an exit code on such a
/// record is visible in the JSON surface but not here.
pub fn plain(records: &[CommandRecord]) -> String {
    let mut blocks = Vec::with_capacity(records.len());
    for record in records {
        let mut lines = Vec::new();
        let command_lines: Vec<&str> = record.command.lines().collect();
        for (i, line) in command_lines.iter().enumerate() {
            let prefix = if i == 0 { "$ " } else { "> " };
            let mut rendered = format!("{prefix}{line}");
            if i + 1 == command_lines.len() {
                if let Some(code) = record.exit_code {
                    if code != 0 {
                        rendered.push_str(&format!(" [exit {code}]"));
                    }
                }
            }
            lines.push(rendered);
        }
        for line in record.output.lines() {
            if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("  {line}"));
            }
        }
        if !lines.is_empty() {
            blocks.push(lines.join("\n"));
        }
    }

    if blocks.is_empty() {
        return String::new();
    }
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Machine-readable query response.
#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub session: String,
    pub detection: DetectionMethod,
    /// Normalized buffer length; pass back as `--since` for incremental
    /// reads.
    pub buffer_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub commands: Vec<CommandEntry>,
}

/// One record in the JSON response.
#[derive(Debug, Serialize)]
pub struct CommandEntry {
    pub command: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Byte offset of the record's span in the normalized buffer.
    pub offset: usize,
}

impl ContextResponse {
    pub fn new(
        session: impl Into<String>,
        transcript: &Transcript,
        records: &[CommandRecord],
    ) -> Self {
        // An empty session has nothing to be degraded about.
        let warning = if transcript.is_empty() {
            None
        } else {
            transcript.method.degradation_warning().map(str::to_string)
        };
        ContextResponse {
            session: session.into(),
            detection: transcript.method,
            buffer_len: transcript.buffer_len,
            warning,
            commands: records.iter().map(CommandEntry::from_record).collect(),
        }
    }
}

impl CommandEntry {
    fn from_record(record: &CommandRecord) -> Self {
        CommandEntry {
            command: record.command.clone(),
            output: record.output.clone(),
            exit_code: record.exit_code,
            timestamp: record.timestamp,
            duration_seconds: record.duration,
            offset: record.span.start,
        }
    }
}
