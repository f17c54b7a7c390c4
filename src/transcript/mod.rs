//! Command/output segmentation and transcript queries.
//!
//! Segmentation slices the normalized buffer at detected prompt boundaries
//! and splits each slice into the typed command and the output that
//! followed. Records keep their raw byte span, so the spans of a non-empty
//! transcript tile the buffer exactly and nothing is silently dropped.

pub mod format;

use std::ops::Range;

use chrono::NaiveDateTime;

use crate::detect::{markers, Detection, DetectionMethod, PromptBoundary};
use crate::error::{ContextError, Result};

/// One prompt-to-prompt interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    /// Text the user typed, without prompt decoration. Empty for raw dumps
    /// and for output that preceded the first detected prompt.
    pub command: String,
    /// Everything printed between the command and the next prompt.
    pub output: String,
    pub exit_code: Option<i32>,
    pub timestamp: Option<NaiveDateTime>,
    /// Wall-clock runtime in seconds, when the shell hook reported one.
    pub duration: Option<u64>,
    /// Raw byte span in the normalized buffer this record accounts for.
    pub span: Range<usize>,
}

/// A fully segmented session.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub records: Vec<CommandRecord>,
    pub method: DetectionMethod,
    /// Length of the normalized buffer the records were cut from. Callers
    /// doing incremental reads pass this back as a `since` offset.
    pub buffer_len: usize,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record, oldest first.
    pub fn all(&self) -> &[CommandRecord] {
        &self.records
    }

    /// The `n` most recent records, oldest first. Asking for more than the
    /// session holds returns everything; asking for zero is an error.
    pub fn last(&self, n: usize) -> Result<&[CommandRecord]> {
        if n == 0 {
            return Err(ContextError::InvalidArgument(
                "count must be at least 1".into(),
            ));
        }
        let skip = self.records.len().saturating_sub(n);
        Ok(&self.records[skip..])
    }

    /// Records whose span starts at or after `offset`.
    pub fn since(&self, offset: usize) -> &[CommandRecord] {
        let idx = self.records.partition_point(|r| r.span.start < offset);
        &self.records[idx..]
    }
}

/// Cuts `buffer` into records at the detected boundaries.
///
/// Metadata shifts backwards by one: the tag rendered into prompt `i + 1`
/// describes the command that ran between prompts `i` and `i + 1`, so the
/// final record of a still-running session has no exit code yet. Output
/// that precedes the first prompt becomes a leading record with an empty
/// command, and a trailing prompt with nothing typed after it is absorbed
/// into the previous record's span instead of producing an empty entry.
pub fn segment(buffer: &str, detection: &Detection) -> Transcript {
    let bounds = &detection.boundaries;
    let mut records = Vec::with_capacity(bounds.len() + 1);

    if let Some(first) = bounds.first() {
        if first.offset > 0 {
            // The first prompt's tag describes whatever ran before it.
            records.push(CommandRecord {
                command: String::new(),
                output: markers::strip(&buffer[..first.offset]),
                exit_code: first.tag.exit_code,
                timestamp: first.tag.timestamp,
                duration: first.tag.duration,
                span: 0..first.offset,
            });
        }
    }

    for (i, boundary) in bounds.iter().enumerate() {
        let end = bounds.get(i + 1).map(|b| b.offset).unwrap_or(buffer.len());
        let (command, output) = split_segment(buffer, boundary, end);

        let is_last = i + 1 == bounds.len();
        if is_last && command.is_empty() && output.trim().is_empty() {
            if let Some(prev) = records.last_mut() {
                prev.span.end = end;
            }
            continue;
        }

        let tag = bounds
            .get(i + 1)
            .map(|b| b.tag.clone())
            .unwrap_or_default();
        records.push(CommandRecord {
            command,
            output,
            exit_code: tag.exit_code,
            timestamp: tag.timestamp,
            duration: tag.duration,
            span: boundary.offset..end,
        });
    }

    Transcript {
        records,
        method: detection.method,
        buffer_len: buffer.len(),
    }
}

/// Splits one boundary's segment into (command, output).
///
/// The command runs from the boundary's input offset to the end of its
/// line. In marker mode a following line that re-enters input without a
/// fresh prompt-start is a continuation (secondary prompt) line and joins
/// the command; pattern-mode detection has no such signal, so wrapped
/// commands there end up partly in the output.
fn split_segment(buffer: &str, boundary: &PromptBoundary, end: usize) -> (String, String) {
    if boundary.method == DetectionMethod::None {
        return (String::new(), markers::strip(&buffer[boundary.offset..end]));
    }

    let region = &buffer[boundary.input_offset.min(end)..end];
    let marker_mode = boundary.method == DetectionMethod::Marker;

    let mut command = String::new();
    let mut pos = 0;
    loop {
        let line_end = match region[pos..].find('\n') {
            Some(rel) => pos + rel,
            None => {
                // Still being typed when the recording stopped.
                command.push_str(&region[pos..]);
                pos = region.len();
                break;
            }
        };
        command.push_str(&region[pos..line_end]);
        pos = line_end + 1;
        if !marker_mode {
            break;
        }
        let next_end = region[pos..]
            .find('\n')
            .map(|r| pos + r)
            .unwrap_or(region.len());
        let next_line = &region[pos..next_end];
        match next_line.find(markers::INPUT_START) {
            Some(ip) if !next_line[..ip].contains(markers::PROMPT_START) => {
                command.push('\n');
                pos = pos + ip + markers::INPUT_START.len();
            }
            _ => break,
        }
    }

    let output = markers::strip(&region[pos..]);
    let command = markers::strip(&command);
    // Pattern tokens eat a single space; drop any extra indentation too.
    let command = if marker_mode {
        command
    } else {
        command.trim_start().to_string()
    };
    (command, output)
}
