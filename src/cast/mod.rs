//! Transcript event stream reader.
//!
//! The external recorder writes asciicast files: a JSON header line carrying
//! the format version and terminal geometry, then one JSON array
//! `[time, code, data]` per line. This module decodes them into ordered
//! [`RawEvent`]s. Both v2 (absolute times) and v3 (interval times) are
//! accepted; interval times are accumulated so `RawEvent::time` is always
//! seconds from session start.
//!
//! The recorder may still be appending while we read, so the reader treats
//! the file as a snapshot: a final line without a trailing newline is a
//! record mid-write and is discarded. A file with no complete header line
//! yet is an empty stream, not an error. This module never writes.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ContextError, Result};

/// Stream id codes from the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Data written to the terminal.
    Output, // "o"
    /// Data read from the terminal (already echoed into the output stream).
    Input, // "i"
    /// Recorder annotation.
    Marker, // "m"
    /// Terminal resize, data is `"COLSxROWS"`.
    Resize, // "r"
    /// Session exit status.
    Exit, // "x"
    /// Unknown single-character code, kept for forward compatibility.
    Other(char),
}

impl EventKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(EventKind::Output),
            "i" => Some(EventKind::Input),
            "m" => Some(EventKind::Marker),
            "r" => Some(EventKind::Resize),
            "x" => Some(EventKind::Exit),
            other => {
                let mut chars = other.chars();
                let first = chars.next()?;
                chars.next().is_none().then_some(EventKind::Other(first))
            }
        }
    }
}

/// Envelope header. Unknown fields are ignored; geometry lives in
/// `width`/`height` for v2 and under `term` for v3.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub version: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub term: Option<TermInfo>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermInfo {
    pub cols: Option<u32>,
    pub rows: Option<u32>,
}

impl Header {
    /// Terminal height, wherever the envelope version put it.
    pub fn rows(&self) -> Option<usize> {
        self.term
            .as_ref()
            .and_then(|t| t.rows)
            .or(self.height)
            .map(|r| r as usize)
    }

    /// Terminal width, wherever the envelope version put it.
    pub fn cols(&self) -> Option<usize> {
        self.term
            .as_ref()
            .and_then(|t| t.cols)
            .or(self.width)
            .map(|c| c as usize)
    }
}

/// One decoded transcript record.
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Seconds from session start.
    pub time: f64,
    pub kind: EventKind,
    pub data: String,
}

impl RawEvent {
    /// Parse one `[time, code, data]` line.
    pub fn from_json(line: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| format_err(format!("event is not valid JSON: {e}")))?;

        let arr = value
            .as_array()
            .ok_or_else(|| format_err("event must be a JSON array"))?;
        if arr.len() < 3 {
            return Err(format_err("event array must have at least 3 elements"));
        }

        let time = arr[0]
            .as_f64()
            .ok_or_else(|| format_err("event time must be a number"))?;
        let code = arr[1]
            .as_str()
            .ok_or_else(|| format_err("event code must be a string"))?;
        let kind = EventKind::from_code(code)
            .ok_or_else(|| format_err(format!("unrecognized event code: {code:?}")))?;
        let data = arr[2]
            .as_str()
            .ok_or_else(|| format_err("event data must be a string"))?
            .to_string();

        Ok(RawEvent { time, kind, data })
    }

    /// Parse a resize payload (`"COLSxROWS"`).
    pub fn parse_resize(&self) -> Option<(usize, usize)> {
        let (cols, rows) = self.data.split_once('x')?;
        Some((cols.trim().parse().ok()?, rows.trim().parse().ok()?))
    }
}

/// A decoded transcript: header plus ordered events.
#[derive(Debug, Clone)]
pub struct EventStream {
    /// `None` while the recorder has not yet flushed a complete header line.
    pub header: Option<Header>,
    pub events: Vec<RawEvent>,
}

impl EventStream {
    /// Read and decode a transcript file.
    ///
    /// The recorder's flush can tear anywhere, even inside a multi-byte
    /// character; the damaged suffix belongs to the unterminated tail line
    /// and is discarded with it.
    pub fn parse(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let stream = Self::parse_str(&content)?;
        debug!(
            path = %path.display(),
            events = stream.events.len(),
            "decoded transcript"
        );
        Ok(stream)
    }

    /// Decode a transcript snapshot.
    pub fn parse_str(content: &str) -> Result<Self> {
        let mut lines: Vec<&str> = content.split('\n').collect();

        // split() always yields at least one element; the last one is either
        // the empty remainder after a final newline or a record mid-write.
        if let Some(tail) = lines.pop() {
            if !tail.is_empty() {
                debug!(bytes = tail.len(), "discarding unterminated trailing record");
            }
        }

        let mut complete = lines.into_iter().enumerate();
        let header = match complete.next() {
            Some((_, line)) => parse_header(line)?,
            None => {
                return Ok(EventStream {
                    header: None,
                    events: Vec::new(),
                })
            }
        };

        let mut events = Vec::new();
        for (idx, line) in complete {
            if line.trim().is_empty() {
                continue;
            }
            let event = RawEvent::from_json(line).map_err(|e| match e {
                ContextError::Format { reason } => ContextError::Format {
                    reason: format!("line {}: {reason}", idx + 1),
                },
                other => other,
            })?;
            events.push(event);
        }

        // v3 times are intervals since the previous event; normalize to
        // absolute so ordering does not depend on the envelope version.
        if header.version == 3 {
            let mut clock = 0.0;
            for event in &mut events {
                clock += event.time;
                event.time = clock;
            }
        }

        Ok(EventStream {
            header: Some(header),
            events,
        })
    }

    /// Terminal height for the normalizer's viewport, defaulting to 24.
    pub fn rows(&self) -> usize {
        self.header.as_ref().and_then(Header::rows).unwrap_or(24)
    }
}

fn parse_header(line: &str) -> Result<Header> {
    let header: Header = serde_json::from_str(line)
        .map_err(|e| format_err(format!("invalid header line: {e}")))?;
    if header.version != 2 && header.version != 3 {
        return Err(format_err(format!(
            "transcript version {} not supported (expected 2 or 3)",
            header.version
        )));
    }
    Ok(header)
}

fn format_err(reason: impl Into<String>) -> ContextError {
    ContextError::Format {
        reason: reason.into(),
    }
}
