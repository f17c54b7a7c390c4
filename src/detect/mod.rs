//! Prompt boundary detection over a normalized session buffer.
//!
//! Detection is two-tier. Marker scanning reads the invisible sequences the
//! shell hook injects and is authoritative: whenever the buffer contains at
//! least one complete marker pair, pattern matching is skipped entirely, so
//! a theme that happens to look like another shell's prompt can never split
//! a marker-recorded session differently. The pattern bank is the fallback
//! for sessions recorded without the hook, and a buffer that defeats both
//! tiers degrades to a single whole-buffer record rather than an error.

pub mod markers;
pub mod patterns;

use serde::Serialize;
use tracing::{debug, warn};

use self::markers::{PromptTag, INPUT_START, PROMPT_START};
use self::patterns::PromptPattern;

/// How the boundaries of a transcript were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Injected marker sequences; exact offsets and full metadata.
    Marker,
    /// Prompt pattern bank; offsets only, metadata mostly absent.
    Regex,
    /// Nothing recognized; the whole buffer is one record.
    None,
}

impl DetectionMethod {
    /// Warning text for degraded results, surfaced alongside query output.
    /// Degradation is an annotation, never an error.
    pub fn degradation_warning(self) -> Option<&'static str> {
        match self {
            DetectionMethod::Marker => None,
            DetectionMethod::Regex => Some(
                "prompt markers not found; boundaries were inferred from prompt \
                 patterns, so exit codes and timestamps are mostly unavailable",
            ),
            DetectionMethod::None => Some(
                "no prompt boundaries detected; treating the whole session as \
                 one raw record",
            ),
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DetectionMethod::Marker => "marker",
            DetectionMethod::Regex => "regex",
            DetectionMethod::None => "none",
        };
        f.write_str(name)
    }
}

/// One detected prompt render inside the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBoundary {
    /// Byte offset where the prompt begins.
    pub offset: usize,
    /// Byte offset where typed input begins, i.e. just past the input-start
    /// marker or the matched prompt token.
    pub input_offset: usize,
    /// Metadata describing the command that ran *before* this prompt.
    pub tag: PromptTag,
    pub method: DetectionMethod,
}

/// Result of one detection pass. Boundary offsets are strictly increasing,
/// and every boundary shares `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub boundaries: Vec<PromptBoundary>,
    pub method: DetectionMethod,
}

/// Finds every prompt boundary in `buffer`.
///
/// Detection is pure: the same buffer and pattern set always produce the
/// same boundaries, so re-running a query while the session file grows only
/// ever appends to the result.
pub fn detect(buffer: &str, extra: &[PromptPattern]) -> Detection {
    if buffer.is_empty() {
        return Detection {
            boundaries: Vec::new(),
            method: DetectionMethod::None,
        };
    }

    let boundaries = scan_markers(buffer);
    if !boundaries.is_empty() {
        debug!(count = boundaries.len(), "detected prompts via markers");
        return Detection {
            boundaries,
            method: DetectionMethod::Marker,
        };
    }

    let boundaries = scan_patterns(buffer, extra);
    if !boundaries.is_empty() {
        debug!(count = boundaries.len(), "detected prompts via pattern bank");
        return Detection {
            boundaries,
            method: DetectionMethod::Regex,
        };
    }

    warn!("no prompt boundaries in buffer, falling back to one raw record");
    Detection {
        boundaries: vec![PromptBoundary {
            offset: 0,
            input_offset: 0,
            tag: PromptTag::default(),
            method: DetectionMethod::None,
        }],
        method: DetectionMethod::None,
    }
}

/// Scans for complete marker pairs: a prompt-start followed by an
/// input-start before the next prompt-start. An unpaired prompt-start is a
/// partially captured redraw and is skipped, not an error. Pairs may span
/// lines so multi-line prompt themes work unchanged.
fn scan_markers(buffer: &str) -> Vec<PromptBoundary> {
    let mut boundaries = Vec::new();
    let mut search_from = 0;
    while let Some(rel) = buffer[search_from..].find(PROMPT_START) {
        let start = search_from + rel;
        let after = start + PROMPT_START.len();
        let window_end = buffer[after..]
            .find(PROMPT_START)
            .map(|r| after + r)
            .unwrap_or(buffer.len());
        match buffer[after..window_end].find(INPUT_START) {
            Some(rel_input) => {
                let tag_zone = &buffer[after..after + rel_input];
                let tag = PromptTag::parse(&markers::decode_tags(tag_zone));
                let input_offset = after + rel_input + INPUT_START.len();
                boundaries.push(PromptBoundary {
                    offset: start,
                    input_offset,
                    tag,
                    method: DetectionMethod::Marker,
                });
                search_from = input_offset;
            }
            None => {
                debug!(offset = start, "skipping unpaired prompt-start marker");
                search_from = window_end;
            }
        }
    }
    boundaries
}

/// Matches the pattern bank against the start of every line.
fn scan_patterns(buffer: &str, extra: &[PromptPattern]) -> Vec<PromptBoundary> {
    let mut boundaries = Vec::new();
    let mut offset = 0;
    for line in buffer.split('\n') {
        if let Some(m) = patterns::match_line(line, extra) {
            boundaries.push(PromptBoundary {
                offset,
                input_offset: offset + m.token_len,
                tag: PromptTag {
                    exit_code: m.exit_code,
                    ..PromptTag::default()
                },
                method: DetectionMethod::Regex,
            });
        }
        offset += line.len() + 1;
    }
    boundaries
}
