//! Invisible prompt-marker protocol.
//!
//! The shell integration wraps every prompt render with reserved private-use
//! codepoints so the detector can find prompt boundaries without guessing at
//! prompt themes. Layout of the reserved block:
//!
//! - `U+E7C0..U+E7C2` - prompt-start, emitted before the prompt string
//! - `U+E7C3..U+E7C5` - input-start, emitted after the prompt string
//! - `U+E7D0..U+E7DF` - tag codepoints, one per ASCII character of the
//!   metadata payload (digits, `E`, `T`, `D`, space, dash, colon)
//!
//! Between the two marker sequences the shell smuggles a payload of the form
//! `E<exit_code>T<YYYY-MM-DD HH:MM:SS>` with an optional
//! `D<duration_seconds>`, encoded through the tag alphabet so it never shows
//! up on screen but survives terminal capture. Secondary (continuation)
//! prompts carry a bare input-start so multi-line commands stay one command.

use std::iter::Peekable;
use std::str::Chars;

use chrono::NaiveDateTime;

/// Emitted immediately before the shell draws its prompt string.
pub const PROMPT_START: &str = "\u{E7C0}\u{E7C1}\u{E7C2}";

/// Emitted immediately after the prompt string, before the input column.
pub const INPUT_START: &str = "\u{E7C3}\u{E7C4}\u{E7C5}";

/// First codepoint of the tag range.
const TAG_BASE: u32 = 0xE7D0;

/// ASCII alphabet the tag range encodes, in codepoint order: `TAG_BASE + i`
/// stands for `TAG_ALPHABET[i]`.
const TAG_ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'E', 'T', 'D', ' ', '-', ':',
];

/// Timestamp layout inside the tag payload.
pub const TAG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maps one payload character to its tag codepoint.
pub fn encode_char(c: char) -> Option<char> {
    let idx = TAG_ALPHABET.iter().position(|&a| a == c)?;
    char::from_u32(TAG_BASE + idx as u32)
}

/// Maps one tag codepoint back to its payload character.
pub fn decode_char(c: char) -> Option<char> {
    let cp = c as u32;
    let offset = cp.checked_sub(TAG_BASE)?;
    TAG_ALPHABET.get(offset as usize).copied()
}

/// True for every codepoint reserved by the protocol (markers and tags).
pub fn is_reserved(c: char) -> bool {
    let cp = c as u32;
    (0xE7C0..=0xE7C5).contains(&cp) || decode_char(c).is_some()
}

/// Encodes an ASCII payload through the tag alphabet. Characters outside the
/// alphabet are dropped; the shell side only ever feeds rendered tags in.
pub fn encode_tags(payload: &str) -> String {
    payload.chars().filter_map(encode_char).collect()
}

/// Collects and decodes every tag codepoint in `text`, in order. Visible
/// prompt text interleaved with the tags is ignored.
pub fn decode_tags(text: &str) -> String {
    text.chars().filter_map(decode_char).collect()
}

/// Removes every reserved codepoint, leaving only display text.
pub fn strip(text: &str) -> String {
    text.chars().filter(|&c| !is_reserved(c)).collect()
}

/// Metadata carried by one prompt render.
///
/// All fields are optional: a first-of-session prompt has no previous
/// command to describe, and sessions recorded without the shell integration
/// have no tags at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptTag {
    pub exit_code: Option<i32>,
    pub timestamp: Option<NaiveDateTime>,
    pub duration: Option<u64>,
}

impl PromptTag {
    /// Renders the ASCII payload form, e.g. `E0T2024-01-01 10:00:00D2`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(code) = self.exit_code {
            out.push('E');
            out.push_str(&code.to_string());
        }
        if let Some(ts) = self.timestamp {
            out.push('T');
            out.push_str(&ts.format(TAG_TIME_FORMAT).to_string());
        }
        if let Some(secs) = self.duration {
            out.push('D');
            out.push_str(&secs.to_string());
        }
        out
    }

    /// Parses a decoded ASCII payload. Lenient: unparseable or absent pieces
    /// come back as `None` rather than failing the whole prompt.
    pub fn parse(payload: &str) -> Self {
        let mut tag = Self::default();
        let mut chars = payload.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                'E' => {
                    let num = take_while(&mut chars, |c| c == '-' || c.is_ascii_digit());
                    tag.exit_code = num.parse().ok();
                }
                'T' => {
                    let raw = take_while(&mut chars, |c| c != 'E' && c != 'D');
                    tag.timestamp =
                        NaiveDateTime::parse_from_str(raw.trim(), TAG_TIME_FORMAT).ok();
                }
                'D' => {
                    let num = take_while(&mut chars, |c| c.is_ascii_digit());
                    tag.duration = num.parse().ok();
                }
                _ => {}
            }
        }
        tag
    }
}

fn take_while(chars: &mut Peekable<Chars<'_>>, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !pred(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Wraps a primary prompt with the marker protocol.
///
/// Idempotent: a prompt already carrying a prompt-start sequence is returned
/// unchanged, so re-running the shell hook never stacks markers.
pub fn inject(prompt: &str, tag: &PromptTag) -> String {
    if prompt.contains(PROMPT_START) {
        return prompt.to_string();
    }
    let mut out = String::with_capacity(prompt.len() + 32);
    out.push_str(PROMPT_START);
    out.push_str(&encode_tags(&tag.render()));
    out.push_str(prompt);
    out.push_str(INPUT_START);
    out
}

/// Appends input-start to a secondary (continuation) prompt. Idempotent.
pub fn inject_continuation(prompt: &str) -> String {
    if prompt.contains(INPUT_START) {
        return prompt.to_string();
    }
    format!("{prompt}{INPUT_START}")
}
