//! Prompt pattern bank for sessions recorded without marker injection.
//!
//! A flat, ordered table of per-shell-family patterns matched against line
//! starts. Matching is heuristic by nature: it recovers boundaries but no
//! reliable metadata, with one exception - themes that print the previous
//! command's exit status get a capture-based extractor.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// One prompt family: a line-start pattern plus an optional capture group
/// holding the previous command's exit code.
#[derive(Debug)]
pub struct PromptPattern {
    pub family: &'static str,
    pub regex: Regex,
    pub exit_code_group: Option<usize>,
}

/// Built-in prompt families.
/// Order matters: more specific patterns must come before generic ones, so a
/// bare trailing `$` never pre-empts a more distinctive theme.
static PROMPT_PATTERNS: LazyLock<Vec<PromptPattern>> = LazyLock::new(|| {
    vec![
        // Most specific patterns first
        PromptPattern {
            family: "status-glyph",
            regex: Regex::new(r"^\[(\d{1,3})\]\s*[❯➜→»](?:\s|$)")
                .expect("status-glyph prompt pattern is a valid regex"),
            exit_code_group: Some(1),
        },
        PromptPattern {
            family: "boxed-tail",
            regex: Regex::new(r"^[└╰]─*[$#❯>](?:\s|$)")
                .expect("boxed-tail prompt pattern is a valid regex"),
            exit_code_group: None,
        },
        PromptPattern {
            family: "user-host",
            regex: Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*@[A-Za-z0-9_.-]+[^\n]*?[$#](?:\s|$)")
                .expect("user-host prompt pattern is a valid regex"),
            exit_code_group: None,
        },
        PromptPattern {
            family: "zsh-glyph",
            regex: Regex::new(r"^[❯➜→»](?:\s|$)")
                .expect("zsh-glyph prompt pattern is a valid regex"),
            exit_code_group: None,
        },
        // Requires a letter before the % and a space after it, so
        // percentages in output ("100%", "100% done") never read as
        // prompts.
        PromptPattern {
            family: "zsh-percent",
            regex: Regex::new(r"^[A-Za-z0-9_.-]*[A-Za-z_][A-Za-z0-9_.-]*%\s")
                .expect("zsh-percent prompt pattern is a valid regex"),
            exit_code_group: None,
        },
        PromptPattern {
            family: "root-hash",
            regex: Regex::new(r"^#(?:\s|$)").expect("root-hash prompt pattern is a valid regex"),
            exit_code_group: None,
        },
        PromptPattern {
            family: "posix-dollar",
            regex: Regex::new(r"^\$(?:\s|$)")
                .expect("posix-dollar prompt pattern is a valid regex"),
            exit_code_group: None,
        },
    ]
});

/// A prompt token recognized at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMatch {
    pub family: &'static str,
    /// Byte length of the matched prompt token within the line.
    pub token_len: usize,
    /// Previous command's exit status, for families that display it.
    pub exit_code: Option<i32>,
}

/// Compile user-supplied patterns from the config. Invalid regexes are
/// skipped with a warning; a broken config line must not take queries down.
pub fn compile_extra(patterns: &[String]) -> Vec<PromptPattern> {
    patterns
        .iter()
        .filter_map(|raw| match Regex::new(raw) {
            Ok(regex) => Some(PromptPattern {
                family: "custom",
                regex,
                exit_code_group: None,
            }),
            Err(e) => {
                warn!(pattern = %raw, error = %e, "skipping invalid extra prompt pattern");
                None
            }
        })
        .collect()
}

/// Try the bank against the start of one line; the first matching family
/// wins. Built-ins are tried before `extra` so user additions can widen the
/// bank but never shadow it.
pub fn match_line(line: &str, extra: &[PromptPattern]) -> Option<PromptMatch> {
    PROMPT_PATTERNS
        .iter()
        .chain(extra.iter())
        .find_map(|pattern| {
            let caps = pattern.regex.captures(line)?;
            let whole = caps.get(0)?;
            // Custom patterns need not be anchored; reject mid-line hits.
            if whole.start() != 0 {
                return None;
            }
            let exit_code = pattern
                .exit_code_group
                .and_then(|g| caps.get(g))
                .and_then(|m| m.as_str().parse().ok());
            Some(PromptMatch {
                family: pattern.family,
                token_len: whole.end(),
                exit_code,
            })
        })
}
