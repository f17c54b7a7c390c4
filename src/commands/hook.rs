//! Shell integration: hook snippets and prompt wrapping.
//!
//! The snippet rewrites the shell's primary prompt through
//! `context --wrap-prompt` on every render, which brackets it with the
//! invisible marker protocol and records the previous command's exit code,
//! a timestamp, and (where the shell can time it) a duration. The
//! continuation prompt is wrapped once at install time since it never
//! carries metadata.

use std::io::{self, Read};

use anyhow::Result;
use chrono::Local;
use clap::ValueEnum;

use crate::detect::markers::{self, PromptTag};

/// Shells the integration snippet supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HookShell {
    Zsh,
    Bash,
}

const ZSH_HOOK: &str = r#"# termctx zsh integration. Install with:
#   eval "$(context --hook zsh)"
if [[ -z ${TERMCTX_HOOKED-} ]]; then
  export TERMCTX_HOOKED=1
  typeset -g __termctx_ps1=$PROMPT
  PS2=$(print -rn -- "$PS2" | command context --wrap-continuation)
  __termctx_preexec() {
    typeset -g __termctx_started=$SECONDS
  }
  __termctx_precmd() {
    local code=$?
    local -a extra
    if [[ -n ${__termctx_started-} ]]; then
      extra=(--duration $(( SECONDS - __termctx_started )))
      unset __termctx_started
    fi
    PROMPT=$(print -rn -- "$__termctx_ps1" | command context --wrap-prompt "$code" "${extra[@]}")
  }
  autoload -Uz add-zsh-hook
  add-zsh-hook preexec __termctx_preexec
  add-zsh-hook precmd __termctx_precmd
fi
"#;

const BASH_HOOK: &str = r#"# termctx bash integration. Install with:
#   eval "$(context --hook bash)"
if [[ -z ${TERMCTX_HOOKED-} ]]; then
  export TERMCTX_HOOKED=1
  __termctx_ps1=$PS1
  PS2=$(printf '%s' "$PS2" | command context --wrap-continuation)
  __termctx_prompt() {
    local code=$?
    PS1=$(printf '%s' "$__termctx_ps1" | command context --wrap-prompt "$code")
  }
  PROMPT_COMMAND="__termctx_prompt${PROMPT_COMMAND:+;$PROMPT_COMMAND}"
fi
"#;

/// Prints the integration snippet for `eval "$(context --hook <shell>)"`.
#[cfg(not(tarpaulin_include))]
pub fn handle_hook(shell: HookShell) {
    match shell {
        HookShell::Zsh => print!("{ZSH_HOOK}"),
        HookShell::Bash => print!("{BASH_HOOK}"),
    }
}

/// Reads a prompt from stdin and re-emits it wrapped in markers carrying
/// the given metadata. Idempotent, like the injection it delegates to.
#[cfg(not(tarpaulin_include))]
pub fn handle_wrap_prompt(exit_code: i32, duration: Option<u64>) -> Result<()> {
    let mut prompt = String::new();
    io::stdin().read_to_string(&mut prompt)?;
    let tag = PromptTag {
        exit_code: Some(exit_code),
        timestamp: Some(Local::now().naive_local()),
        duration,
    };
    print!("{}", markers::inject(&prompt, &tag));
    Ok(())
}

/// Reads a continuation prompt from stdin and appends the input marker.
#[cfg(not(tarpaulin_include))]
pub fn handle_wrap_continuation() -> Result<()> {
    let mut prompt = String::new();
    io::stdin().read_to_string(&mut prompt)?;
    print!("{}", markers::inject_continuation(&prompt));
    Ok(())
}
