//! Virtual terminal normalizer.
//!
//! Replays a transcript's output events through a VTE state machine and
//! produces the text a human would have seen: carriage-return and
//! cursor-movement overwrites are resolved (progress bars collapse to their
//! final state), SGR styling is dropped, and incomplete trailing escape
//! sequences vanish instead of leaking as garbage.
//!
//! The model is a growing list of logical lines rather than a fixed grid:
//! linefeeds append history, while addressed cursor moves (CUP and friends)
//! operate on a tail viewport of the terminal's row count, which is how
//! full-screen redraws end up collapsed onto the lines they actually drew.
//!
//! Reserved prompt-marker codepoints are ordinary printable characters at
//! this layer and flow through untouched; stripping them would blind the
//! boundary detector downstream.

use unicode_width::UnicodeWidthChar;
use vte::{Params, Parser, Perform};

use crate::cast::{EventKind, EventStream};

/// Fills the second column of a wide character; dropped when rendering.
const WIDE_SPACER: char = '\0';

/// Render a transcript's output events into the normalized buffer.
///
/// Input events are ignored (the pty echo already placed them in the output
/// stream); resize events update the viewport height used for addressed
/// cursor moves.
pub fn normalize(stream: &EventStream) -> String {
    let mut buffer = TerminalBuffer::new(stream.rows());
    for event in &stream.events {
        match event.kind {
            EventKind::Output => buffer.process(&event.data),
            EventKind::Resize => {
                if let Some((_, rows)) = event.parse_resize() {
                    buffer.resize(rows);
                }
            }
            _ => {}
        }
    }
    buffer.into_text()
}

/// A VTE-backed line buffer. Escape-sequence state survives across
/// [`TerminalBuffer::process`] calls, so sequences split between events are
/// reassembled exactly like a real terminal would.
pub struct TerminalBuffer {
    parser: Parser,
    performer: TerminalPerformer,
}

impl TerminalBuffer {
    pub fn new(rows: usize) -> Self {
        Self {
            parser: Parser::new(),
            performer: TerminalPerformer::new(rows),
        }
    }

    /// Feed one chunk of raw terminal output.
    pub fn process(&mut self, data: &str) {
        self.parser.advance(&mut self.performer, data.as_bytes());
    }

    /// Update the viewport height after a resize event.
    pub fn resize(&mut self, rows: usize) {
        self.performer.rows = rows.max(1);
    }

    /// Finalize into the normalized buffer: lines joined with `\n`,
    /// trailing blank padding removed, wide-char spacers dropped.
    pub fn into_text(self) -> String {
        let mut out = String::new();
        for (i, line) in self.performer.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let end = line
                .iter()
                .rposition(|&c| c != ' ' && c != WIDE_SPACER)
                .map_or(0, |p| p + 1);
            out.extend(line[..end].iter().filter(|&&c| c != WIDE_SPACER));
        }
        out
    }
}

/// Grid state behind the parser: logical lines plus a cursor.
struct TerminalPerformer {
    lines: Vec<Vec<char>>,
    row: usize,
    col: usize,
    /// Viewport height for addressed moves.
    rows: usize,
}

impl TerminalPerformer {
    fn new(rows: usize) -> Self {
        Self {
            lines: vec![Vec::new()],
            row: 0,
            col: 0,
            rows: rows.max(1),
        }
    }

    /// First buffer line currently on screen.
    fn viewport_top(&self) -> usize {
        self.lines.len().saturating_sub(self.rows)
    }

    fn ensure_row(&mut self, row: usize) {
        while self.lines.len() <= row {
            self.lines.push(Vec::new());
        }
    }

    fn put_cell(&mut self, c: char) {
        let col = self.col;
        self.ensure_row(self.row);
        let line = &mut self.lines[self.row];
        if col < line.len() {
            line[col] = c;
        } else {
            while line.len() < col {
                line.push(' ');
            }
            line.push(c);
        }
        self.col += 1;
    }

    fn linefeed(&mut self) {
        self.row += 1;
        self.col = 0;
        self.ensure_row(self.row);
    }

    fn erase_in_line(&mut self, mode: u16) {
        self.ensure_row(self.row);
        let col = self.col;
        let line = &mut self.lines[self.row];
        match mode {
            0 => line.truncate(col),
            1 => {
                for cell in line.iter_mut().take(col + 1) {
                    *cell = ' ';
                }
            }
            2 => line.clear(),
            _ => {}
        }
    }

    fn erase_in_display(&mut self, mode: u16) {
        let top = self.viewport_top();
        let bottom = self.lines.len();
        match mode {
            0 => {
                self.erase_in_line(0);
                for r in self.row + 1..bottom {
                    self.lines[r].clear();
                }
            }
            1 => {
                self.erase_in_line(1);
                for r in top..self.row {
                    self.lines[r].clear();
                }
            }
            2 | 3 => {
                for r in top..bottom {
                    self.lines[r].clear();
                }
            }
            _ => {}
        }
    }
}

impl Perform for TerminalPerformer {
    fn print(&mut self, c: char) {
        let width = UnicodeWidthChar::width(c).unwrap_or(1).max(1);
        self.put_cell(c);
        if width == 2 {
            self.put_cell(WIDE_SPACER);
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // Recorded streams come off a pty with ONLCR, so LF normally
            // arrives as CRLF; treating a bare LF as a full newline renders
            // cooked and raw streams alike.
            b'\n' | 0x0b | 0x0c => self.linefeed(),
            b'\r' => self.col = 0,
            0x08 => self.col = self.col.saturating_sub(1),
            b'\t' => self.col = (self.col / 8 + 1) * 8,
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, action: char) {
        let mut iter = params.iter();
        let first = iter
            .next()
            .and_then(|p| p.first().copied())
            .map(|v| v as usize);
        let second = iter
            .next()
            .and_then(|p| p.first().copied())
            .map(|v| v as usize);
        let count = first.unwrap_or(1).max(1);

        match action {
            'A' => self.row = self.row.saturating_sub(count).max(self.viewport_top()),
            'B' | 'e' => {
                let bottom = self.viewport_top() + self.rows - 1;
                self.row = (self.row + count).min(bottom);
                self.ensure_row(self.row);
            }
            'C' | 'a' => self.col += count,
            'D' => self.col = self.col.saturating_sub(count),
            'G' | '`' => self.col = count.saturating_sub(1),
            'd' => {
                self.row = self.viewport_top() + count - 1;
                self.ensure_row(self.row);
            }
            'H' | 'f' => {
                let row = count;
                let col = second.unwrap_or(1).max(1);
                self.row = self.viewport_top() + row - 1;
                self.col = col - 1;
                self.ensure_row(self.row);
            }
            'J' => self.erase_in_display(first.unwrap_or(0) as u16),
            'K' => self.erase_in_line(first.unwrap_or(0) as u16),
            // SGR and everything else are display styling or modes with no
            // bearing on the extracted text.
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}
}
