//! # Lexer Events
//!
//! The handler never sees raw text. An external lexer scans the document and
//! reports every pattern it recognises as a [`LexEvent`]: the mode that
//! matched, the matched text, the [`LexerState`] and the byte position.
//!
//! ```text
//! "^ a ^\n| b |\n"
//!   table   Enter     "\n^"   0
//!   table   Matched   " "     2
//!   table   Unmatched "a"     3
//!   ...
//!   table   Exit      "\n"    12
//! ```
//!
//! Events arrive in document order. The lexer has no idea about nesting;
//! restoring structure is the job of the writer stack.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lexer state attached to every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexerState {
    /// Opening delimiter of a mode.
    Enter,
    /// A delimiter recognised inside an open mode.
    Matched,
    /// Text between delimiters that no pattern claimed.
    Unmatched,
    /// Closing delimiter of a mode.
    Exit,
    /// A single-shot match (media, plugins) that opens and closes at once.
    Special,
}

impl LexerState {
    pub fn as_str(self) -> &'static str {
        match self {
            LexerState::Enter => "enter",
            LexerState::Matched => "matched",
            LexerState::Unmatched => "unmatched",
            LexerState::Exit => "exit",
            LexerState::Special => "special",
        }
    }
}

impl fmt::Display for LexerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One match reported by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexEvent {
    /// Name of the mode that produced the match (`table`, `plugin_box`, ...).
    pub mode: String,
    /// The matched text.
    pub text: String,
    pub state: LexerState,
    /// Byte offset of the match in the source document.
    pub pos: usize,
}

impl LexEvent {
    pub fn new(
        mode: impl Into<String>,
        text: impl Into<String>,
        state: LexerState,
        pos: usize,
    ) -> Self {
        Self {
            mode: mode.into(),
            text: text.into(),
            state,
            pos,
        }
    }
}
