//! Warnings for input the handler repaired or dropped.
//!
//! Recovery is silent as far as the instruction stream is concerned; this
//! channel records what happened so callers and tests can see it.

use std::fmt;

use serde::Serialize;

use crate::{handler::Mode, writer::FrameKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A delimiter the mode has no rule for; nothing was emitted.
    IgnoredDelimiter { mode: Mode, text: String },
    /// Whitespace-only text between delimiters.
    DroppedWhitespace { mode: Mode },
    /// A block still open at the end of the document.
    UnclosedConstruct { frame: FrameKind },
    /// A `:::` cell with no cell above it to extend.
    UnresolvedRowspan,
    /// Calls after the final cell delimiter of a table row.
    DiscardedTrailingContent { calls: usize },
    /// A footnote opened inside a footnote; emitted as text.
    NestedFootnote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub pos: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::IgnoredDelimiter { mode, text } => {
                write!(f, "byte {}: ignored {mode} delimiter {text:?}", self.pos)
            }
            DiagnosticKind::DroppedWhitespace { mode } => {
                write!(f, "byte {}: dropped whitespace in {mode}", self.pos)
            }
            DiagnosticKind::UnclosedConstruct { frame } => {
                write!(f, "byte {}: {frame} was never closed", self.pos)
            }
            DiagnosticKind::UnresolvedRowspan => {
                write!(f, "byte {}: row span has no cell above to extend", self.pos)
            }
            DiagnosticKind::DiscardedTrailingContent { calls } => write!(
                f,
                "byte {}: discarded {calls} calls after the last cell delimiter",
                self.pos
            ),
            DiagnosticKind::NestedFootnote => {
                write!(f, "byte {}: footnotes cannot be nested", self.pos)
            }
        }
    }
}

/// Collected diagnostics, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pos: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { pos, kind };
        log::debug!("{diagnostic}");
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
