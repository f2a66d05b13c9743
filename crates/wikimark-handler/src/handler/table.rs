//! Table mode. Emits the raw delimiter stream that
//! [`TableWriter`](crate::writer::TableWriter) restructures on EXIT.

use crate::{
    call::CallName,
    diagnostics::DiagnosticKind,
    error::HandlerError,
    event::LexerState,
    writer::{FrameKind, TableWriter},
};

use super::{Handler, Mode};

impl Handler {
    pub(super) fn table(
        &mut self,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        match state {
            LexerState::Enter => {
                self.writer.push(Box::new(TableWriter::new()));
                self.emit(CallName::TableStart, vec![(pos + 1).into()], pos);
                let cell = if text.trim() == "^" {
                    CallName::Tableheader
                } else {
                    CallName::Tablecell
                };
                self.emit(cell, Vec::new(), pos);
                Ok(true)
            }
            LexerState::Exit => {
                self.writer.expect_active(FrameKind::Table, pos)?;
                self.emit(CallName::TableEnd, vec![pos.into()], pos);
                self.writer
                    .pop_and_flush(FrameKind::Table, pos, &mut self.diagnostics)?;
                Ok(true)
            }
            LexerState::Unmatched => {
                self.writer.expect_active(FrameKind::Table, pos)?;
                if text.trim().is_empty() {
                    self.diagnostics
                        .push(pos, DiagnosticKind::DroppedWhitespace { mode: Mode::Table });
                    return Ok(true);
                }
                self.emit(CallName::Cdata, vec![text.into()], pos);
                Ok(true)
            }
            LexerState::Matched | LexerState::Special => {
                self.writer.expect_active(FrameKind::Table, pos)?;
                self.table_delimiter(text, pos)
            }
        }
    }

    /// The first rule that matches wins.
    fn table_delimiter(&mut self, text: &str, pos: usize) -> Result<bool, HandlerError> {
        if text == " " {
            self.emit(CallName::Cdata, vec![text.into()], pos);
        } else if text.contains(":::") {
            self.emit(CallName::Rowspan, vec![text.into()], pos);
        } else if text.contains('\t') || text.contains("  ") {
            self.emit(CallName::TableAlign, vec![text.into()], pos);
        } else if text == "\n|" {
            self.emit(CallName::TableRow, Vec::new(), pos);
            self.emit(CallName::Tablecell, Vec::new(), pos);
        } else if text == "\n^" {
            self.emit(CallName::TableRow, Vec::new(), pos);
            self.emit(CallName::Tableheader, Vec::new(), pos);
        } else if text == "|" {
            self.emit(CallName::Tablecell, Vec::new(), pos);
        } else if text == "^" {
            self.emit(CallName::Tableheader, Vec::new(), pos);
        } else {
            self.diagnostics.push(
                pos,
                DiagnosticKind::IgnoredDelimiter {
                    mode: Mode::Table,
                    text: text.to_string(),
                },
            );
        }
        Ok(true)
    }
}
