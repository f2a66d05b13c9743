//! # Call Writer Stack
//!
//! Mode procedures never decide *where* a call goes. They hand it to the
//! [`CallWriter`], which appends it to whatever frame is on top:
//!
//! ```text
//!   frames[2]  NestWriter    ← footnote inside a table cell
//!   frames[1]  TableWriter
//!   frames[0]  ListWriter
//!   base       final instruction list
//! ```
//!
//! A block construct pushes its [`Rewriter`] on ENTER. Everything emitted
//! while it is on top lands in its buffer. On EXIT the frame is popped, its
//! buffer is rewritten into properly nested structure and the result is
//! written, call by call, into the frame below. The base frame applies no
//! rewrite.
//!
//! The parent of `frames[i]` is `frames[i - 1]` (the base list for `i == 0`),
//! so popping is bounds-checked and ownership of every buffer stays with the
//! stack.
//!
//! ## Rewriters
//!
//! - [`table`] - rows, cells, spans and alignment
//! - [`lists`] - nested ordered/unordered lists
//! - [`quote`] - block quote depth changes
//! - [`preformatted`] - indented code blocks
//! - [`nest`] - captured sub-streams (footnotes)

pub mod lists;
pub mod nest;
pub mod preformatted;
pub mod quote;
pub mod table;

use std::fmt;

use serde::Serialize;

use crate::{
    call::Call,
    diagnostics::{DiagnosticKind, Diagnostics},
    error::HandlerError,
};

pub use lists::ListWriter;
pub use nest::NestWriter;
pub use preformatted::PreformattedWriter;
pub use quote::QuoteWriter;
pub use table::TableWriter;

/// The construct a frame buffers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Table,
    List,
    Quote,
    Preformatted,
    Nest,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameKind::Table => "table",
            FrameKind::List => "list",
            FrameKind::Quote => "quote",
            FrameKind::Preformatted => "preformatted",
            FrameKind::Nest => "nest",
        })
    }
}

/// Identity of a frame for as long as the writer lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    /// The base frame that writes into the final instruction list.
    pub const BASE: FrameId = FrameId(0);
}

/// A buffering frame that restructures one block construct.
pub trait Rewriter: fmt::Debug {
    fn kind(&self) -> FrameKind;

    /// Buffer a call routed to this frame.
    fn write_call(&mut self, call: Call);

    /// Position of the last buffered call.
    fn last_pos(&self) -> Option<usize>;

    /// The call that closes this construct, for blocks left open at the end
    /// of the document.
    fn closing_call(&self, pos: usize) -> Call;

    /// Turn the buffered raw calls into their final structure.
    fn process(self: Box<Self>, diagnostics: &mut Diagnostics) -> Vec<Call>;

    /// Hand back the buffer unchanged.
    fn into_calls(self: Box<Self>) -> Vec<Call>;
}

#[derive(Debug)]
struct Frame {
    id: FrameId,
    rewriter: Box<dyn Rewriter>,
}

/// The stack of active frames over the final instruction list.
#[derive(Debug)]
pub struct CallWriter {
    calls: Vec<Call>,
    frames: Vec<Frame>,
    next_id: usize,
    rewrite: bool,
}

impl CallWriter {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            frames: Vec::new(),
            next_id: 1,
            rewrite: true,
        }
    }

    /// When disabled, popped frames flush their raw buffer untouched.
    pub fn with_rewrite(mut self, rewrite: bool) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Append a call to the active frame.
    pub fn write_call(&mut self, call: Call) {
        match self.frames.last_mut() {
            Some(frame) => frame.rewriter.write_call(call),
            None => self.calls.push(call),
        }
    }

    pub fn write_calls(&mut self, calls: impl IntoIterator<Item = Call>) {
        for call in calls {
            self.write_call(call);
        }
    }

    /// Make `rewriter` the active frame; the previous top becomes its parent.
    pub fn push(&mut self, rewriter: Box<dyn Rewriter>) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "push {} frame {:?} at depth {}",
            rewriter.kind(),
            id,
            self.frames.len() + 1
        );
        self.frames.push(Frame { id, rewriter });
        id
    }

    /// Check that the active frame buffers for `expected`.
    pub fn expect_active(&self, expected: FrameKind, pos: usize) -> Result<(), HandlerError> {
        match self.active_kind() {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(HandlerError::MismatchedFrame {
                expected,
                found,
                pos,
            }),
            None => Err(HandlerError::NoOpenFrame { expected, pos }),
        }
    }

    /// Pop the active frame, rewrite its buffer and flush it into the parent.
    pub fn pop_and_flush(
        &mut self,
        expected: FrameKind,
        pos: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), HandlerError> {
        self.expect_active(expected, pos)?;
        let Some(frame) = self.frames.pop() else {
            return Err(HandlerError::NoOpenFrame { expected, pos });
        };
        self.flush(frame, diagnostics);
        Ok(())
    }

    /// Close every frame still open, innermost first.
    ///
    /// Each frame gets its construct's closing call at the position of the
    /// last call it buffered.
    pub fn close_all(&mut self, diagnostics: &mut Diagnostics) {
        while let Some(mut frame) = self.frames.pop() {
            let pos = frame
                .rewriter
                .last_pos()
                .or_else(|| self.last_pos())
                .unwrap_or(0);
            diagnostics.push(
                pos,
                DiagnosticKind::UnclosedConstruct {
                    frame: frame.rewriter.kind(),
                },
            );
            let closing = frame.rewriter.closing_call(pos);
            frame.rewriter.write_call(closing);
            self.flush(frame, diagnostics);
        }
    }

    fn flush(&mut self, frame: Frame, diagnostics: &mut Diagnostics) {
        let kind = frame.rewriter.kind();
        let calls = if self.rewrite {
            frame.rewriter.process(diagnostics)
        } else {
            frame.rewriter.into_calls()
        };
        log::debug!(
            "pop {kind} frame {:?}, flushing {} calls",
            frame.id,
            calls.len()
        );
        self.write_calls(calls);
    }

    /// The frame calls are currently routed to.
    pub fn active(&self) -> FrameId {
        self.frames.last().map_or(FrameId::BASE, |frame| frame.id)
    }

    pub fn active_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|frame| frame.rewriter.kind())
    }

    /// Number of open block frames above the base.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Position of the last call anywhere in the writer.
    pub fn last_pos(&self) -> Option<usize> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.rewriter.last_pos())
            .or_else(|| self.calls.last().map(Call::pos))
    }

    /// The final instruction list written so far.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Take the final instruction list. Open frames are discarded.
    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }
}

impl Default for CallWriter {
    fn default() -> Self {
        Self::new()
    }
}
