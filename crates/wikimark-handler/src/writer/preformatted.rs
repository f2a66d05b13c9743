//! Indented code block rewrite: the block's lines are joined into a single
//! `preformatted` call.

use crate::{
    call::{Call, CallName},
    diagnostics::Diagnostics,
};

use super::{FrameKind, Rewriter};

/// Buffers one preformatted block.
#[derive(Debug, Default)]
pub struct PreformattedWriter {
    calls: Vec<Call>,
}

impl PreformattedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rewriter for PreformattedWriter {
    fn kind(&self) -> FrameKind {
        FrameKind::Preformatted
    }

    fn write_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn last_pos(&self) -> Option<usize> {
        self.calls.last().map(Call::pos)
    }

    fn closing_call(&self, pos: usize) -> Call {
        Call::bare(CallName::PreformattedEnd, pos)
    }

    fn process(self: Box<Self>, _diagnostics: &mut Diagnostics) -> Vec<Call> {
        let mut out = Vec::new();
        let mut text = String::new();
        let mut start = self.calls.first().map_or(0, Call::pos);

        for call in self.calls {
            match call.name() {
                CallName::PreformattedStart => start = call.pos(),
                CallName::PreformattedNewline => text.push('\n'),
                CallName::PreformattedContent => text.push_str(call.text().unwrap_or_default()),
                CallName::PreformattedEnd => {
                    if !text.trim().is_empty() {
                        out.push(Call::new(
                            CallName::Preformatted,
                            vec![std::mem::take(&mut text).into()],
                            start,
                        ));
                    }
                    text.clear();
                    // Paragraph detection downstream needs the block to end a line twice
                    out.push(Call::bare(CallName::Eol, start));
                    out.push(Call::bare(CallName::Eol, start));
                }
                _ => out.push(call),
            }
        }
        out
    }

    fn into_calls(self: Box<Self>) -> Vec<Call> {
        self.calls
    }
}
