//! Captures a sub-stream (a footnote body) into a single `nest` call so the
//! renderer can place it out of line.

use crate::{
    call::{Call, CallName},
    diagnostics::Diagnostics,
};

use super::{FrameKind, Rewriter};

/// Buffers the calls of one nested construct.
#[derive(Debug)]
pub struct NestWriter {
    calls: Vec<Call>,
    closing: CallName,
}

impl NestWriter {
    /// `closing` is the call that ends the construct, e.g. `footnote_close`.
    pub fn new(closing: CallName) -> Self {
        Self {
            calls: Vec::new(),
            closing,
        }
    }
}

impl Default for NestWriter {
    fn default() -> Self {
        Self::new(CallName::FootnoteClose)
    }
}

impl Rewriter for NestWriter {
    fn kind(&self) -> FrameKind {
        FrameKind::Nest
    }

    fn write_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn last_pos(&self) -> Option<usize> {
        self.calls.last().map(Call::pos)
    }

    fn closing_call(&self, pos: usize) -> Call {
        Call::bare(self.closing, pos)
    }

    fn process(self: Box<Self>, _diagnostics: &mut Diagnostics) -> Vec<Call> {
        let Some(pos) = self.calls.first().map(Call::pos) else {
            return Vec::new();
        };

        let mut nested: Vec<Call> = Vec::with_capacity(self.calls.len());
        for call in self.calls {
            if call.is(CallName::Eol) {
                continue;
            }
            match nested.last_mut() {
                Some(last) if last.is(CallName::Cdata) && call.is(CallName::Cdata) => {
                    let text = format!(
                        "{}{}",
                        last.text().unwrap_or_default(),
                        call.text().unwrap_or_default()
                    );
                    *last = Call::cdata(text, last.pos());
                }
                _ => nested.push(call),
            }
        }

        vec![Call::new(CallName::Nest, vec![nested.into()], pos)]
    }

    fn into_calls(self: Box<Self>) -> Vec<Call> {
        self.calls
    }
}
