//! Block quote rewrite.
//!
//! Every quoted line starts with a run of `>`; the length of the run is the
//! nesting depth. Depth changes become `quote_open`/`quote_close` pairs and
//! lines at the same depth are joined by `linebreak`.

use crate::{
    call::{Call, CallName},
    diagnostics::Diagnostics,
};

use super::{FrameKind, Rewriter};

/// Length of the first run of `>` in a quote marker, at least 1.
fn quote_depth(marker: &str) -> usize {
    marker
        .trim_start_matches(|c: char| c != '>')
        .chars()
        .take_while(|&c| c == '>')
        .count()
        .max(1)
}

/// Buffers one block quote.
#[derive(Debug, Default)]
pub struct QuoteWriter {
    calls: Vec<Call>,
}

impl QuoteWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rewriter for QuoteWriter {
    fn kind(&self) -> FrameKind {
        FrameKind::Quote
    }

    fn write_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn last_pos(&self) -> Option<usize> {
        self.calls.last().map(Call::pos)
    }

    fn closing_call(&self, pos: usize) -> Call {
        Call::bare(CallName::QuoteEnd, pos)
    }

    fn process(self: Box<Self>, _diagnostics: &mut Diagnostics) -> Vec<Call> {
        let mut out = Vec::with_capacity(self.calls.len());
        let mut depth = 0;

        for call in self.calls {
            let pos = call.pos();
            match call.name() {
                CallName::QuoteStart | CallName::QuoteNewline => {
                    let starting = call.is(CallName::QuoteStart);
                    if starting {
                        out.push(Call::bare(CallName::QuoteOpen, pos));
                        depth = 1;
                    }
                    let target = quote_depth(call.text().unwrap_or_default());
                    if target > depth {
                        out.extend((depth..target).map(|_| Call::bare(CallName::QuoteOpen, pos)));
                    } else if target < depth {
                        out.extend((target..depth).map(|_| Call::bare(CallName::QuoteClose, pos)));
                    } else if !starting {
                        out.push(Call::bare(CallName::Linebreak, pos));
                    }
                    depth = target;
                }
                CallName::QuoteEnd => {
                    out.extend((0..depth.max(1)).map(|_| Call::bare(CallName::QuoteClose, pos)));
                    depth = 0;
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
