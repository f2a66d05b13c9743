//! # Handler
//!
//! Turns lexer events into calls. Each event is routed by its mode to a
//! procedure that emits calls through the [`CallWriter`]. Block modes push a
//! rewriter on ENTER and pop it on EXIT; everything in between is buffered
//! and restructured when the block closes.
//!
//! ```text
//! LexEvent ──► Construct ──► mode procedure ──► CallWriter ──► Instructions
//!                              │                   ▲
//!                              └── push / pop ─────┘
//! ```

mod mode;
mod plugin;
mod table;

use std::collections::HashMap;

use serde::Serialize;

pub use mode::{Construct, Mode};
pub use plugin::SyntaxPlugin;

use crate::{
    call::{Call, CallName, Value},
    diagnostics::{Diagnostic, DiagnosticKind, Diagnostics},
    error::HandlerError,
    event::{LexEvent, LexerState},
    media::decode_media_params,
    reference::{DEFAULT_EXTERNAL_SCHEMES, DefaultClassifier, ReferenceClassifier},
    writer::{
        CallWriter, FrameId, FrameKind, ListWriter, NestWriter, PreformattedWriter, QuoteWriter,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Restructure block constructs when they close. When off, the raw
    /// construct calls are passed through as emitted.
    pub rewrite_blocks: bool,
    /// URL schemes the default classifier treats as external media.
    pub external_schemes: Vec<String>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            rewrite_blocks: true,
            external_schemes: DEFAULT_EXTERNAL_SCHEMES.map(String::from).to_vec(),
        }
    }
}

/// The finished instruction stream and what was repaired along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instructions {
    calls: Vec<Call>,
    diagnostics: Vec<Diagnostic>,
}

impl Instructions {
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }

    pub fn into_parts(self) -> (Vec<Call>, Vec<Diagnostic>) {
        (self.calls, self.diagnostics)
    }
}

pub struct Handler {
    writer: CallWriter,
    diagnostics: Diagnostics,
    classifier: Box<dyn ReferenceClassifier>,
    plugins: HashMap<String, Box<dyn SyntaxPlugin>>,
    in_footnote: bool,
    last_pos: usize,
}

impl Handler {
    pub fn new() -> Self {
        Self::with_options(HandlerOptions::default())
    }

    pub fn with_options(options: HandlerOptions) -> Self {
        Self {
            writer: CallWriter::new().with_rewrite(options.rewrite_blocks),
            diagnostics: Diagnostics::new(),
            classifier: Box::new(DefaultClassifier::new(options.external_schemes)),
            plugins: HashMap::new(),
            in_footnote: false,
            last_pos: 0,
        }
    }

    /// Replace the classifier used to tell internal from external media.
    pub fn with_classifier(mut self, classifier: Box<dyn ReferenceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Route `plugin_<name>` events to `plugin`. A plugin registered under
    /// an existing name replaces it.
    pub fn register_plugin(&mut self, plugin: Box<dyn SyntaxPlugin>) {
        let name = plugin.name().to_string();
        log::debug!("registered syntax plugin {name}");
        self.plugins.insert(name, plugin);
    }

    /// Process a lexer event, resolving its mode name first.
    pub fn handle_event(&mut self, event: &LexEvent) -> Result<bool, HandlerError> {
        let construct: Construct = event.mode.parse()?;
        self.dispatch(&construct, &event.text, event.state, event.pos)
    }

    /// Process one match. Returns whether the event was handled; dropped
    /// input is still handled and shows up in the diagnostics.
    pub fn dispatch(
        &mut self,
        construct: &Construct,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        log::trace!("{construct} {state} {text:?} @{pos}");
        self.last_pos = self.last_pos.max(pos);
        match construct {
            Construct::Mode(Mode::Cdata) => {
                self.emit(CallName::Cdata, vec![text.into()], pos);
                Ok(true)
            }
            Construct::Mode(Mode::Eol) => {
                self.emit(CallName::Eol, Vec::new(), pos);
                Ok(true)
            }
            Construct::Mode(Mode::Media) => {
                let params = decode_media_params(text, self.classifier.as_ref());
                self.emit(params.call_name(), params.into_args(), pos);
                Ok(true)
            }
            Construct::Mode(Mode::Table) => self.table(text, state, pos),
            Construct::Mode(Mode::Listblock) => self.listblock(text, state, pos),
            Construct::Mode(Mode::Quote) => self.quote(text, state, pos),
            Construct::Mode(Mode::Preformatted) => self.preformatted(text, state, pos),
            Construct::Mode(Mode::Footnote) => self.footnote(text, state, pos),
            Construct::Plugin(name) => self.plugin(name, text, state, pos),
        }
    }

    /// Append a call to the active frame.
    pub fn emit(&mut self, name: CallName, args: Vec<Value>, pos: usize) {
        self.writer.write_call(Call::new(name, args, pos));
    }

    /// Append a `plugin` call carrying the plugin's data, the lexer state
    /// and the raw match.
    pub fn emit_plugin_call(
        &mut self,
        plugin: &str,
        data: Value,
        state: LexerState,
        pos: usize,
        raw: &str,
    ) {
        self.emit(
            CallName::Plugin,
            vec![plugin.into(), data, state.as_str().into(), raw.into()],
            pos,
        );
    }

    /// The frame calls are currently written to.
    pub fn active_frame(&self) -> FrameId {
        self.writer.active()
    }

    /// Number of open block constructs.
    pub fn depth(&self) -> usize {
        self.writer.depth()
    }

    /// Feed every event, then finish.
    pub fn run<'a>(
        mut self,
        events: impl IntoIterator<Item = &'a LexEvent>,
    ) -> Result<Instructions, HandlerError> {
        for event in events {
            self.handle_event(event)?;
        }
        Ok(self.finish())
    }

    /// Close what is still open and wrap the stream in
    /// `document_start`/`document_end`, the latter at the last event seen.
    pub fn finish(mut self) -> Instructions {
        self.writer.close_all(&mut self.diagnostics);
        self.in_footnote = false;

        let body = self.writer.into_calls();
        let mut calls = Vec::with_capacity(body.len() + 2);
        calls.push(Call::bare(CallName::DocumentStart, 0));
        calls.extend(body);
        calls.push(Call::bare(CallName::DocumentEnd, self.last_pos));

        Instructions {
            calls,
            diagnostics: self.diagnostics.into_vec(),
        }
    }

    fn plugin(
        &mut self,
        name: &str,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| HandlerError::UnknownPlugin(name.to_string()))?;
        match plugin.handle(text, state, pos) {
            Some(data) => {
                self.emit_plugin_call(name, data, state, pos, text);
                Ok(true)
            }
            None => Ok(true),
        }
    }

    fn listblock(
        &mut self,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        match state {
            LexerState::Enter => {
                self.writer.push(Box::new(ListWriter::new()));
                self.emit(CallName::ListOpen, vec![text.into()], pos);
            }
            LexerState::Matched | LexerState::Special => {
                self.writer.expect_active(FrameKind::List, pos)?;
                self.emit(CallName::ListItem, vec![text.into()], pos);
            }
            LexerState::Unmatched => {
                self.writer.expect_active(FrameKind::List, pos)?;
                self.emit(CallName::Cdata, vec![text.into()], pos);
            }
            LexerState::Exit => {
                self.writer.expect_active(FrameKind::List, pos)?;
                self.emit(CallName::ListClose, Vec::new(), pos);
                self.writer
                    .pop_and_flush(FrameKind::List, pos, &mut self.diagnostics)?;
            }
        }
        Ok(true)
    }

    fn quote(
        &mut self,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        match state {
            LexerState::Enter => {
                self.writer.push(Box::new(QuoteWriter::new()));
                self.emit(CallName::QuoteStart, vec![text.into()], pos);
            }
            LexerState::Matched | LexerState::Special => {
                self.writer.expect_active(FrameKind::Quote, pos)?;
                self.emit(CallName::QuoteNewline, vec![text.into()], pos);
            }
            LexerState::Unmatched => {
                self.writer.expect_active(FrameKind::Quote, pos)?;
                self.emit(CallName::Cdata, vec![text.into()], pos);
            }
            LexerState::Exit => {
                self.writer.expect_active(FrameKind::Quote, pos)?;
                self.emit(CallName::QuoteEnd, Vec::new(), pos);
                self.writer
                    .pop_and_flush(FrameKind::Quote, pos, &mut self.diagnostics)?;
            }
        }
        Ok(true)
    }

    fn preformatted(
        &mut self,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        match state {
            LexerState::Enter => {
                self.writer.push(Box::new(PreformattedWriter::new()));
                self.emit(CallName::PreformattedStart, Vec::new(), pos);
            }
            LexerState::Matched | LexerState::Special => {
                self.writer.expect_active(FrameKind::Preformatted, pos)?;
                self.emit(CallName::PreformattedNewline, Vec::new(), pos);
            }
            LexerState::Unmatched => {
                self.writer.expect_active(FrameKind::Preformatted, pos)?;
                self.emit(CallName::PreformattedContent, vec![text.into()], pos);
            }
            LexerState::Exit => {
                self.writer.expect_active(FrameKind::Preformatted, pos)?;
                self.emit(CallName::PreformattedEnd, Vec::new(), pos);
                self.writer
                    .pop_and_flush(FrameKind::Preformatted, pos, &mut self.diagnostics)?;
            }
        }
        Ok(true)
    }

    /// Footnotes do not nest: the first `))` closes the open footnote and
    /// inner markers are kept as text.
    fn footnote(
        &mut self,
        text: &str,
        state: LexerState,
        pos: usize,
    ) -> Result<bool, HandlerError> {
        match state {
            LexerState::Enter if self.in_footnote => {
                self.diagnostics.push(pos, DiagnosticKind::NestedFootnote);
                self.emit(CallName::Cdata, vec![text.into()], pos);
            }
            LexerState::Enter => {
                self.writer.push(Box::new(NestWriter::new(CallName::FootnoteClose)));
                self.emit(CallName::FootnoteOpen, Vec::new(), pos);
                self.in_footnote = true;
            }
            LexerState::Exit if self.in_footnote => {
                self.writer.expect_active(FrameKind::Nest, pos)?;
                self.emit(CallName::FootnoteClose, Vec::new(), pos);
                self.writer
                    .pop_and_flush(FrameKind::Nest, pos, &mut self.diagnostics)?;
                self.in_footnote = false;
            }
            LexerState::Exit | LexerState::Matched | LexerState::Unmatched | LexerState::Special => {
                self.emit(CallName::Cdata, vec![text.into()], pos);
            }
        }
        Ok(true)
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
