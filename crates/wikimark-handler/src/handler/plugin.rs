use crate::{call::Value, event::LexerState};

/// Handles the events of a `plugin_<name>` lexer mode.
///
/// Whatever [`handle`](SyntaxPlugin::handle) returns becomes the data of a
/// `plugin` call: `plugin(name, data, state, match)`. Returning `None`
/// emits nothing.
pub trait SyntaxPlugin {
    fn name(&self) -> &str;

    fn handle(&mut self, text: &str, state: LexerState, pos: usize) -> Option<Value>;
}
