//! # Calls
//!
//! A [`Call`] is one renderer instruction: a [`CallName`], its ordered
//! arguments and the byte position that produced it. Calls are created once
//! and never edited; rewriters build new calls from old ones.
//!
//! The instruction stream handed to the renderer is a plain `Vec<Call>`.

use std::fmt;

use serde::{Serialize, Serializer};

/// Every instruction name the handler can emit.
///
/// Raw names (`table_start`, `list_item`, ...) are what mode procedures emit
/// into a block frame; structural names (`table_open`, `listitem_open`, ...)
/// are what the frame's rewrite produces when the block closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallName {
    DocumentStart,
    DocumentEnd,
    Cdata,
    Eol,
    Linebreak,
    Nest,
    Plugin,
    InternalMedia,
    ExternalMedia,

    FootnoteOpen,
    FootnoteClose,

    // Raw table calls
    TableStart,
    TableEnd,
    TableRow,
    Tablecell,
    Tableheader,
    TableAlign,
    Rowspan,

    // Rewritten table calls
    TableOpen,
    TableClose,
    TabletheadOpen,
    TabletheadClose,
    TablerowOpen,
    TablerowClose,
    TablecellOpen,
    TablecellClose,
    TableheaderOpen,
    TableheaderClose,

    // Raw list calls
    ListOpen,
    ListItem,
    ListClose,

    // Rewritten list calls
    ListuOpen,
    ListuClose,
    ListoOpen,
    ListoClose,
    ListitemOpen,
    ListitemClose,
    ListcontentOpen,
    ListcontentClose,

    QuoteStart,
    QuoteNewline,
    QuoteEnd,
    QuoteOpen,
    QuoteClose,

    PreformattedStart,
    PreformattedNewline,
    PreformattedContent,
    PreformattedEnd,
    Preformatted,
}

impl CallName {
    /// The identifier the renderer dispatches on.
    pub fn as_str(self) -> &'static str {
        match self {
            CallName::DocumentStart => "document_start",
            CallName::DocumentEnd => "document_end",
            CallName::Cdata => "cdata",
            CallName::Eol => "eol",
            CallName::Linebreak => "linebreak",
            CallName::Nest => "nest",
            CallName::Plugin => "plugin",
            CallName::InternalMedia => "internalmedia",
            CallName::ExternalMedia => "externalmedia",
            CallName::FootnoteOpen => "footnote_open",
            CallName::FootnoteClose => "footnote_close",
            CallName::TableStart => "table_start",
            CallName::TableEnd => "table_end",
            CallName::TableRow => "table_row",
            CallName::Tablecell => "tablecell",
            CallName::Tableheader => "tableheader",
            CallName::TableAlign => "table_align",
            CallName::Rowspan => "rowspan",
            CallName::TableOpen => "table_open",
            CallName::TableClose => "table_close",
            CallName::TabletheadOpen => "tablethead_open",
            CallName::TabletheadClose => "tablethead_close",
            CallName::TablerowOpen => "tablerow_open",
            CallName::TablerowClose => "tablerow_close",
            CallName::TablecellOpen => "tablecell_open",
            CallName::TablecellClose => "tablecell_close",
            CallName::TableheaderOpen => "tableheader_open",
            CallName::TableheaderClose => "tableheader_close",
            CallName::ListOpen => "list_open",
            CallName::ListItem => "list_item",
            CallName::ListClose => "list_close",
            CallName::ListuOpen => "listu_open",
            CallName::ListuClose => "listu_close",
            CallName::ListoOpen => "listo_open",
            CallName::ListoClose => "listo_close",
            CallName::ListitemOpen => "listitem_open",
            CallName::ListitemClose => "listitem_close",
            CallName::ListcontentOpen => "listcontent_open",
            CallName::ListcontentClose => "listcontent_close",
            CallName::QuoteStart => "quote_start",
            CallName::QuoteNewline => "quote_newline",
            CallName::QuoteEnd => "quote_end",
            CallName::QuoteOpen => "quote_open",
            CallName::QuoteClose => "quote_close",
            CallName::PreformattedStart => "preformatted_start",
            CallName::PreformattedNewline => "preformatted_newline",
            CallName::PreformattedContent => "preformatted_content",
            CallName::PreformattedEnd => "preformatted_end",
            CallName::Preformatted => "preformatted",
        }
    }
}

impl fmt::Display for CallName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(usize),
    Str(String),
    /// A captured instruction sub-stream (see [`CallName::Nest`]).
    Calls(Vec<Call>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<usize> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_calls(&self) -> Option<&[Call]> {
        match self {
            Value::Calls(calls) => Some(calls),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n)
    }
}

impl From<Vec<Call>> for Value {
    fn from(calls: Vec<Call>) -> Self {
        Value::Calls(calls)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Calls(calls) => write!(f, "<{} calls>", calls.len()),
        }
    }
}

/// One renderer instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    name: CallName,
    args: Vec<Value>,
    pos: usize,
}

impl Call {
    pub fn new(name: CallName, args: Vec<Value>, pos: usize) -> Self {
        Self { name, args, pos }
    }

    /// A call without arguments.
    pub fn bare(name: CallName, pos: usize) -> Self {
        Self::new(name, Vec::new(), pos)
    }

    pub fn cdata(text: impl Into<String>, pos: usize) -> Self {
        Self::new(CallName::Cdata, vec![Value::Str(text.into())], pos)
    }

    pub fn name(&self) -> CallName {
        self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The first argument as text, for `cdata` and the raw block markers.
    pub fn text(&self) -> Option<&str> {
        self.arg(0).and_then(Value::as_str)
    }

    pub fn is(&self, name: CallName) -> bool {
        self.name == name
    }

    /// Rebuild this call under another name, keeping arguments and position.
    pub fn renamed(&self, name: CallName) -> Self {
        Self::new(name, self.args.clone(), self.pos)
    }

    pub fn into_args(self) -> Vec<Value> {
        self.args
    }
}

/// Formats an instruction stream one call per line.
///
/// ```text
/// table_open(2, 1, 1) @0
/// nest(<3 calls>) @9
///   footnote_open() @9
/// ```
///
/// Nested call lists are expanded below their owner, indented by two spaces.
pub fn format_calls(calls: &[Call]) -> String {
    let mut out = String::new();
    write_calls(&mut out, calls, 0);
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn write_calls(out: &mut String, calls: &[Call], depth: usize) {
    for call in calls {
        let args = call
            .args()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{}{}({}) @{}\n",
            "  ".repeat(depth),
            call.name(),
            args,
            call.pos()
        ));
        for arg in call.args() {
            if let Value::Calls(nested) = arg {
                write_calls(out, nested, depth + 1);
            }
        }
    }
}
