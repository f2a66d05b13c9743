//! Nested list rewrite.
//!
//! The list mode only reports markers (`list_open("  *")`, `list_item("    -")`,
//! `list_close()`); indentation decides nesting. The rewriter keeps a stack of
//! open lists and turns each marker into the closes and opens needed to reach
//! its depth.

use crate::{
    call::{Call, CallName, Value},
    diagnostics::Diagnostics,
};

use super::{FrameKind, Rewriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open(self) -> CallName {
        match self {
            ListKind::Unordered => CallName::ListuOpen,
            ListKind::Ordered => CallName::ListoOpen,
        }
    }

    fn close(self) -> CallName {
        match self {
            ListKind::Unordered => CallName::ListuClose,
            ListKind::Ordered => CallName::ListoClose,
        }
    }
}

/// Depth and list type of a marker such as `"\n    *"`.
///
/// Every two spaces of indentation is one level; a tab counts as two spaces.
fn interpret_marker(marker: &str) -> (usize, ListKind) {
    let kind = if marker.ends_with('*') {
        ListKind::Unordered
    } else {
        ListKind::Ordered
    };
    let depth = marker.replace('\t', "  ").matches("  ").count() + 1;
    (depth, kind)
}

#[derive(Debug)]
struct OpenList {
    kind: ListKind,
    depth: usize,
    /// Index of the current item's `listitem_open` in the output.
    item: usize,
}

/// Buffers one list block.
#[derive(Debug, Default)]
pub struct ListWriter {
    calls: Vec<Call>,
}

impl ListWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rewriter for ListWriter {
    fn kind(&self) -> FrameKind {
        FrameKind::List
    }

    fn write_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn last_pos(&self) -> Option<usize> {
        self.calls.last().map(Call::pos)
    }

    fn closing_call(&self, pos: usize) -> Call {
        Call::bare(CallName::ListClose, pos)
    }

    fn process(self: Box<Self>, _diagnostics: &mut Diagnostics) -> Vec<Call> {
        let mut builder = ListBuilder::default();
        for call in self.calls {
            match call.name() {
                CallName::ListOpen => builder.start(&call),
                CallName::ListItem => builder.item(&call),
                CallName::ListClose => builder.end(call.pos()),
                _ => builder.out.push(call),
            }
        }
        builder.out
    }

    fn into_calls(self: Box<Self>) -> Vec<Call> {
        self.calls
    }
}

#[derive(Debug, Default)]
struct ListBuilder {
    out: Vec<Call>,
    stack: Vec<OpenList>,
    initial_depth: usize,
}

impl ListBuilder {
    fn emit(&mut self, name: CallName, pos: usize) {
        self.out.push(Call::bare(name, pos));
    }

    /// Open an item and its content, returning the item's index.
    fn open_item(&mut self, level: usize, pos: usize) -> usize {
        self.out
            .push(Call::new(CallName::ListitemOpen, vec![level.into()], pos));
        let item = self.out.len() - 1;
        self.emit(CallName::ListcontentOpen, pos);
        item
    }

    fn open_list(&mut self, kind: ListKind, depth: usize, pos: usize) {
        self.emit(kind.open(), pos);
        let item = self.open_item(depth.saturating_sub(1).max(1), pos);
        self.stack.push(OpenList { kind, depth, item });
    }

    fn start(&mut self, call: &Call) {
        let (depth, kind) = interpret_marker(call.text().unwrap_or_default());
        self.initial_depth = depth;
        self.open_list(kind, depth, call.pos());
    }

    fn item(&mut self, call: &Call) {
        let pos = call.pos();
        let (depth, kind) = interpret_marker(call.text().unwrap_or_default());
        let depth = depth.max(self.initial_depth);

        let Some((current_depth, current_item)) = self.stack.last().map(|l| (l.depth, l.item))
        else {
            self.open_list(kind, depth, pos);
            return;
        };

        self.emit(CallName::ListcontentClose, pos);
        if depth > current_depth {
            self.mark_node(current_item);
            self.open_list(kind, depth, pos);
            return;
        }

        if depth < current_depth {
            // Close lists until one at or above this depth is on top
            while let Some(top) = self.stack.last() {
                if top.depth <= depth {
                    break;
                }
                let kind = top.kind;
                self.emit(CallName::ListitemClose, pos);
                self.emit(kind.close(), pos);
                self.stack.pop();
            }
        }

        let Some(top) = self.stack.last() else {
            self.open_list(kind, depth, pos);
            return;
        };
        let (top_kind, top_depth) = (top.kind, top.depth);

        self.emit(CallName::ListitemClose, pos);
        if top_kind == kind {
            let item = self.open_item(top_depth.saturating_sub(1).max(1), pos);
            if let Some(top) = self.stack.last_mut() {
                top.item = item;
            }
        } else {
            self.emit(top_kind.close(), pos);
            self.stack.pop();
            self.open_list(kind, top_depth, pos);
        }
    }

    fn end(&mut self, pos: usize) {
        let mut close_content = true;
        while let Some(list) = self.stack.pop() {
            if close_content {
                self.emit(CallName::ListcontentClose, pos);
                close_content = false;
            }
            self.emit(CallName::ListitemClose, pos);
            self.emit(list.kind.close(), pos);
        }
    }

    /// An item holding a nested list is a node rather than a leaf.
    fn mark_node(&mut self, index: usize) {
        if let Some(call) = self.out.get_mut(index) {
            let level = call.arg(0).cloned().unwrap_or(Value::Int(1));
            *call = Call::new(CallName::ListitemOpen, vec![level, Value::Int(1)], call.pos());
        }
    }
}
