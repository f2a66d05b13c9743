//! # Table Rewriter
//!
//! The table mode emits a flat stream of raw delimiter calls:
//!
//! ```text
//! table_start(1) tableheader cdata(" a ") tableheader table_row tablecell
//! table_align("  ") cdata("b") cdata(" ") tablecell table_end(12)
//! ```
//!
//! Every row ends with a delimiter, so the cell opened by the last `|` or `^`
//! of a row is not a real cell. On close the rewriter collects the stream
//! into rows of [`Slot`]s, resolves spans and alignment on that model, and
//! emits balanced structure:
//!
//! ```text
//! table_open(cols, rows, start)
//!   [tablethead_open]
//!   tablerow_open
//!     tableheader_open(colspan, align, rowspan) ... tableheader_close
//!   tablerow_close
//!   [tablethead_close]
//! table_close(end)
//! ```

use crate::{
    call::{Call, CallName, Value},
    diagnostics::{DiagnosticKind, Diagnostics},
    media::Alignment,
};

use super::{FrameKind, Rewriter};

/// Buffers the raw calls of one table.
#[derive(Debug, Default)]
pub struct TableWriter {
    calls: Vec<Call>,
}

impl TableWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rewriter for TableWriter {
    fn kind(&self) -> FrameKind {
        FrameKind::Table
    }

    fn write_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn last_pos(&self) -> Option<usize> {
        self.calls.last().map(Call::pos)
    }

    fn closing_call(&self, pos: usize) -> Call {
        Call::new(CallName::TableEnd, vec![pos.into()], pos)
    }

    fn process(self: Box<Self>, diagnostics: &mut Diagnostics) -> Vec<Call> {
        let mut table = Table::collect(self.calls, diagnostics);
        table.resolve(diagnostics);
        table.into_calls()
    }

    fn into_calls(self: Box<Self>) -> Vec<Call> {
        self.calls
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Data,
    Header,
}

impl CellKind {
    fn from_call(name: CallName) -> Option<Self> {
        match name {
            CallName::Tablecell => Some(CellKind::Data),
            CallName::Tableheader => Some(CellKind::Header),
            _ => None,
        }
    }

    fn open(self) -> CallName {
        match self {
            CellKind::Data => CallName::TablecellOpen,
            CellKind::Header => CallName::TableheaderOpen,
        }
    }

    fn close(self) -> CallName {
        match self {
            CellKind::Data => CallName::TablecellClose,
            CellKind::Header => CallName::TableheaderClose,
        }
    }
}

#[derive(Debug)]
struct Cell {
    kind: CellKind,
    open_pos: usize,
    close_pos: usize,
    colspan: usize,
    rowspan: usize,
    align: Option<Alignment>,
    content: Vec<Call>,
}

impl Cell {
    fn new(kind: CellKind, pos: usize) -> Self {
        Self {
            kind,
            open_pos: pos,
            close_pos: pos,
            colspan: 1,
            rowspan: 1,
            align: None,
            content: Vec::new(),
        }
    }

    fn starts_with(&self, name: CallName) -> bool {
        self.content.first().is_some_and(|call| call.is(name))
    }

    /// Leading padding aligns right, trailing aligns left, both center.
    /// Padding is kept as text.
    fn resolve_alignment(&mut self) {
        let leading = self.starts_with(CallName::TableAlign);
        let trailing = self
            .content
            .last()
            .is_some_and(|call| call.is(CallName::TableAlign));

        self.align = match (leading, trailing) {
            (true, _) if self.content.len() == 1 => Some(Alignment::Left),
            (true, true) => Some(Alignment::Center),
            (true, false) => Some(Alignment::Right),
            (false, true) => Some(Alignment::Left),
            (false, false) => None,
        };

        for call in &mut self.content {
            if call.is(CallName::TableAlign) {
                *call = call.renamed(CallName::Cdata);
            }
        }
    }

    fn merge_cdata(&mut self) {
        let mut merged: Vec<Call> = Vec::with_capacity(self.content.len());
        for call in self.content.drain(..) {
            match merged.last_mut() {
                Some(last) if last.is(CallName::Cdata) && call.is(CallName::Cdata) => {
                    let text = format!(
                        "{}{}",
                        last.text().unwrap_or_default(),
                        call.text().unwrap_or_default()
                    );
                    *last = Call::cdata(text, last.pos());
                }
                _ => merged.push(call),
            }
        }
        self.content = merged;
    }

    fn emit(self, out: &mut Vec<Call>) {
        let align = self.align.map(|a| Value::from(a.as_str()));
        out.push(Call::new(
            self.kind.open(),
            vec![
                self.colspan.into(),
                align.unwrap_or(Value::Null),
                self.rowspan.into(),
            ],
            self.open_pos,
        ));
        out.extend(self.content);
        out.push(Call::bare(self.kind.close(), self.close_pos));
    }
}

/// One column position in a row.
#[derive(Debug)]
enum Slot {
    Cell(Cell),
    /// An empty cell folded into the cell on its left.
    Span(CellKind),
    /// A `:::` cell absorbed by the cell above it.
    Continued,
}

impl Slot {
    fn kind(&self) -> Option<CellKind> {
        match self {
            Slot::Cell(cell) => Some(cell.kind),
            Slot::Span(kind) => Some(*kind),
            Slot::Continued => None,
        }
    }
}

#[derive(Debug)]
struct Row {
    open_pos: usize,
    close_pos: usize,
    slots: Vec<Slot>,
}

impl Row {
    fn new(pos: usize) -> Self {
        Self {
            open_pos: pos,
            close_pos: pos,
            slots: Vec::new(),
        }
    }

    fn current_cell(&mut self) -> Option<&mut Cell> {
        match self.slots.last_mut() {
            Some(Slot::Cell(cell)) => Some(cell),
            _ => None,
        }
    }

    fn open_cell(&mut self, kind: CellKind, pos: usize) {
        let has_left = self.slots.len() > 1;
        if let Some(Slot::Cell(last)) = self.slots.last_mut() {
            last.close_pos = pos;
            if last.content.is_empty() && has_left {
                let span = Slot::Span(last.kind);
                if let Some(slot) = self.slots.last_mut() {
                    *slot = span;
                }
            }
        }
        self.slots.push(Slot::Cell(Cell::new(kind, pos)));
    }

    /// Drop the cell opened by the row's final delimiter.
    fn close(&mut self, pos: usize, diagnostics: &mut Diagnostics) {
        self.close_pos = pos;
        if let Some(Slot::Cell(trailing)) = self.slots.pop() {
            let significant = trailing
                .content
                .iter()
                .filter(|call| {
                    !(call.is(CallName::Cdata)
                        && call.text().is_some_and(|t| t.trim().is_empty()))
                })
                .count();
            if significant > 0 {
                diagnostics.push(
                    trailing.open_pos,
                    DiagnosticKind::DiscardedTrailingContent {
                        calls: trailing.content.len(),
                    },
                );
            }
        }
    }

    fn counts(&self) -> (usize, usize) {
        self.slots
            .iter()
            .filter_map(Slot::kind)
            .fold((0, 0), |(data, header), kind| match kind {
                CellKind::Data => (data + 1, header),
                CellKind::Header => (data, header + 1),
            })
    }

    /// A row belongs to the head when it is mostly header cells.
    fn is_header_row(&self) -> bool {
        let (data, header) = self.counts();
        header > 0 && data <= 2 && 2 * data <= header
    }

    fn fold_spans(&mut self) {
        for i in 0..self.slots.len() {
            if !matches!(self.slots[i], Slot::Span(_)) {
                continue;
            }
            let left = self.slots[..i]
                .iter_mut()
                .rev()
                .find_map(|slot| match slot {
                    Slot::Cell(cell) => Some(cell),
                    _ => None,
                });
            if let Some(cell) = left {
                cell.colspan += 1;
            }
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    /// Calls that arrived before any cell was open.
    leading: Vec<Call>,
    start: Option<(usize, Value)>,
    end: Option<(usize, Value)>,
    rows: Vec<Row>,
    head_rows: usize,
}

impl Table {
    fn collect(calls: Vec<Call>, diagnostics: &mut Diagnostics) -> Self {
        let mut table = Table::default();
        let mut row: Option<Row> = None;
        let mut last_pos = 0;

        for call in calls {
            let pos = call.pos();
            last_pos = pos;
            match call.name() {
                CallName::TableStart => {
                    let start = call.into_args().into_iter().next();
                    table.start = Some((pos, start.unwrap_or(Value::Int(pos + 1))));
                    row = Some(Row::new(pos));
                }
                CallName::TableRow => {
                    if let Some(mut done) = row.take() {
                        done.close(pos, diagnostics);
                        table.rows.push(done);
                    }
                    row = Some(Row::new(pos));
                }
                CallName::TableEnd => {
                    if let Some(mut done) = row.take() {
                        done.close(pos, diagnostics);
                        table.rows.push(done);
                    }
                    let end = call.into_args().into_iter().next();
                    table.end = Some((pos, end.unwrap_or(Value::Int(pos))));
                }
                name => match CellKind::from_call(name) {
                    Some(kind) => row
                        .get_or_insert_with(|| Row::new(pos))
                        .open_cell(kind, pos),
                    None => match row.as_mut().and_then(Row::current_cell) {
                        Some(cell) => cell.content.push(call),
                        None => table.leading.push(call),
                    },
                },
            }
        }

        if let Some(mut done) = row.take() {
            done.close(last_pos, diagnostics);
            table.rows.push(done);
        }
        table
    }

    fn resolve(&mut self, diagnostics: &mut Diagnostics) {
        for row in &mut self.rows {
            row.fold_spans();
        }

        self.head_rows = self
            .rows
            .iter()
            .take_while(|row| row.is_header_row())
            .count();
        // A table that is all head has no head.
        if self.head_rows == self.rows.len() {
            self.head_rows = 0;
        }

        for row in &mut self.rows {
            for slot in &mut row.slots {
                if let Slot::Cell(cell) = slot {
                    cell.resolve_alignment();
                }
            }
        }

        for r in 0..self.rows.len() {
            for c in 0..self.rows[r].slots.len() {
                self.resolve_rowspan(r, c, diagnostics);
            }
        }

        let columns = self.columns();
        for row in &mut self.rows {
            while row.slots.len() < columns {
                let mut pad = Cell::new(CellKind::Data, row.close_pos);
                pad.close_pos = row.close_pos;
                row.slots.push(Slot::Cell(pad));
            }
            for slot in &mut row.slots {
                if let Slot::Cell(cell) = slot {
                    cell.merge_cdata();
                }
            }
        }
    }

    fn resolve_rowspan(&mut self, r: usize, c: usize, diagnostics: &mut Diagnostics) {
        let (above, rest) = self.rows.split_at_mut(r);
        let Some(Slot::Cell(cell)) = rest[0].slots.get_mut(c) else {
            return;
        };

        if !cell.starts_with(CallName::Rowspan) {
            // Mixed with other content, the marker is just text.
            for call in &mut cell.content {
                if call.is(CallName::Rowspan) {
                    *call = call.renamed(CallName::Cdata);
                }
            }
            return;
        }

        // Spans never reach from the body into the head.
        let floor = if self.head_rows > 0 && r >= self.head_rows {
            self.head_rows
        } else {
            0
        };

        let mut spanning = None;
        for i in (floor..r).rev() {
            match above[i].slots.get(c) {
                Some(Slot::Continued) => continue,
                Some(Slot::Cell(upper)) if upper.rowspan >= r - i => {
                    spanning = Some(i);
                    break;
                }
                _ => break,
            }
        }

        match spanning {
            Some(i) => {
                if let Some(Slot::Cell(upper)) = above[i].slots.get_mut(c) {
                    upper.rowspan += 1;
                }
                rest[0].slots[c] = Slot::Continued;
            }
            None => {
                let pos = cell.content[0].pos();
                diagnostics.push(pos, DiagnosticKind::UnresolvedRowspan);
                cell.content[0] = Call::cdata("", pos);
                for call in &mut cell.content[1..] {
                    if call.is(CallName::Rowspan) {
                        *call = call.renamed(CallName::Cdata);
                    }
                }
            }
        }
    }

    fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.slots.len())
            .max()
            .unwrap_or(0)
    }

    fn into_calls(self) -> Vec<Call> {
        let columns = self.columns();
        let row_count = self.rows.len();
        let (open_pos, start) = self.start.unwrap_or((0, Value::Int(1)));
        let close_pos = self
            .end
            .as_ref()
            .map(|(pos, _)| *pos)
            .or_else(|| self.rows.last().map(|row| row.close_pos))
            .unwrap_or(open_pos);
        let end = self
            .end
            .map(|(_, value)| value)
            .unwrap_or(Value::Int(close_pos));

        let mut out = self.leading;
        out.push(Call::new(
            CallName::TableOpen,
            vec![columns.into(), row_count.into(), start],
            open_pos,
        ));
        if self.head_rows > 0 {
            out.push(Call::bare(CallName::TabletheadOpen, open_pos));
        }

        for (index, row) in self.rows.into_iter().enumerate() {
            out.push(Call::bare(CallName::TablerowOpen, row.open_pos));
            for slot in row.slots {
                if let Slot::Cell(cell) = slot {
                    cell.emit(&mut out);
                }
            }
            out.push(Call::bare(CallName::TablerowClose, row.close_pos));
            if index + 1 == self.head_rows {
                out.push(Call::bare(CallName::TabletheadClose, row.close_pos));
            }
        }

        out.push(Call::new(CallName::TableClose, vec![end], close_pos));
        out
    }
}
