mod common;

use common::{ev, table_events};
use pretty_assertions::assert_eq;
use rstest::rstest;
use wikimark_handler::{
    Call, CallName, DiagnosticKind, Handler, HandlerOptions, LexEvent, LexerState, format_calls,
};

fn rewrite(events: &[LexEvent]) -> Vec<Call> {
    Handler::new().run(events).unwrap().into_calls()
}

fn raw(events: &[LexEvent]) -> Vec<Call> {
    Handler::with_options(HandlerOptions {
        rewrite_blocks: false,
        ..HandlerOptions::default()
    })
    .run(events)
    .unwrap()
    .into_calls()
}

/// Every `x_open` is closed by an `x_close` in the right order.
fn assert_balanced(calls: &[Call]) {
    let mut stack: Vec<&str> = Vec::new();
    for call in calls {
        let name = call.name().as_str();
        if let Some(prefix) = name.strip_suffix("_open") {
            stack.push(prefix);
        } else if let Some(prefix) = name.strip_suffix("_close") {
            assert_eq!(stack.pop(), Some(prefix), "unbalanced {name} @{}", call.pos());
        }
        if let Some(nested) = call.args().iter().find_map(|arg| arg.as_calls()) {
            assert_balanced(nested);
        }
    }
    assert!(stack.is_empty(), "left open: {stack:?}");
}

const TABLES: [&str; 6] = [
    "\n^ H1 ^ H2 ^\n| a  |  b |\n",
    "\n| a | b |\n| ::: | c |\n",
    "\n^ h | x ||\n",
    "\n| ::: | ::: |\n|||\n| x\n",
    "\n^ a ^ b ^ c ^\n^ d | e | f |\n|  g  | h | i |\n| j |\n",
    "\n|\t:::\t| x | y |\n^ ::: ^ z |\n",
];

#[test]
fn table_with_row_span() {
    let calls = rewrite(&table_events("\n| a | b |\n| ::: | c |\n", 0));

    insta::assert_snapshot!(format_calls(&calls), @r#"
    document_start() @0
    table_open(2, 2, 1) @0
    tablerow_open() @0
    tablecell_open(1, null, 2) @0
    cdata(" a ") @2
    tablecell_close() @5
    tablecell_open(1, null, 1) @5
    cdata(" b ") @6
    tablecell_close() @9
    tablerow_close() @10
    tablerow_open() @10
    tablecell_open(1, null, 1) @17
    cdata(" c ") @18
    tablecell_close() @21
    tablerow_close() @22
    table_close(22) @22
    document_end() @22
    "#);
}

#[test]
fn table_with_column_span() {
    let calls = rewrite(&table_events("\n^ h | x ||\n", 0));

    insta::assert_snapshot!(format_calls(&calls), @r#"
    document_start() @0
    table_open(3, 1, 1) @0
    tablerow_open() @0
    tableheader_open(1, null, 1) @0
    cdata(" h ") @2
    tableheader_close() @5
    tablecell_open(2, null, 1) @5
    cdata(" x ") @6
    tablecell_close() @9
    tablerow_close() @11
    table_close(11) @11
    document_end() @11
    "#);
}

#[rstest]
fn raw_table_stream_is_delimited(#[values(0, 1, 2, 3, 4, 5)] index: usize) {
    let calls = raw(&table_events(TABLES[index], 0));
    let position = |name: CallName| calls.iter().position(|call| call.is(name));

    let starts = calls.iter().filter(|call| call.is(CallName::TableStart)).count();
    let ends = calls.iter().filter(|call| call.is(CallName::TableEnd)).count();
    assert_eq!((starts, ends), (1, 1));

    let start = position(CallName::TableStart).unwrap();
    let end = position(CallName::TableEnd).unwrap();
    assert!(start < end);

    for (i, call) in calls.iter().enumerate() {
        if call.is(CallName::Tablecell) || call.is(CallName::Tableheader) {
            assert!(start < i && i < end, "cell outside the table at index {i}");
        }
    }
}

#[rstest]
fn rewritten_table_is_well_nested(#[values(0, 1, 2, 3, 4, 5)] index: usize) {
    let calls = rewrite(&table_events(TABLES[index], 0));

    assert_balanced(&calls);
    for name in [
        CallName::TableStart,
        CallName::TableRow,
        CallName::Tablecell,
        CallName::Tableheader,
        CallName::TableAlign,
        CallName::Rowspan,
        CallName::TableEnd,
    ] {
        assert!(!calls.iter().any(|call| call.is(name)), "raw {name} left over");
    }
}

#[rstest]
fn rows_fit_the_table_width(#[values(0, 1, 2, 3, 4, 5)] index: usize) {
    let calls = rewrite(&table_events(TABLES[index], 0));
    let columns = calls[1].arg(0).and_then(|v| v.as_int()).unwrap();

    // Row width counts colspans; continued cells are covered by the row above
    let mut widths = Vec::new();
    let mut width = 0;
    for call in &calls {
        match call.name() {
            CallName::TablerowOpen => width = 0,
            CallName::TablecellOpen | CallName::TableheaderOpen => {
                width += call.arg(0).and_then(|v| v.as_int()).unwrap();
            }
            CallName::TablerowClose => widths.push(width),
            _ => {}
        }
    }
    assert!(widths.iter().all(|&w| w <= columns));
}

#[test]
fn whitespace_between_delimiters_never_becomes_text() {
    let events = vec![
        ev("table", "\n|", LexerState::Enter, 0),
        ev("table", "   ", LexerState::Unmatched, 2),
        ev("table", "|", LexerState::Matched, 5),
        ev("table", "x", LexerState::Unmatched, 6),
        ev("table", "|", LexerState::Matched, 7),
        ev("table", "\n", LexerState::Exit, 8),
    ];
    let instructions = Handler::with_options(HandlerOptions {
        rewrite_blocks: false,
        ..HandlerOptions::default()
    })
    .run(&events)
    .unwrap();

    let texts: Vec<_> = instructions.calls().iter().filter_map(Call::text).collect();
    assert_eq!(texts, vec!["x"]);
    assert_eq!(
        instructions.diagnostics()[0].kind,
        DiagnosticKind::DroppedWhitespace {
            mode: wikimark_handler::Mode::Table
        }
    );
}

#[test]
fn table_inside_a_footnote_is_captured() {
    let mut events = vec![
        ev("cdata", "see", LexerState::Unmatched, 0),
        ev("footnote", "((", LexerState::Enter, 3),
        ev("footnote", "note ", LexerState::Unmatched, 5),
    ];
    events.extend(table_events("\n| a |\n", 10));
    events.push(ev("footnote", "))", LexerState::Exit, 17));

    let calls = rewrite(&events);

    insta::assert_snapshot!(format_calls(&calls), @r#"
    document_start() @0
    cdata("see") @0
    nest(<10 calls>) @3
      footnote_open() @3
      cdata("note ") @5
      table_open(1, 1, 11) @10
      tablerow_open() @10
      tablecell_open(1, null, 1) @10
      cdata(" a ") @12
      tablecell_close() @15
      tablerow_close() @16
      table_close(16) @16
      footnote_close() @17
    document_end() @17
    "#);
    assert_balanced(&calls);
}

#[test]
fn list_with_nesting_and_type_switch() {
    let calls = rewrite(&[
        ev("listblock", "\n  *", LexerState::Enter, 0),
        ev("listblock", " one", LexerState::Unmatched, 4),
        ev("listblock", "\n    *", LexerState::Matched, 8),
        ev("listblock", " two", LexerState::Unmatched, 14),
        ev("listblock", "\n  -", LexerState::Matched, 18),
        ev("listblock", " three", LexerState::Unmatched, 22),
        ev("listblock", "\n", LexerState::Exit, 28),
    ]);

    insta::assert_snapshot!(format_calls(&calls), @r#"
    document_start() @0
    listu_open() @0
    listitem_open(1, 1) @0
    listcontent_open() @0
    cdata(" one") @4
    listcontent_close() @8
    listu_open() @8
    listitem_open(2) @8
    listcontent_open() @8
    cdata(" two") @14
    listcontent_close() @18
    listitem_close() @18
    listu_close() @18
    listitem_close() @18
    listu_close() @18
    listo_open() @18
    listitem_open(1) @18
    listcontent_open() @18
    cdata(" three") @22
    listcontent_close() @28
    listitem_close() @28
    listo_close() @28
    document_end() @28
    "#);
    assert_balanced(&calls);
}

#[test]
fn raw_list_stream_passes_through_unchanged() {
    let calls = raw(&[
        ev("listblock", "\n  *", LexerState::Enter, 0),
        ev("listblock", " one", LexerState::Unmatched, 4),
        ev("listblock", "\n", LexerState::Exit, 8),
    ]);

    assert_eq!(
        calls,
        vec![
            Call::bare(CallName::DocumentStart, 0),
            Call::new(CallName::ListOpen, vec!["\n  *".into()], 0),
            Call::cdata(" one", 4),
            Call::bare(CallName::ListClose, 8),
            Call::bare(CallName::DocumentEnd, 8),
        ]
    );
}

#[test]
fn quote_holding_preformatted_text() {
    let calls = rewrite(&[
        ev("quote", "\n>", LexerState::Enter, 0),
        ev("quote", " quoted", LexerState::Unmatched, 2),
        ev("quote", "\n>>", LexerState::Matched, 9),
        ev("quote", " deeper", LexerState::Unmatched, 12),
        ev("quote", "\n", LexerState::Exit, 19),
        ev("preformatted", "\n  ", LexerState::Enter, 19),
        ev("preformatted", "code", LexerState::Unmatched, 22),
        ev("preformatted", "\n", LexerState::Exit, 26),
    ]);

    insta::assert_snapshot!(format_calls(&calls), @r#"
    document_start() @0
    quote_open() @0
    cdata(" quoted") @2
    quote_open() @9
    cdata(" deeper") @12
    quote_close() @19
    quote_close() @19
    preformatted("code") @19
    eol() @19
    eol() @19
    document_end() @26
    "#);
}

#[test]
fn balanced_constructs_restore_the_active_frame() {
    let mut handler = Handler::new();
    let base = handler.active_frame();

    handler
        .handle_event(&ev("listblock", "\n  *", LexerState::Enter, 0))
        .unwrap();
    let list = handler.active_frame();
    assert_ne!(list, base);

    handler
        .handle_event(&ev("footnote", "((", LexerState::Enter, 4))
        .unwrap();
    let footnote = handler.active_frame();
    assert_ne!(footnote, list);

    for event in table_events("\n| x |\n", 6) {
        handler.handle_event(&event).unwrap();
    }
    assert_eq!(handler.active_frame(), footnote);

    handler
        .handle_event(&ev("footnote", "))", LexerState::Exit, 13))
        .unwrap();
    assert_eq!(handler.active_frame(), list);

    handler
        .handle_event(&ev("listblock", "\n", LexerState::Exit, 15))
        .unwrap();
    assert_eq!(handler.active_frame(), base);

    let instructions = handler.finish();
    assert!(instructions.diagnostics().is_empty());
    assert_balanced(instructions.calls());
}

#[test]
fn instructions_serialize_to_json() {
    let instructions = Handler::new()
        .run(&[ev("cdata", "hi", LexerState::Unmatched, 0)])
        .unwrap();

    let json = serde_json::to_value(&instructions).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "calls": [
                {"name": "document_start", "args": [], "pos": 0},
                {"name": "cdata", "args": ["hi"], "pos": 0},
                {"name": "document_end", "args": [], "pos": 0}
            ],
            "diagnostics": []
        })
    );
}
