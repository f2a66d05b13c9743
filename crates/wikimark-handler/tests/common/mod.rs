// Test helpers shared by the integration tests. Not every test file uses
// every helper.
#![allow(dead_code)]

use wikimark_handler::{LexEvent, LexerState};

/// Scans table markup into the events a table lexer mode would report.
///
/// `markup` starts at the newline before the first row and ends with the
/// newline after the last row: `"\n^ a ^\n| b |\n"`. Positions start at
/// `offset`.
pub fn table_events(markup: &str, offset: usize) -> Vec<LexEvent> {
    let bytes = markup.as_bytes();
    let mut events = Vec::new();
    let event = |text: &str, state, pos: usize| LexEvent::new("table", text, state, offset + pos);

    events.push(event(&markup[..2], LexerState::Enter, 0));
    let mut i = 2;
    while i < bytes.len() {
        let rest = &markup[i..];
        let len = if rest.starts_with("\n|") || rest.starts_with("\n^") {
            events.push(event(&rest[..2], LexerState::Matched, i));
            2
        } else if rest.starts_with('\n') {
            events.push(event("\n", LexerState::Exit, i));
            break;
        } else if rest.starts_with('|') || rest.starts_with('^') {
            events.push(event(&rest[..1], LexerState::Matched, i));
            1
        } else if rest.starts_with([' ', '\t', ':']) {
            // Padding around a `:::` belongs to the row span marker
            let lead = blank_run(rest);
            let run = if rest[lead..].starts_with(":::") {
                lead + 3 + blank_run(&rest[lead + 3..])
            } else {
                lead
            };
            if run == 0 {
                events.push(event(":", LexerState::Unmatched, i));
                1
            } else {
                events.push(event(&rest[..run], LexerState::Matched, i));
                run
            }
        } else {
            let run = rest
                .char_indices()
                .skip(1)
                .find(|&(_, c)| matches!(c, '\n' | '|' | '^' | ' ' | '\t' | ':'))
                .map_or(rest.len(), |(n, _)| n);
            events.push(event(&rest[..run], LexerState::Unmatched, i));
            run
        };
        i += len;
    }
    events
}

fn blank_run(text: &str) -> usize {
    text.len() - text.trim_start_matches([' ', '\t']).len()
}

/// An event for any mode.
pub fn ev(mode: &str, text: &str, state: LexerState, pos: usize) -> LexEvent {
    LexEvent::new(mode, text, state, pos)
}
