//! # wikimark-handler
//!
//! The instruction-building half of a wiki markup parser. A lexer (not part
//! of this crate) reports pattern matches as [`LexEvent`]s; the [`Handler`]
//! turns them into [`Call`]s, the flat instruction stream a renderer walks.
//!
//! ## Architecture Overview
//!
//! ```text
//! LexEvents → Handler → mode procedure → CallWriter → Instructions
//!                                         (frame stack of Rewriters)
//! ```
//!
//! ### 1. Events ([`event`] module)
//!
//! `(mode, text, state, pos)` in document order. The lexer is context free:
//! it knows that `^` opened a table, but not which row or cell it belongs to.
//!
//! ### 2. Handler ([`handler`] module)
//!
//! Routes every event by its mode. Inline modes emit calls directly:
//!
//! ```text
//! media  "{{a.png?20}}"  →  internalmedia("a.png", null, null, 20, null, "cache", "details")
//! ```
//!
//! Block modes (tables, lists, quotes, preformatted, footnotes) push a
//! rewriter on ENTER and emit *raw* calls into it until EXIT.
//!
//! ### 3. Writer stack ([`writer`] module)
//!
//! Calls always go to the top frame. Popping a frame rewrites its buffer
//! into nested structure and writes the result into the frame below:
//!
//! ```text
//! raw:        table_start tableheader cdata tableheader table_row tablecell cdata tablecell table_end
//! rewritten:  table_open tablerow_open tableheader_open cdata tableheader_close tablerow_close ...
//! ```
//!
//! Blocks nest freely (a footnote in a table cell in a list item), since
//! each frame only ever flushes into its parent.
//!
//! ## Recovery
//!
//! Malformed markup never fails a parse. Unknown delimiters, stray
//! whitespace and unresolved spans are repaired and reported as
//! [`Diagnostic`]s. A [`HandlerError`] means the event stream itself broke
//! the lexer contract (an EXIT for a block that was never entered).
//!
//! ## Module Structure
//!
//! ```text
//! wikimark-handler/
//! ├── lib.rs           # This file - public API
//! ├── event.rs         # LexEvent, LexerState
//! ├── call.rs          # Call, CallName, Value, format_calls
//! ├── handler/         # Dispatcher, mode procedures, plugins
//! ├── writer/          # CallWriter stack and the block rewriters
//! ├── media.rs         # Media parameter decoder
//! ├── reference.rs     # External / interwiki classification
//! ├── diagnostics.rs   # Recovery reports
//! └── error.rs         # HandlerError
//! ```

pub mod call;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod handler;
pub mod media;
pub mod reference;
pub mod writer;

pub use call::{Call, CallName, Value, format_calls};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::HandlerError;
pub use event::{LexEvent, LexerState};
pub use handler::{Construct, Handler, HandlerOptions, Instructions, Mode, SyntaxPlugin};
pub use media::{Alignment, Cache, Linking, MediaKind, MediaParams, decode_media_params};
pub use reference::{DefaultClassifier, ReferenceClassifier};
pub use writer::{CallWriter, FrameId, FrameKind, Rewriter};
