use thiserror::Error;

use crate::writer::FrameKind;

/// Conditions that break the lexer/handler contract.
///
/// Malformed markup never ends up here; it is repaired and reported as a
/// [`Diagnostic`](crate::Diagnostic). These errors mean the event stream itself
/// is inconsistent, so the parse is abandoned along with any buffered frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("unknown construct `{0}`")]
    UnknownConstruct(String),

    #[error("no syntax plugin registered as `{0}`")]
    UnknownPlugin(String),

    #[error("{expected} event at byte {pos} but no block frame is open")]
    NoOpenFrame { expected: FrameKind, pos: usize },

    #[error("{expected} event at byte {pos} but the active frame is {found}")]
    MismatchedFrame {
        expected: FrameKind,
        found: FrameKind,
        pos: usize,
    },
}
