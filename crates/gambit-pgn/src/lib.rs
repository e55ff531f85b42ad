//! PGN (Portable Game Notation) parsing and serialization.
//!
//! This crate provides:
//! - [`Tags`] - the ordered tag-pair section with the seven-tag roster
//! - [`Movetext`] - a tree of moves, comments, NAGs, and recursive
//!   variations, with a resilient parser that collects [`Diagnostic`]s
//!   instead of failing on malformed input
//! - [`PgnGame`] - a full game codec bridging PGN text and
//!   [`gambit_engine::Game`]
//!
//! The movetext parser is deliberately forgiving: chess software emits a
//! lot of slightly broken PGN, and a reader that stops at the first stray
//! brace is useless in practice. Anything structurally salvageable parses;
//! problems surface as warnings and errors carrying line and column.

mod game;
mod lexer;
mod movetext;
mod tags;

use thiserror::Error;

pub use game::PgnGame;
pub use lexer::{Diagnostic, DiagnosticLevel};
pub use movetext::{GameTermination, MoveNode, Movetext};
pub use tags::Tags;

/// Errors surfaced at the PGN boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// The tag-pair section is malformed.
    #[error("invalid PGN header: {0}")]
    InvalidPgn(String),

    /// A '{' comment was never closed (strict parsing only; the resilient
    /// parser reports this as a diagnostic).
    #[error("unclosed '{{' in movetext")]
    UnclosedBrace,

    /// A variation parenthesis has no match (strict parsing only; the
    /// resilient parser reports this as a diagnostic).
    #[error("unmatched parenthesis in movetext")]
    UnmatchedParen,

    /// A movetext token could not be resolved to a legal move, or the
    /// resolved move failed to execute.
    #[error("invalid move '{0}'")]
    InvalidMove(String),

    /// The FEN tag of a game could not be parsed.
    #[error(transparent)]
    Fen(#[from] gambit_core::FenError),
}
