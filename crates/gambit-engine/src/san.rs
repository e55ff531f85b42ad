//! Algebraic notation parsing and generation.
//!
//! A notation token on its own does not name a move; it has to be resolved
//! against the position it was written for. [`parse_move`] accepts short
//! algebraic ("Nf3", "exd5", "Nbd2"), long algebraic ("e2e4", "Ng1-f3"),
//! castling ("O-O", "0-0-0"), and promotion with or without '=' ("e8=Q",
//! "d8Q"), and returns the one legal move the token can mean together with
//! its promotion choice. [`move_to_san`] is the inverse, with minimal
//! disambiguation and check/checkmate suffixes.

use crate::movegen::{apply_move, generate_moves, is_promotion};
use crate::Position;
use gambit_core::{CastleSide, File, Move, PieceKind, Rank, Square};
use thiserror::Error;

/// Error raised when a notation token cannot be resolved to exactly one
/// legal move.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("cannot resolve move '{0}'")]
    InvalidMove(String),
}

/// Resolves a notation token against a position.
///
/// Returns the matching legal move and the promotion choice the token
/// carried, if any. Fails when the token is malformed, matches no legal
/// move, or matches more than one.
pub fn parse_move(
    position: &Position,
    token: &str,
) -> Result<(Move, Option<PieceKind>), SanError> {
    let invalid = || SanError::InvalidMove(token.to_string());

    // Annotations first, then mate, then check.
    let body = token.trim();
    let body = body.trim_end_matches(['!', '?']);
    let body = body.strip_suffix('#').unwrap_or(body);
    let body = body.strip_suffix('+').unwrap_or(body);
    if body.is_empty() {
        return Err(invalid());
    }

    match body {
        "O-O" | "0-0" => return resolve_castle(position, CastleSide::Kingside).ok_or_else(invalid),
        "O-O-O" | "0-0-0" => {
            return resolve_castle(position, CastleSide::Queenside).ok_or_else(invalid)
        }
        _ => {}
    }

    // Drop notation ("N@f3", "@e4") parses so that variant PGNs lex
    // cleanly, but standard chess never executes a drop.
    if body.contains('@') {
        return Err(invalid());
    }

    let mut chars: Vec<char> = body.chars().collect();

    let kind = match chars.first() {
        Some(&c) if c.is_ascii_uppercase() => {
            chars.remove(0);
            PieceKind::from_san_char(c).ok_or_else(invalid)?
        }
        Some(_) => PieceKind::Pawn,
        None => return Err(invalid()),
    };

    // Promotion suffix, with or without '='.
    let mut promotion = None;
    if let Some(&last) = chars.last() {
        if last.is_ascii_uppercase() {
            promotion = Some(PieceKind::from_san_char(last).ok_or_else(invalid)?);
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }
    }

    // Capture and separator marks carry no information the position does
    // not already have.
    chars.retain(|&c| c != 'x' && c != '-');

    if chars.len() < 2 {
        return Err(invalid());
    }
    let to_file = File::from_char(chars[chars.len() - 2]).ok_or_else(invalid)?;
    let to_rank = Rank::from_char(chars[chars.len() - 1]).ok_or_else(invalid)?;
    let to = Square::new(to_file, to_rank);

    let (from_file, from_rank) = match &chars[..chars.len() - 2] {
        [] => (None, None),
        [c] => {
            if let Some(file) = File::from_char(*c) {
                (Some(file), None)
            } else if let Some(rank) = Rank::from_char(*c) {
                (None, Some(rank))
            } else {
                return Err(invalid());
            }
        }
        [f, r] => (
            Some(File::from_char(*f).ok_or_else(invalid)?),
            Some(Rank::from_char(*r).ok_or_else(invalid)?),
        ),
        _ => return Err(invalid()),
    };

    let moves = generate_moves(position);
    let mut candidates = moves.as_slice().iter().filter(|m| {
        m.to == to
            && position.board.get(m.from).map(|p| p.kind) == Some(kind)
            && from_file.map_or(true, |f| m.from.file() == f)
            && from_rank.map_or(true, |r| m.from.rank() == r)
    });

    let resolved = match (candidates.next(), candidates.next()) {
        (Some(&m), None) => m,
        _ => return Err(invalid()),
    };

    // A promotion suffix on a move that does not promote is nonsense.
    if promotion.is_some() && !is_promotion(position, resolved) {
        return Err(invalid());
    }

    Ok((resolved, promotion))
}

fn resolve_castle(position: &Position, side: CastleSide) -> Option<(Move, Option<PieceKind>)> {
    let moves = generate_moves(position);
    moves
        .as_slice()
        .iter()
        .find(|m| {
            m.castle_side() == Some(side)
                && position.board.get(m.from).map(|p| p.kind) == Some(PieceKind::King)
        })
        .map(|&m| (m, None))
}

/// Renders a legal move as SAN for the given position.
///
/// The position must be the state before the move. `promotion` supplies the
/// choice for pawn moves onto the last rank (queen when absent, matching
/// unchecked execution).
pub fn move_to_san(position: &Position, m: Move, promotion: Option<PieceKind>) -> String {
    let piece = position
        .board
        .get(m.from)
        .expect("SAN requested for a move with no piece on the source square");

    let mut san = String::new();
    if piece.kind == PieceKind::King && m.castle_side().is_some() {
        san.push_str(match m.castle_side() {
            Some(CastleSide::Kingside) => "O-O",
            _ => "O-O-O",
        });
    } else {
        let is_capture = position.board.get(m.to).is_some()
            || (piece.kind == PieceKind::Pawn
                && position.en_passant == Some(m.to)
                && m.file_change() == 1);

        if piece.kind == PieceKind::Pawn {
            if is_capture {
                san.push(m.from.file().to_char());
            }
        } else {
            san.push(piece.kind.to_san_char());
            san.push_str(&disambiguation(position, m, piece.kind));
        }
        if is_capture {
            san.push('x');
        }
        san.push_str(&m.to.to_algebraic());

        if is_promotion(position, m) {
            san.push('=');
            san.push(promotion.unwrap_or(PieceKind::Queen).to_san_char());
        }
    }

    let next = apply_move(position, m, promotion);
    if next.board.king_in_check(next.side_to_move) {
        san.push(if generate_moves(&next).is_empty() {
            '#'
        } else {
            '+'
        });
    }
    san
}

/// Returns the minimal source qualifier distinguishing `m` from other legal
/// moves of the same piece kind to the same destination.
fn disambiguation(position: &Position, m: Move, kind: PieceKind) -> String {
    let moves = generate_moves(position);
    let rivals: Vec<Square> = moves
        .as_slice()
        .iter()
        .filter(|other| {
            other.to == m.to
                && other.from != m.from
                && position.board.get(other.from).map(|p| p.kind) == Some(kind)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.file() != m.from.file()) {
        return m.from.file().to_char().to_string();
    }
    if rivals.iter().all(|sq| sq.rank() != m.from.rank()) {
        return m.from.rank().to_char().to_string();
    }
    m.from.to_algebraic()
}
