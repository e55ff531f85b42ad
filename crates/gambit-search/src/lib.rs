//! Material evaluation and alpha-beta minimax search.
//!
//! The evaluator is a plain signed material sum (white positive); the
//! search is textbook alpha-beta driven by the engine's move generator,
//! stepping forward with unchecked execution and backward with undo so
//! that no positions are cloned along the way. Callers wanting parallel
//! search clone the game into independent instances; a [`Game`] is not
//! safe for shared mutation.

use gambit_core::{Color, Move, Piece};
use gambit_engine::{Game, Position};

/// Scores a position as its signed material sum, in pawns.
///
/// White's material counts positive, black's negative. Kings count 900
/// rather than infinity so that scores stay finite and totally ordered.
pub fn evaluate(position: &Position) -> f64 {
    Piece::ALL
        .iter()
        .map(|&piece| position.board.bitboard(piece).count() as f64 * piece.signed_value())
        .sum()
}

/// Alpha-beta minimax over the game's legal moves.
///
/// Descends `depth` plies, applying moves with unchecked execution and
/// taking them back with undo; prunes once `beta <= alpha`. At depth zero
/// or on a finished game this is just [`evaluate`].
pub fn minimax(game: &mut Game, depth: u32, mut alpha: f64, mut beta: f64, maximising: bool) -> f64 {
    if depth == 0 || game.is_finished() {
        return evaluate(game.position());
    }
    let moves = game.available_moves();
    if moves.is_empty() {
        return evaluate(game.position());
    }

    if maximising {
        let mut best = f64::NEG_INFINITY;
        for &m in &moves {
            game.execute_unchecked(m);
            best = best.max(minimax(game, depth - 1, alpha, beta, false));
            game.undo().expect("search undoes the move it just made");
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = f64::INFINITY;
        for &m in &moves {
            game.execute_unchecked(m);
            best = best.min(minimax(game, depth - 1, alpha, beta, true));
            game.undo().expect("search undoes the move it just made");
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Picks the best move for the side to move by scoring every legal move
/// with [`minimax`] at `depth - 1`.
///
/// White takes the maximum, black the minimum; ties go to the move
/// generated first. Returns `None` when the game is finished, there are no
/// legal moves, or `depth` is zero.
pub fn best_move(game: &mut Game, depth: u32) -> Option<Move> {
    if depth == 0 || game.is_finished() {
        return None;
    }

    let maximising = game.position().side_to_move == Color::White;
    let mut best: Option<(Move, f64)> = None;

    for &m in &game.available_moves() {
        game.execute_unchecked(m);
        let score = minimax(
            game,
            depth - 1,
            f64::NEG_INFINITY,
            f64::INFINITY,
            !maximising,
        );
        game.undo().expect("search undoes the move it just made");
        tracing::debug!(%m, score, "scored candidate");

        let better = match best {
            None => true,
            Some((_, incumbent)) => {
                if maximising {
                    score > incumbent
                } else {
                    score < incumbent
                }
            }
        };
        if better {
            best = Some((m, score));
        }
    }

    best.map(|(m, _)| m)
}
