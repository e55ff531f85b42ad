//! Bitboard rules engine for the gambit chess library.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit occupancy set with shifts, fills, and flips
//! - [`Board`] - twelve piece bitboards with attack and pin queries
//! - [`Position`] - full game state with a FEN codec
//! - [`Game`] - the game state machine with undo/redo history
//! - Legal move generation, including castling, en passant, and promotion
//! - SAN/LAN parsing and generation resolved against a position
//!
//! # Architecture
//!
//! Each of the twelve piece type/color combinations owns one 64-bit
//! bitboard, so move generation is a handful of bit-parallel operations per
//! piece kind. Attack tables for the leaping pieces are computed at compile
//! time; ray, between, and line tables are published once through a
//! [`std::sync::OnceLock`] and are safe for concurrent reads.
//!
//! # Example
//!
//! ```
//! use gambit_engine::Game;
//! use gambit_core::Move;
//!
//! let mut game = Game::new();
//! game.execute(Move::from_coordinate("e2e4").unwrap()).unwrap();
//! game.execute(Move::from_coordinate("e7e5").unwrap()).unwrap();
//! assert_eq!(game.undo_count(), 2);
//! game.undo().unwrap();
//! assert_eq!(game.undo_count(), 1);
//! ```

mod bitboard;
mod board;
mod game;
pub mod movegen;
mod position;
pub mod san;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use game::{Game, GameError, HistoryRecord, Outcome, Player, Players, Variant};
pub use movegen::{
    apply_move, between, bishop_attacks, generate_moves, is_square_attacked, king_attacks,
    knight_attacks, line, pawn_attacks, queen_attacks, rook_attacks, MoveList,
};
pub use position::{CastlingRights, Position};
pub use san::{move_to_san, parse_move, SanError};
