//! Piece placement: twelve bitboards, one per piece kind and color.

use crate::movegen::{
    between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
    xray_bishop_attacks, xray_rook_attacks,
};
use crate::Bitboard;
use gambit_core::{Color, FenError, FenFields, Piece, PieceKind, Square};

/// Piece placement for a full board.
///
/// Each of the twelve piece type/color combinations owns one bitboard,
/// indexed by [`Piece::index`]. A square is set in at most one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    bitboards: [Bitboard; 12],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Board {
            bitboards: [Bitboard::EMPTY; 12],
        }
    }

    /// Returns the bitboard for a piece.
    #[inline]
    pub const fn bitboard(&self, piece: Piece) -> Bitboard {
        self.bitboards[piece.index()]
    }

    /// Returns the squares holding pieces of the given kind and color.
    #[inline]
    pub const fn pieces_of(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.bitboard(Piece::new(kind, color))
    }

    /// Returns all squares occupied by the given color.
    pub fn occupancy(&self, color: Color) -> Bitboard {
        PieceKind::ALL
            .iter()
            .fold(Bitboard::EMPTY, |acc, &kind| acc | self.pieces_of(kind, color))
    }

    /// Returns all occupied squares.
    pub fn occupied(&self) -> Bitboard {
        self.bitboards
            .iter()
            .fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    /// Returns all empty squares.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns the piece on the given square, if any.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        let mask = Bitboard::from_square(sq);
        Piece::ALL
            .into_iter()
            .find(|&piece| (self.bitboard(piece) & mask).is_not_empty())
    }

    /// Places a piece on a square, or clears the square for `None`.
    ///
    /// Any piece already on the square is removed first.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.remove(sq);
        if let Some(piece) = piece {
            self.bitboards[piece.index()].set(sq);
        }
    }

    /// Removes and returns the piece on a square.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.get(sq)?;
        self.bitboards[piece.index()].clear(sq);
        Some(piece)
    }

    /// Returns the number of pieces of the given kind and color.
    #[inline]
    pub fn count(&self, piece: Piece) -> u32 {
        self.bitboard(piece).count()
    }

    /// Returns the square of the given color's king, if present.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(PieceKind::King, color).first()
    }

    /// Returns all pieces of `by` attacking the given square.
    ///
    /// Queens are folded into both slider lookups rather than getting a ray
    /// scan of their own.
    pub fn attackers(&self, sq: Square, by: Color) -> Bitboard {
        let occupied = self.occupied();
        let queens = self.pieces_of(PieceKind::Queen, by);

        // A pawn of `by` attacks `sq` iff a pawn of the other color on `sq`
        // would attack it back.
        let pawns = pawn_attacks(sq, by.opposite()) & self.pieces_of(PieceKind::Pawn, by);
        let knights = knight_attacks(sq) & self.pieces_of(PieceKind::Knight, by);
        let kings = king_attacks(sq) & self.pieces_of(PieceKind::King, by);
        let diagonal =
            bishop_attacks(sq, occupied) & (self.pieces_of(PieceKind::Bishop, by) | queens);
        let orthogonal =
            rook_attacks(sq, occupied) & (self.pieces_of(PieceKind::Rook, by) | queens);

        pawns | knights | kings | diagonal | orthogonal
    }

    /// Returns true if the square is attacked by the given color.
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers(sq, by).is_not_empty()
    }

    /// Returns true if the given color's king is attacked.
    pub fn king_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Returns the pieces of `color` pinned to their own king.
    ///
    /// Xray attacks from the king reveal enemy sliders behind a single
    /// blocker; when that blocker is ours, it is pinned.
    pub fn pinned(&self, color: Color) -> Bitboard {
        let Some(king) = self.king_square(color) else {
            return Bitboard::EMPTY;
        };
        let occupied = self.occupied();
        let own = self.occupancy(color);
        let them = color.opposite();
        let queens = self.pieces_of(PieceKind::Queen, them);

        let orthogonal_snipers = xray_rook_attacks(king, occupied, own)
            & (self.pieces_of(PieceKind::Rook, them) | queens);
        let diagonal_snipers = xray_bishop_attacks(king, occupied, own)
            & (self.pieces_of(PieceKind::Bishop, them) | queens);

        let mut pinned = Bitboard::EMPTY;
        for sniper in orthogonal_snipers | diagonal_snipers {
            let blockers = between(king, sniper) & occupied;
            if blockers.count() == 1 {
                pinned |= blockers & own;
            }
        }
        pinned
    }

    /// Serializes the placement into the board field of a FEN string.
    pub fn fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0u8..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                if let Some(piece) = self.get(sq) {
                    if empty_run > 0 {
                        fen.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    fen.push(piece.to_fen_char());
                } else {
                    empty_run += 1;
                }
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }

    /// Parses the board field of a FEN string.
    pub fn from_fen(placement: &str) -> Result<Self, FenError> {
        FenFields::validate_placement(placement)?;

        let mut board = Board::empty();
        for (rank_idx, rank_str) in placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    file += run as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                    board.bitboards[piece.index()].set(sq);
                    file += 1;
                }
            }
        }
        Ok(board)
    }

    /// Returns the board mirrored vertically (rank 1 <-> rank 8), keeping
    /// piece colors.
    pub fn flipped_vertically(&self) -> Self {
        let mut flipped = Board::empty();
        for (i, bb) in self.bitboards.iter().enumerate() {
            flipped.bitboards[i] = bb.flip_vertical();
        }
        flipped
    }
}
