//! Full position state: placement plus game metadata.

use crate::zobrist::ZOBRIST;
use crate::Board;
use gambit_core::{CastleSide, Color, FenError, FenFields, Square};

/// Castling rights flags, packed into four bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const WHITE_KINGSIDE: u8 = 0b0001;
    const WHITE_QUEENSIDE: u8 = 0b0010;
    const BLACK_KINGSIDE: u8 = 0b0100;
    const BLACK_QUEENSIDE: u8 = 0b1000;

    #[inline]
    const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::Kingside) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the given color may castle to the given side.
    #[inline]
    pub const fn allows(self, color: Color, side: CastleSide) -> bool {
        (self.0 & Self::flag(color, side)) != 0
    }

    /// Removes one castling right.
    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Removes both of a color's castling rights.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::flag(color, CastleSide::Kingside)
            | Self::flag(color, CastleSide::Queenside));
    }

    /// Returns the raw four-bit value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Parses the FEN castling field ("KQkq" subset or "-").
    pub fn from_fen(field: &str) -> Result<Self, FenError> {
        if field == "-" {
            return Ok(Self::NONE);
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            match c {
                'K' => rights.0 |= Self::WHITE_KINGSIDE,
                'Q' => rights.0 |= Self::WHITE_QUEENSIDE,
                'k' => rights.0 |= Self::BLACK_KINGSIDE,
                'q' => rights.0 |= Self::BLACK_QUEENSIDE,
                _ => return Err(FenError::Castling(field.to_string())),
            }
        }
        Ok(rights)
    }
}

impl std::fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// A complete chess position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Piece placement.
    pub board: Board,
    /// The side to move.
    pub side_to_move: Color,
    /// Castling rights.
    pub castling: CastlingRights,
    /// En passant target square, if the last move was a double push.
    pub en_passant: Option<Square>,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u16,
    /// Fullmove number; starts at 1, increments after Black's move.
    pub fullmove_number: u16,
}

impl Position {
    /// Creates an empty position.
    pub const fn empty() -> Self {
        Position {
            board: Board::empty(),
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenFields::STARTPOS).expect("STARTPOS is valid")
    }

    /// Parses a full six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;

        let board = Board::from_fen(&fields.placement)?;
        let side_to_move =
            Color::from_fen_char(fields.side_to_move).expect("field validated by FenFields");
        let castling = CastlingRights::from_fen(&fields.castling)?;
        let en_passant = if fields.en_passant == "-" {
            None
        } else {
            Square::from_algebraic(&fields.en_passant)
        };

        Ok(Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock: fields.halfmove_clock,
            fullmove_number: fields.fullmove_number,
        })
    }

    /// Serializes the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            self.board.fen(),
            self.side_to_move.to_fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Computes the Zobrist hash of this position.
    ///
    /// Two positions hash equal when board, side to move, castling rights,
    /// and en passant target all match, which is exactly the identity the
    /// repetition rule uses.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = 0u64;
        for piece in gambit_core::Piece::ALL {
            for sq in self.board.bitboard(piece) {
                hash ^= ZOBRIST.piece_key(piece, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }
        for (i, (color, side)) in [
            (Color::White, CastleSide::Kingside),
            (Color::White, CastleSide::Queenside),
            (Color::Black, CastleSide::Kingside),
            (Color::Black, CastleSide::Queenside),
        ]
        .into_iter()
        .enumerate()
        {
            if self.castling.allows(color, side) {
                hash ^= ZOBRIST.castling_key(i);
            }
        }
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant_key(ep.file().index() as usize);
        }
        hash
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
