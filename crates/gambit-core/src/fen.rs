//! FEN (Forsyth-Edwards Notation) field splitting and validation.
//!
//! [`FenFields`] holds the six raw FEN fields after shape validation. The
//! engine crate converts the fields into its bitboard position; splitting
//! the two steps keeps the text-level diagnostics in one place.

use thiserror::Error;

/// Errors raised while parsing a FEN string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    SideToMove(String),

    #[error("invalid castling rights: {0}")]
    Castling(String),

    #[error("invalid en passant target: {0}")]
    EnPassant(String),

    #[error("invalid halfmove clock: {0}")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    FullmoveNumber(String),
}

/// The six raw fields of a FEN string, validated for shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement, ranks 8 down to 1 separated by '/'.
    pub placement: String,
    /// Side to move ('w' or 'b').
    pub side_to_move: char,
    /// Castling availability over "KQkq", or "-".
    pub castling: String,
    /// En passant target square, or "-".
    pub en_passant: String,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u16,
    /// Fullmove number, starting at 1.
    pub fullmove_number: u16,
}

impl FenFields {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        Self::validate_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => 'w',
            "b" => 'b',
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        Self::validate_castling(fields[2])?;
        Self::validate_en_passant(fields[3])?;

        let halfmove_clock = fields[4]
            .parse::<u16>()
            .map_err(|_| FenError::HalfmoveClock(fields[4].to_string()))?;
        let fullmove_number = fields[5]
            .parse::<u16>()
            .map_err(|_| FenError::FullmoveNumber(fields[5].to_string()))?;

        Ok(FenFields {
            placement: fields[0].to_string(),
            side_to_move,
            castling: fields[2].to_string(),
            en_passant: fields[3].to_string(),
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Validates a board placement field on its own (eight ranks of eight
    /// squares each, piece letters and empty-run digits only).
    pub fn validate_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut squares = 0u32;
            for c in rank.chars() {
                if let Some(run) = c.to_digit(10) {
                    if run == 0 || run > 8 {
                        return Err(FenError::Placement(format!(
                            "invalid empty run '{}' in rank {}",
                            c,
                            8 - i
                        )));
                    }
                    squares += run;
                } else if "pnbrqkPNBRQK".contains(c) {
                    squares += 1;
                } else {
                    return Err(FenError::Placement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(FenError::Placement(format!(
                    "rank {} covers {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() || castling.chars().any(|c| !"KQkq".contains(c)) {
            return Err(FenError::Castling(castling.to_string()));
        }
        Ok(())
    }

    fn validate_en_passant(ep: &str) -> Result<(), FenError> {
        if ep == "-" {
            return Ok(());
        }
        let mut chars = ep.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None)
                if ('a'..='h').contains(&file) && (rank == '3' || rank == '6') =>
            {
                Ok(())
            }
            _ => Err(FenError::EnPassant(ep.to_string())),
        }
    }

    /// Reassembles the six fields into a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.placement,
            self.side_to_move,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenFields {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}
