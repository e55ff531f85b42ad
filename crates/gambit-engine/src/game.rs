//! The game state machine: move execution, undo/redo history, and
//! outcome resolution.

use crate::movegen::{apply_move, generate_moves, is_promotion};
use crate::{Bitboard, CastlingRights, MoveList, Position};
use gambit_core::{Color, FenError, Move, Piece, PieceKind, Square};
use thiserror::Error;

/// Errors raised by game operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(Move),

    #[error("promotion move executed without a promotion choice")]
    PromotionRequired,

    #[error("a pawn cannot promote to a {0}")]
    InvalidPromotion(PieceKind),

    #[error("no move to undo")]
    NoMoveToUndo,

    #[error("no move to redo")]
    NoMoveToRedo,

    #[error("cannot claim a draw: neither the fifty-move rule nor threefold repetition applies")]
    CannotClaimDraw,
}

/// The chess variant a game is played under.
///
/// The variant governs the initial layout; move generation always runs in
/// standard orientation. Upside-down games start with no castling rights
/// since neither king stands on its castling square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Standard,
    UpsideDown,
}

impl Variant {
    /// Returns the initial position for this variant.
    pub fn initial_position(self) -> Position {
        match self {
            Variant::Standard => Position::startpos(),
            Variant::UpsideDown => {
                let mut position = Position::startpos();
                position.board = position.board.flipped_vertically();
                position.castling = CastlingRights::NONE;
                position
            }
        }
    }
}

/// One of the two players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
}

impl Player {
    /// Creates a named player.
    pub fn named(name: impl Into<String>) -> Self {
        Player { name: name.into() }
    }
}

impl Default for Player {
    fn default() -> Self {
        // "?" is the PGN convention for an unknown player.
        Player {
            name: "?".to_string(),
        }
    }
}

/// Both players of a game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Players {
    pub white: Player,
    pub black: Player,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Resignation { winner: Color },
}

impl Outcome {
    /// Returns the winning color, or `None` for a draw.
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } | Outcome::Resignation { winner } => Some(winner),
            _ => None,
        }
    }

    /// Returns true when the game ended drawn.
    pub fn is_draw(self) -> bool {
        self.winner().is_none()
    }
}

/// The rollback information for one executed half-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRecord {
    /// The executed move.
    pub mov: Move,
    /// The kind of piece that moved (before any promotion).
    pub moved: PieceKind,
    /// The captured piece and the square it stood on. For en passant the
    /// square differs from the move's destination.
    pub capture: Option<(Piece, Square)>,
    /// The promotion choice, for pawn moves onto the last rank.
    pub promotion: Option<PieceKind>,
    /// Castling rights before the move.
    pub prior_castling: CastlingRights,
    /// En passant target before the move.
    pub prior_en_passant: Option<Square>,
    /// Halfmove clock before the move.
    pub prior_halfmove_clock: u16,
    /// Fullmove number before the move.
    pub prior_fullmove_number: u16,
}

/// A chess game: a position plus the history needed to step backward and
/// forward through it.
#[derive(Debug, Clone)]
pub struct Game {
    initial_position: Position,
    position: Position,
    undo_stack: Vec<HistoryRecord>,
    redo_stack: Vec<HistoryRecord>,
    /// Zobrist hash of every position reached, for repetition claims.
    repetition: Vec<u64>,
    variant: Variant,
    pub players: Players,
    /// Optional PGN tag pairs carried with the game.
    pub tags: Vec<(String, String)>,
    outcome: Option<Outcome>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a standard game from the starting position.
    pub fn new() -> Self {
        Self::with_variant(Variant::Standard)
    }

    /// Creates a game for the given variant.
    pub fn with_variant(variant: Variant) -> Self {
        let mut game = Self::from_position(variant.initial_position());
        game.variant = variant;
        game
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            initial_position: position,
            position,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            repetition: vec![position.zobrist_hash()],
            variant: Variant::Standard,
            players: Players::default(),
            tags: Vec::new(),
            outcome: None,
        };
        game.outcome = game.detect_outcome();
        game
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the position the game started from.
    pub fn initial_position(&self) -> &Position {
        &self.initial_position
    }

    /// Returns the game's variant.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the executed half-moves, oldest first.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.undo_stack
    }

    /// Returns the number of half-moves that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of half-moves that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Returns all legal moves for the side to move.
    pub fn available_moves(&self) -> MoveList {
        generate_moves(&self.position)
    }

    /// Returns the legal moves starting from the given square.
    pub fn moves_for_piece(&self, from: Square) -> MoveList {
        let mut moves = self.available_moves();
        moves.retain(|m| m.from == from);
        moves
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.board.king_in_check(self.position.side_to_move)
    }

    /// Returns the outcome of a finished game.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns true once the game has an outcome.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Executes a legal move.
    ///
    /// Fails with [`GameError::PromotionRequired`] when the move is a pawn
    /// reaching its last rank; use [`Game::execute_with_promotion`] or
    /// [`Game::execute_with`] for those.
    pub fn execute(&mut self, m: Move) -> Result<(), GameError> {
        self.execute_checked(m, None)
    }

    /// Executes a legal move, promoting to `kind` if it is a promotion.
    pub fn execute_with_promotion(&mut self, m: Move, kind: PieceKind) -> Result<(), GameError> {
        self.execute_checked(m, Some(kind))
    }

    /// Executes a legal move, asking `choose` for the promotion kind.
    ///
    /// The closure is invoked only when the move actually promotes.
    pub fn execute_with<F>(&mut self, m: Move, choose: F) -> Result<(), GameError>
    where
        F: FnOnce() -> PieceKind,
    {
        self.validate(m)?;
        if is_promotion(&self.position, m) {
            let kind = choose();
            if !kind.can_promote_to() {
                return Err(GameError::InvalidPromotion(kind));
            }
            self.apply_and_record(m, Some(kind));
        } else {
            self.apply_and_record(m, None);
        }
        Ok(())
    }

    /// Executes a move without the legality filter.
    ///
    /// The move must be in the legal set; behavior is undefined otherwise.
    /// Promotions apply as queens. This is the search path, which probes
    /// thousands of already-generated moves per second and never needs the
    /// user-facing errors.
    pub fn execute_unchecked(&mut self, m: Move) {
        let promotion = if is_promotion(&self.position, m) {
            Some(PieceKind::Queen)
        } else {
            None
        };
        self.apply_and_record(m, promotion);
    }

    fn validate(&self, m: Move) -> Result<(), GameError> {
        if self.outcome.is_some() {
            // A finished game has no legal moves to offer.
            return Err(GameError::IllegalMove(m));
        }
        if !self.available_moves().as_slice().contains(&m) {
            return Err(GameError::IllegalMove(m));
        }
        Ok(())
    }

    fn execute_checked(&mut self, m: Move, promotion: Option<PieceKind>) -> Result<(), GameError> {
        self.validate(m)?;
        if let Some(kind) = promotion {
            if !kind.can_promote_to() {
                return Err(GameError::InvalidPromotion(kind));
            }
        }
        if is_promotion(&self.position, m) {
            let kind = promotion.ok_or(GameError::PromotionRequired)?;
            self.apply_and_record(m, Some(kind));
        } else {
            self.apply_and_record(m, None);
        }
        Ok(())
    }

    fn apply_and_record(&mut self, m: Move, promotion: Option<PieceKind>) {
        let moved = self
            .position
            .board
            .get(m.from)
            .expect("executed move has no piece on the source square")
            .kind;

        let capture = self.position.board.get(m.to).map(|p| (p, m.to)).or_else(|| {
            if moved == PieceKind::Pawn
                && self.position.en_passant == Some(m.to)
                && m.file_change() == 1
            {
                let sq = Square::new(m.to.file(), m.from.rank());
                self.position.board.get(sq).map(|p| (p, sq))
            } else {
                None
            }
        });

        self.undo_stack.push(HistoryRecord {
            mov: m,
            moved,
            capture,
            promotion,
            prior_castling: self.position.castling,
            prior_en_passant: self.position.en_passant,
            prior_halfmove_clock: self.position.halfmove_clock,
            prior_fullmove_number: self.position.fullmove_number,
        });
        self.redo_stack.clear();

        self.position = apply_move(&self.position, m, promotion);
        self.repetition.push(self.position.zobrist_hash());
        self.outcome = self.detect_outcome();
    }

    /// Takes back the last executed move and returns it.
    ///
    /// Restores the position exactly: castling rights, en passant target,
    /// and both clocks come back from the history record.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        let record = self.undo_stack.pop().ok_or(GameError::NoMoveToUndo)?;
        let mover = self.position.side_to_move.opposite();

        self.position.board.set(record.mov.to, None);
        self.position
            .board
            .set(record.mov.from, Some(Piece::new(record.moved, mover)));
        if let Some((piece, sq)) = record.capture {
            self.position.board.set(sq, Some(piece));
        }
        if record.moved == PieceKind::King {
            if let Some(side) = record.mov.castle_side() {
                let rank = mover.start_rank();
                let rook_to = Square::new(side.rook_target_file(), rank);
                let rook_from = Square::new(side.rook_file(), rank);
                if let Some(rook) = self.position.board.remove(rook_to) {
                    self.position.board.set(rook_from, Some(rook));
                }
            }
        }

        self.position.castling = record.prior_castling;
        self.position.en_passant = record.prior_en_passant;
        self.position.halfmove_clock = record.prior_halfmove_clock;
        self.position.fullmove_number = record.prior_fullmove_number;
        self.position.side_to_move = mover;

        self.repetition.pop();
        self.redo_stack.push(record);
        // Claimed draws and resignations do not survive stepping back.
        self.outcome = self.detect_outcome();
        Ok(record.mov)
    }

    /// Re-executes the move most recently undone and returns it.
    pub fn redo(&mut self) -> Result<Move, GameError> {
        let record = self.redo_stack.pop().ok_or(GameError::NoMoveToRedo)?;
        self.position = apply_move(&self.position, record.mov, record.promotion);
        self.repetition.push(self.position.zobrist_hash());
        self.undo_stack.push(record);
        self.outcome = self.detect_outcome();
        Ok(record.mov)
    }

    /// Resigns the game for the side to move. Does nothing once the game
    /// is already finished.
    pub fn resign(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(Outcome::Resignation {
                winner: self.position.side_to_move.opposite(),
            });
        }
    }

    /// Counts how often the current position has occurred, including now.
    pub fn repetition_count(&self) -> usize {
        let current = self.position.zobrist_hash();
        self.repetition.iter().filter(|&&h| h == current).count()
    }

    /// Returns true if a draw may be claimed under the fifty-move rule or
    /// by threefold repetition.
    ///
    /// Both rules are claimable, not automatic: the game stays active until
    /// [`Game::claim_draw`] is called.
    pub fn can_claim_draw(&self) -> bool {
        self.outcome.is_none()
            && (self.position.halfmove_clock >= 100 || self.repetition_count() >= 3)
    }

    /// Claims a draw, finishing the game.
    pub fn claim_draw(&mut self) -> Result<(), GameError> {
        if self.outcome.is_none() {
            if self.repetition_count() >= 3 {
                self.outcome = Some(Outcome::ThreefoldRepetition);
                return Ok(());
            }
            if self.position.halfmove_clock >= 100 {
                self.outcome = Some(Outcome::FiftyMoveRule);
                return Ok(());
            }
        }
        Err(GameError::CannotClaimDraw)
    }

    fn detect_outcome(&self) -> Option<Outcome> {
        if self.is_insufficient_material() {
            return Some(Outcome::InsufficientMaterial);
        }
        if self.available_moves().is_empty() {
            return Some(if self.is_check() {
                Outcome::Checkmate {
                    winner: self.position.side_to_move.opposite(),
                }
            } else {
                Outcome::Stalemate
            });
        }
        None
    }

    /// Returns true when neither side can possibly deliver mate: K vs K,
    /// K+B vs K, K+N vs K, or K+B vs K+B with both bishops on one shade.
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.position.board;

        for kind in [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen] {
            for color in Color::ALL {
                if board.pieces_of(kind, color).is_not_empty() {
                    return false;
                }
            }
        }

        let white_knights = board.pieces_of(PieceKind::Knight, Color::White).count();
        let black_knights = board.pieces_of(PieceKind::Knight, Color::Black).count();
        let white_bishops = board.pieces_of(PieceKind::Bishop, Color::White);
        let black_bishops = board.pieces_of(PieceKind::Bishop, Color::Black);
        let knights = white_knights + black_knights;
        let bishops = white_bishops.count() + black_bishops.count();

        // K vs K, or a single minor piece on the board.
        if knights + bishops <= 1 {
            return true;
        }

        // K+B vs K+B with both bishops on the same shade.
        if knights == 0 && white_bishops.count() == 1 && black_bishops.count() == 1 {
            let white_light = (white_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
            let black_light = (black_bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
            return white_light == black_light;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        Move::from_coordinate(s).unwrap()
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.undo_count(), 0);
        assert_eq!(game.redo_count(), 0);
        assert!(!game.is_finished());
        assert!(!game.is_check());
        assert_eq!(game.available_moves().len(), 20);
    }

    #[test]
    fn illegal_move_rejected() {
        let mut game = Game::new();
        let err = game.execute(mv("e2e5")).unwrap_err();
        assert_eq!(err, GameError::IllegalMove(mv("e2e5")));
        assert_eq!(game.undo_count(), 0);
    }

    #[test]
    fn execute_matches_available_moves() {
        let game = Game::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let legal = game.available_moves();

        // Every generated move executes cleanly.
        for &m in legal.as_slice() {
            let mut probe = game.clone();
            assert_eq!(probe.execute(m), Ok(()), "{} should execute", m);
        }

        // Anything outside the generated set is rejected.
        for from in Bitboard::FULL {
            for to in crate::movegen::queen_attacks(from, Bitboard::EMPTY) {
                let m = Move::new(from, to);
                if !legal.as_slice().contains(&m) {
                    let mut probe = game.clone();
                    assert!(probe.execute(m).is_err(), "{} should be rejected", m);
                }
            }
        }
    }

    #[test]
    fn en_passant_targets_and_clock() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        assert_eq!(game.position().en_passant, Some(sq("e3")));
        game.execute(mv("e7e5")).unwrap();
        assert_eq!(game.position().en_passant, Some(sq("e6")));
        game.execute(mv("g1f3")).unwrap();
        assert_eq!(game.position().en_passant, None);
        assert_eq!(game.position().halfmove_clock, 1);
    }

    #[test]
    fn castling_execution_and_rights() {
        let mut game = Game::new();
        for m in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"] {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.position().castling.to_string(), "KQkq");

        game.execute(mv("a7a6")).unwrap();
        game.execute(mv("e1g1")).unwrap();

        let board = &game.position().board;
        assert_eq!(board.get(Square::G1).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(board.get(Square::F1).map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(game.position().castling.to_string(), "kq");
    }

    #[test]
    fn promotion_requires_a_choice() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(game.execute(mv("a7a8")), Err(GameError::PromotionRequired));

        game.execute_with_promotion(mv("a7a8"), PieceKind::Queen)
            .unwrap();
        let board = &game.position().board;
        assert_eq!(
            board.get(Square::A8),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        assert_eq!(board.get(sq("a7")), None);
    }

    #[test]
    fn promotion_rejects_pawn_and_king() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(
            game.execute_with_promotion(mv("a7a8"), PieceKind::Pawn),
            Err(GameError::InvalidPromotion(PieceKind::Pawn))
        );
        assert_eq!(
            game.execute_with_promotion(mv("a7a8"), PieceKind::King),
            Err(GameError::InvalidPromotion(PieceKind::King))
        );
        assert!(!game.is_finished());
        assert_eq!(game.undo_count(), 0);
    }

    #[test]
    fn promotion_closure_only_runs_for_promotions() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();

        let mut asked = false;
        game.execute_with(mv("h1g1"), || {
            asked = true;
            PieceKind::Queen
        })
        .unwrap();
        assert!(!asked);

        game.execute_with(mv("h8g8"), || PieceKind::Queen).unwrap();
        game.execute_with(mv("a7a8"), || {
            asked = true;
            PieceKind::Rook
        })
        .unwrap();
        assert!(asked);
        assert_eq!(
            game.position().board.get(Square::A8),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
    }

    #[test]
    fn undo_restores_the_exact_position() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 3 7",
            "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3",
            "7k/P7/8/8/8/8/8/7K w - - 11 40",
        ];
        for fen in fens {
            let game = Game::from_fen(fen).unwrap();
            for &m in game.available_moves().as_slice() {
                let mut probe = game.clone();
                probe.execute_with(m, || PieceKind::Knight).unwrap();
                probe.undo().unwrap();
                assert_eq!(
                    probe.position().to_fen(),
                    fen,
                    "undo after {} did not restore {}",
                    m,
                    fen
                );
            }
        }
    }

    #[test]
    fn undo_restores_en_passant_capture() {
        let mut game =
            Game::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3")
                .unwrap();
        game.execute(mv("f5e6")).unwrap();
        assert_eq!(game.position().board.get(sq("e5")), None);

        let undone = game.undo().unwrap();
        assert_eq!(undone, mv("f5e6"));
        assert_eq!(
            game.position().board.get(sq("e5")),
            Some(Piece::new(PieceKind::Pawn, Color::Black))
        );
        assert_eq!(
            game.position().board.get(sq("f5")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn undo_restores_castling() {
        let mut game =
            Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        game.execute(mv("e1c1")).unwrap();
        game.undo().unwrap();
        assert_eq!(
            game.position().to_fen(),
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
        );
    }

    #[test]
    fn undo_empty_history_fails() {
        let mut game = Game::new();
        assert_eq!(game.undo(), Err(GameError::NoMoveToUndo));
        assert_eq!(game.redo(), Err(GameError::NoMoveToRedo));
    }

    #[test]
    fn double_undo_redo_restores_position() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        game.execute(mv("e7e5")).unwrap();
        let fen = game.position().to_fen();

        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.position(), game.initial_position());

        assert_eq!(game.redo().unwrap(), mv("e2e4"));
        assert_eq!(game.redo().unwrap(), mv("e7e5"));
        assert_eq!(game.position().to_fen(), fen);
        assert_eq!(game.redo(), Err(GameError::NoMoveToRedo));
    }

    #[test]
    fn redo_replays_promotion_choice() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
        game.execute_with_promotion(mv("a7a8"), PieceKind::Knight)
            .unwrap();
        game.undo().unwrap();
        game.redo().unwrap();
        assert_eq!(
            game.position().board.get(Square::A8),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
    }

    #[test]
    fn execute_clears_redo_stack() {
        let mut game = Game::new();
        game.execute(mv("e2e4")).unwrap();
        game.undo().unwrap();
        assert_eq!(game.redo_count(), 1);
        game.execute(mv("d2d4")).unwrap();
        assert_eq!(game.redo_count(), 0);
        assert_eq!(game.redo(), Err(GameError::NoMoveToRedo));
    }

    #[test]
    fn checkmate_finishes_the_game() {
        let mut game = Game::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.execute(mv(m)).unwrap();
        }
        assert!(game.is_finished());
        assert_eq!(
            game.outcome(),
            Some(Outcome::Checkmate {
                winner: Color::Black
            })
        );
        assert!(game.execute(mv("a2a3")).is_err());

        // Stepping back re-opens the game.
        game.undo().unwrap();
        assert!(!game.is_finished());
    }

    #[test]
    fn stalemate_finishes_the_game() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
        assert!(game.outcome().unwrap().is_draw());
    }

    #[test]
    fn insufficient_material_cases() {
        // K vs K
        assert!(Game::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1")
            .unwrap()
            .is_finished());
        // K+N vs K
        assert!(Game::from_fen("8/8/8/8/8/8/8/4KN1k w - - 0 1")
            .unwrap()
            .is_finished());
        // K+B vs K
        assert!(Game::from_fen("8/8/8/8/8/8/8/4KB1k w - - 0 1")
            .unwrap()
            .is_finished());
        // K+B vs K+B, both bishops on light squares
        let game = Game::from_fen("8/8/8/8/8/8/b7/4KB1k w - - 0 1").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::InsufficientMaterial));
        // K+B vs K+B on opposite shades can still mate
        assert!(!Game::from_fen("8/8/8/8/8/8/1b6/4KB1k w - - 0 1")
            .unwrap()
            .is_finished());
        // Rooks, queens, or pawns always count as mating material
        assert!(!Game::from_fen("8/8/8/8/8/8/8/4KR1k w - - 0 1")
            .unwrap()
            .is_finished());
        assert!(!Game::from_fen("8/8/8/8/8/8/4P3/4K2k w - - 0 1")
            .unwrap()
            .is_finished());
        // Two knights still count as mating material here
        assert!(!Game::from_fen("8/8/8/8/8/8/8/3NKN1k w - - 0 1")
            .unwrap()
            .is_finished());
    }

    #[test]
    fn fifty_move_rule_is_claimable() {
        let mut game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 70").unwrap();
        assert!(!game.can_claim_draw());
        game.execute(mv("a1a2")).unwrap();

        // Claimable but not automatic.
        assert!(!game.is_finished());
        assert!(game.can_claim_draw());
        game.claim_draw().unwrap();
        assert_eq!(game.outcome(), Some(Outcome::FiftyMoveRule));
    }

    #[test]
    fn threefold_repetition_is_claimable() {
        let mut game = Game::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for m in shuffle {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.repetition_count(), 2);
        assert!(!game.can_claim_draw());
        assert_eq!(game.claim_draw(), Err(GameError::CannotClaimDraw));

        for m in shuffle {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.repetition_count(), 3);
        assert!(game.can_claim_draw());
        game.claim_draw().unwrap();
        assert_eq!(game.outcome(), Some(Outcome::ThreefoldRepetition));
    }

    #[test]
    fn repetition_count_drops_on_undo() {
        let mut game = Game::new();
        for m in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            game.execute(mv(m)).unwrap();
        }
        assert_eq!(game.repetition_count(), 2);
        game.undo().unwrap();
        game.undo().unwrap();
        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.repetition_count(), 1);
    }

    #[test]
    fn resignation() {
        let mut game = Game::new();
        game.resign();
        assert_eq!(
            game.outcome(),
            Some(Outcome::Resignation {
                winner: Color::Black
            })
        );
        assert_eq!(game.outcome().unwrap().winner(), Some(Color::Black));

        // Resigning again changes nothing.
        game.execute(mv("e2e4")).unwrap_err();
        game.resign();
        assert_eq!(game.outcome().unwrap().winner(), Some(Color::Black));
    }

    #[test]
    fn moves_for_piece_filters_by_source() {
        let game = Game::new();
        let knight_moves = game.moves_for_piece(Square::G1);
        assert_eq!(knight_moves.len(), 2);
        assert!(knight_moves.as_slice().contains(&mv("g1f3")));
        assert!(knight_moves.as_slice().contains(&mv("g1h3")));
        assert!(game.moves_for_piece(sq("e4")).is_empty());
    }

    #[test]
    fn upside_down_variant_mirrors_the_board() {
        let game = Game::with_variant(Variant::UpsideDown);
        assert_eq!(game.variant(), Variant::UpsideDown);
        let board = &game.position().board;
        assert_eq!(
            board.get(Square::E8),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.get(Square::E1),
            Some(Piece::new(PieceKind::King, Color::Black))
        );
        assert_eq!(game.position().castling, CastlingRights::NONE);
        assert_eq!(game.position().side_to_move, Color::White);
    }

    #[test]
    fn unchecked_execution_promotes_to_queen() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
        game.execute_unchecked(mv("a7a8"));
        assert_eq!(
            game.position().board.get(Square::A8),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        game.undo().unwrap();
        assert_eq!(game.position().to_fen(), "7k/P7/8/8/8/8/8/7K w - - 0 1");
    }
}
