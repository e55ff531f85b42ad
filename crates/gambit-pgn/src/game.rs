//! Full-game PGN codec: tag section plus movetext, bridged to
//! [`gambit_engine::Game`].

use crate::lexer::{Diagnostic, DiagnosticLevel};
use crate::movetext::{GameTermination, MoveNode, Movetext};
use crate::tags::Tags;
use crate::PgnError;
use chrono::Utc;
use gambit_core::Color;
use gambit_engine::san::{move_to_san, parse_move};
use gambit_engine::{apply_move, Game, Player};
use std::fmt;

/// Soft wrap column for exported movetext.
const WRAP_COLUMN: usize = 80;

/// A PGN document: tag pairs and a movetext tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Tags,
    pub movetext: Movetext,
}

impl PgnGame {
    /// Parses a PGN document.
    ///
    /// The header is strict - a malformed tag line fails the whole call -
    /// while the movetext is parsed resiliently. Missing seven-tag-roster
    /// tags are tolerated and recorded as diagnostics.
    pub fn parse(input: &str) -> Result<Self, PgnError> {
        let (header, movetext_source) = split_header(input);
        let tags = Tags::parse(&header)?;
        let mut movetext = Movetext::parse(&movetext_source);

        for key in tags.missing_roster_tags() {
            let diagnostic = Diagnostic {
                level: DiagnosticLevel::Warning,
                message: format!("missing required tag '{}'", key),
                line: 1,
                column: 1,
            };
            tracing::warn!(%diagnostic, "incomplete PGN header");
            movetext.diagnostics.push(diagnostic);
        }

        Ok(PgnGame { tags, movetext })
    }

    /// Builds the PGN document for a game: its tags (with seven-tag-roster
    /// defaults filled in) and its current move list.
    pub fn from_game(game: &Game) -> Self {
        let result = match game.outcome() {
            Some(outcome) => match outcome.winner() {
                Some(Color::White) => GameTermination::WhiteWins,
                Some(Color::Black) => GameTermination::BlackWins,
                None => GameTermination::Draw,
            },
            None => GameTermination::Undecided,
        };

        let mut tags = Tags::new();
        for (key, value) in game.tags.iter() {
            tags.set(key.clone(), value.clone());
        }
        tags.set_default("Event", "?");
        tags.set_default("Site", "?");
        tags.set_default("Date", Utc::now().format("%Y.%m.%d").to_string());
        tags.set_default("Round", "?");
        tags.set_default("White", game.players.white.name.clone());
        tags.set_default("Black", game.players.black.name.clone());
        tags.set("Result", result.as_str());

        let startpos = gambit_engine::Position::startpos();
        if *game.initial_position() != startpos {
            tags.set_default("FEN", game.initial_position().to_fen());
        }

        let mut movetext = Movetext::default();
        let mut position = *game.initial_position();
        for record in game.history() {
            movetext.moves.push(MoveNode {
                number: position.fullmove_number,
                side: position.side_to_move,
                notation: move_to_san(&position, record.mov, record.promotion),
                nags: Vec::new(),
                comments_before: Vec::new(),
                comments_after: Vec::new(),
                variations: Vec::new(),
            });
            position = apply_move(&position, record.mov, record.promotion);
        }
        movetext.result = Some(result);

        PgnGame { tags, movetext }
    }

    /// Replays the mainline into a [`Game`].
    ///
    /// Variations, comments, and NAGs stay behind in the tree; the game
    /// receives the tag pairs, the players, and every mainline move. A
    /// `FEN` tag selects the starting position.
    pub fn to_game(&self) -> Result<Game, PgnError> {
        let mut game = match self.tags.get("FEN") {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::new(),
        };

        if let Some(white) = self.tags.get("White") {
            game.players.white = Player::named(white);
        }
        if let Some(black) = self.tags.get("Black") {
            game.players.black = Player::named(black);
        }
        game.tags = self.tags.pairs().to_vec();

        for node in &self.movetext.moves {
            let invalid = || PgnError::InvalidMove(node.notation.clone());
            let (m, promotion) = parse_move(game.position(), &node.notation)
                .map_err(|_| invalid())?;
            match promotion {
                Some(kind) => game.execute_with_promotion(m, kind).map_err(|_| invalid())?,
                None => game.execute(m).map_err(|_| invalid())?,
            }
        }
        Ok(game)
    }
}

/// Splits a PGN document into its tag lines and the rest.
fn split_header(input: &str) -> (String, String) {
    let mut header = String::new();
    let mut rest = String::new();
    let mut in_header = true;

    for line in input.lines() {
        if in_header {
            let trimmed = line.trim_start();
            if trimmed.starts_with('[') {
                header.push_str(line);
                header.push('\n');
                continue;
            }
            if trimmed.is_empty() {
                continue;
            }
            in_header = false;
        }
        rest.push_str(line);
        rest.push('\n');
    }

    (header, rest)
}

/// Wraps serialized movetext at word boundaries.
fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

impl fmt::Display for PgnGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tags)?;
        writeln!(f)?;
        writeln!(f, "{}", wrap(&self.movetext.to_string(), WRAP_COLUMN))
    }
}
