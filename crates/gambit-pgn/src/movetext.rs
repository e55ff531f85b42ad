//! Movetext tree: moves, comments, NAGs, and recursive variations.

use crate::lexer::{tokenize, Diagnostic, DiagnosticLevel, LocatedToken, Token};
use crate::PgnError;
use gambit_core::Color;
use std::fmt;

/// A game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTermination {
    WhiteWins,
    BlackWins,
    Draw,
    Undecided,
}

impl GameTermination {
    /// The PGN spelling of this marker.
    pub const fn as_str(self) -> &'static str {
        match self {
            GameTermination::WhiteWins => "1-0",
            GameTermination::BlackWins => "0-1",
            GameTermination::Draw => "1/2-1/2",
            GameTermination::Undecided => "*",
        }
    }
}

impl fmt::Display for GameTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One half-move in a movetext line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNode {
    /// The fullmove number this half-move belongs to.
    pub number: u16,
    /// Which side played it.
    pub side: Color,
    /// The notation exactly as written; resolution against a position
    /// happens when the game is replayed.
    pub notation: String,
    /// Numeric annotation glyphs attached to this move.
    pub nags: Vec<String>,
    /// Comments between the previous structure and this move.
    pub comments_before: Vec<String>,
    /// Comments directly following this move.
    pub comments_after: Vec<String>,
    /// Alternative lines replacing this half-move.
    pub variations: Vec<Movetext>,
}

impl MoveNode {
    fn new(number: u16, side: Color, notation: String) -> Self {
        MoveNode {
            number,
            side,
            notation,
            nags: Vec::new(),
            comments_before: Vec::new(),
            comments_after: Vec::new(),
            variations: Vec::new(),
        }
    }
}

/// A parsed movetext line, possibly the root of a variation tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Movetext {
    /// Comments before the first move of the line.
    pub leading_comments: Vec<String>,
    /// Variations opened before any move of the line.
    pub leading_variations: Vec<Movetext>,
    /// The half-moves of the line, in order.
    pub moves: Vec<MoveNode>,
    /// Comments and stray tokens after the result marker.
    pub trailing_comments: Vec<String>,
    /// The termination marker, if the line carries one.
    pub result: Option<GameTermination>,
    /// Problems found while parsing; only set on the root line.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Copy)]
struct Context {
    number: u16,
    side: Color,
}

struct Parser {
    tokens: Vec<LocatedToken>,
    idx: usize,
    diagnostics: Vec<Diagnostic>,
    unmatched_paren: bool,
}

impl Movetext {
    /// Parses movetext, collecting diagnostics instead of failing.
    ///
    /// The result is a best-effort tree: structurally broken input still
    /// yields every move that could be read.
    pub fn parse(input: &str) -> Movetext {
        Self::parse_internal(input).0
    }

    /// Parses movetext, failing on lexical structure errors.
    ///
    /// Unlike [`Movetext::parse`], an unclosed comment or an unbalanced
    /// variation parenthesis is returned as an error rather than a
    /// diagnostic.
    pub fn parse_strict(input: &str) -> Result<Movetext, PgnError> {
        let (movetext, unclosed_brace, unmatched_paren) = Self::parse_internal(input);
        if unclosed_brace {
            return Err(PgnError::UnclosedBrace);
        }
        if unmatched_paren {
            return Err(PgnError::UnmatchedParen);
        }
        Ok(movetext)
    }

    fn parse_internal(input: &str) -> (Movetext, bool, bool) {
        let outcome = tokenize(input);
        for diagnostic in &outcome.diagnostics {
            tracing::warn!(%diagnostic, "recovering from malformed movetext");
        }

        let mut parser = Parser {
            tokens: outcome.tokens,
            idx: 0,
            diagnostics: outcome.diagnostics,
            unmatched_paren: false,
        };
        let mut root = parser.parse_line(
            Context {
                number: 1,
                side: Color::White,
            },
            0,
        );
        root.diagnostics = parser.diagnostics;
        (root, outcome.unclosed_brace, parser.unmatched_paren)
    }
}

impl Parser {
    fn report(&mut self, level: DiagnosticLevel, message: String, at: (u32, u32)) {
        let diagnostic = Diagnostic {
            level,
            message,
            line: at.0,
            column: at.1,
        };
        tracing::warn!(%diagnostic, "recovering from malformed movetext");
        self.diagnostics.push(diagnostic);
    }

    fn parse_line(&mut self, mut ctx: Context, depth: u32) -> Movetext {
        let mut line = Movetext::default();
        // Comments waiting for the next move's comments_before.
        let mut pending: Vec<String> = Vec::new();
        // True while comments still belong to the last move's comments_after.
        let mut after_move = false;

        while let Some(located) = self.tokens.get(self.idx).cloned() {
            let at = (located.line, located.column);
            self.idx += 1;

            match located.token {
                Token::Comment(text) => {
                    if line.result.is_some() {
                        line.trailing_comments.push(text);
                    } else if line.moves.is_empty() {
                        line.leading_comments.push(text);
                    } else if after_move {
                        line.moves
                            .last_mut()
                            .expect("moves is non-empty")
                            .comments_after
                            .push(text);
                    } else {
                        pending.push(text);
                    }
                }
                Token::MoveNumber { number, dots } => {
                    ctx.number = number;
                    ctx.side = if dots >= 3 { Color::Black } else { Color::White };
                }
                Token::San(notation) => {
                    if line.result.is_some() {
                        // The line is over; leftovers accumulate as trailing
                        // comments.
                        line.trailing_comments.push(notation);
                        continue;
                    }
                    let mut node = MoveNode::new(ctx.number, ctx.side, notation);
                    node.comments_before = std::mem::take(&mut pending);
                    line.moves.push(node);
                    if ctx.side == Color::Black {
                        ctx.number += 1;
                    }
                    ctx.side = ctx.side.opposite();
                    after_move = true;
                }
                Token::Nag(nag) => {
                    if line.result.is_some() {
                        line.trailing_comments.push(nag);
                    } else if let Some(last) = line.moves.last_mut() {
                        last.nags.push(nag);
                    } else {
                        self.report(
                            DiagnosticLevel::Warning,
                            format!("annotation '{}' with no move to attach to", nag),
                            at,
                        );
                    }
                }
                Token::VariationStart => {
                    // The variation replaces the last half-move, so it
                    // restarts from that move's slot.
                    if let Some(last) = line.moves.last() {
                        let sub_ctx = Context {
                            number: last.number,
                            side: last.side,
                        };
                        let sub = self.parse_line(sub_ctx, depth + 1);
                        line.moves
                            .last_mut()
                            .expect("moves is non-empty")
                            .variations
                            .push(sub);
                    } else {
                        let sub = self.parse_line(ctx, depth + 1);
                        line.leading_variations.push(sub);
                    }
                    after_move = false;
                }
                Token::VariationEnd => {
                    if depth > 0 {
                        return line;
                    }
                    self.unmatched_paren = true;
                    self.report(
                        DiagnosticLevel::Error,
                        "unexpected ')' outside any variation".to_string(),
                        at,
                    );
                }
                Token::Termination(result) => {
                    if line.result.is_some() {
                        self.report(
                            DiagnosticLevel::Warning,
                            format!("extra result marker '{}'; keeping the first", result),
                            at,
                        );
                    } else {
                        line.result = Some(result);
                    }
                }
            }
        }

        if depth > 0 {
            self.unmatched_paren = true;
            self.report(
                DiagnosticLevel::Error,
                "variation is missing its closing ')'".to_string(),
                (0, 0),
            );
        }
        line
    }
}

impl fmt::Display for Movetext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        for comment in &self.leading_comments {
            parts.push(format!("{{{}}}", comment));
        }
        for variation in &self.leading_variations {
            parts.push(format!("({})", variation));
        }

        // Black needs its "N..." indicator at the line start, after any
        // interruption (comment or variation), and whenever it does not
        // directly answer the white move of the same number.
        let mut need_number = true;
        let mut prev: Option<(u16, Color)> = None;
        for node in &self.moves {
            for comment in &node.comments_before {
                parts.push(format!("{{{}}}", comment));
                need_number = true;
            }
            let answers_white = prev == Some((node.number, Color::White));
            match node.side {
                Color::White => parts.push(format!("{}.", node.number)),
                Color::Black if need_number || !answers_white => {
                    parts.push(format!("{}...", node.number))
                }
                Color::Black => {}
            }
            prev = Some((node.number, node.side));
            parts.push(node.notation.clone());
            parts.extend(node.nags.iter().cloned());
            need_number = false;
            for comment in &node.comments_after {
                parts.push(format!("{{{}}}", comment));
                need_number = true;
            }
            for variation in &node.variations {
                parts.push(format!("({})", variation));
                need_number = true;
            }
        }

        if let Some(result) = self.result {
            parts.push(result.as_str().to_string());
        }
        for comment in &self.trailing_comments {
            parts.push(format!("{{{}}}", comment));
        }

        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notations(movetext: &Movetext) -> Vec<&str> {
        movetext.moves.iter().map(|m| m.notation.as_str()).collect()
    }

    #[test]
    fn parses_a_plain_line() {
        let tree = Movetext::parse("1. e4 e5 2. Nf3 Nc6 1-0");
        assert_eq!(notations(&tree), ["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(tree.result, Some(GameTermination::WhiteWins));
        assert!(tree.diagnostics.is_empty());

        assert_eq!(tree.moves[0].number, 1);
        assert_eq!(tree.moves[0].side, Color::White);
        assert_eq!(tree.moves[1].number, 1);
        assert_eq!(tree.moves[1].side, Color::Black);
        assert_eq!(tree.moves[2].number, 2);
        assert_eq!(tree.moves[3].side, Color::Black);
    }

    #[test]
    fn continuation_numbers_set_the_side() {
        let tree = Movetext::parse("3... Nc6 4. Bb5");
        assert_eq!(tree.moves[0].side, Color::Black);
        assert_eq!(tree.moves[0].number, 3);
        assert_eq!(tree.moves[1].side, Color::White);
        assert_eq!(tree.moves[1].number, 4);
    }

    #[test]
    fn comments_attach_where_they_fall() {
        let tree = Movetext::parse("{start} 1. e4 {after e4} (1. d4) {before e5} 1... e5 *");
        assert_eq!(tree.leading_comments, ["start"]);
        assert_eq!(tree.moves[0].comments_after, ["after e4"]);
        assert_eq!(tree.moves[1].comments_before, ["before e5"]);
        assert_eq!(tree.result, Some(GameTermination::Undecided));
    }

    #[test]
    fn nags_attach_to_the_last_move() {
        let tree = Movetext::parse("1. e4 $1 e5 $2 $13");
        assert_eq!(tree.moves[0].nags, ["$1"]);
        assert_eq!(tree.moves[1].nags, ["$2", "$13"]);
    }

    #[test]
    fn nag_without_a_move_is_diagnosed() {
        let tree = Movetext::parse("$4 1. e4");
        assert_eq!(tree.diagnostics.len(), 1);
        assert_eq!(tree.diagnostics[0].level, DiagnosticLevel::Warning);
        assert!(tree.moves[0].nags.is_empty());
    }

    #[test]
    fn variation_replaces_the_previous_half_move() {
        let tree = Movetext::parse("1. e4 e5 2. Nf3 (2. Nc3 Nc6) Nc6 3. Bb5 a6 1/2-1/2");

        assert_eq!(notations(&tree), ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(tree.result, Some(GameTermination::Draw));

        let nf3 = &tree.moves[2];
        assert_eq!(nf3.variations.len(), 1);
        let variation = &nf3.variations[0];
        assert_eq!(notations(variation), ["Nc3", "Nc6"]);
        // The variation's first move sits in the same slot as the move it
        // replaces.
        assert_eq!(variation.moves[0].number, 2);
        assert_eq!(variation.moves[0].side, Color::White);
        assert_eq!(variation.moves[1].side, Color::Black);

        // Three mainline moves follow the branch point.
        assert_eq!(
            notations(&tree)[3..],
            ["Nc6", "Bb5", "a6"]
        );
    }

    #[test]
    fn variation_without_number_inherits_the_context() {
        let tree = Movetext::parse("1. e4 e5 2. Nf3 (Nc3 Nc6) Nc6");
        let variation = &tree.moves[2].variations[0];
        assert_eq!(variation.moves[0].number, 2);
        assert_eq!(variation.moves[0].side, Color::White);
    }

    #[test]
    fn nested_variations() {
        let tree = Movetext::parse("1. e4 e5 (1... c5 2. Nf3 (2. c3 d5)) 2. Nf3");
        let sicilian = &tree.moves[1].variations[0];
        assert_eq!(notations(sicilian), ["c5", "Nf3"]);
        let alapin = &sicilian.moves[1].variations[0];
        assert_eq!(notations(alapin), ["c3", "d5"]);
        assert_eq!(alapin.moves[0].number, 2);
    }

    #[test]
    fn variation_before_any_move_is_leading() {
        let tree = Movetext::parse("(1. d4 d5) 1. e4");
        assert_eq!(tree.leading_variations.len(), 1);
        assert_eq!(notations(&tree.leading_variations[0]), ["d4", "d5"]);
        assert_eq!(notations(&tree), ["e4"]);
    }

    #[test]
    fn tokens_after_the_result_become_trailing_comments() {
        let tree = Movetext::parse("1. e4 e5 1-0 {well played} e4");
        assert_eq!(tree.result, Some(GameTermination::WhiteWins));
        assert_eq!(tree.trailing_comments, ["well played", "e4"]);
        assert_eq!(tree.moves.len(), 2);
    }

    #[test]
    fn extra_result_markers_keep_the_first() {
        let tree = Movetext::parse("1. e4 1-0 0-1");
        assert_eq!(tree.result, Some(GameTermination::WhiteWins));
        assert_eq!(tree.diagnostics.len(), 1);
    }

    #[test]
    fn unexpected_close_paren_at_top_level() {
        let tree = Movetext::parse("1. e4 ) e5");
        assert_eq!(notations(&tree), ["e4", "e5"]);
        assert!(tree
            .diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error));
        assert!(Movetext::parse_strict("1. e4 ) e5").is_err());
    }

    #[test]
    fn unclosed_variation_is_diagnosed() {
        let tree = Movetext::parse("1. e4 e5 (2. d4 d5");
        assert_eq!(notations(&tree), ["e4", "e5"]);
        assert_eq!(notations(&tree.moves[1].variations[0]), ["d4", "d5"]);
        assert!(matches!(
            Movetext::parse_strict("1. e4 e5 (2. d4 d5"),
            Err(PgnError::UnmatchedParen)
        ));
    }

    #[test]
    fn unclosed_brace_is_strict_error() {
        assert!(matches!(
            Movetext::parse_strict("1. e4 {oops"),
            Err(PgnError::UnclosedBrace)
        ));
        // The resilient parser still delivers the tree.
        let tree = Movetext::parse("1. e4 {oops");
        assert_eq!(tree.moves[0].comments_after, ["oops"]);
    }

    #[test]
    fn serializes_numbering_and_structures() {
        let text = "1. e4 e5 2. Nf3 (2. Nc3 Nc6) 2... Nc6 3. Bb5 a6 1/2-1/2";
        let tree = Movetext::parse(text);
        assert_eq!(tree.to_string(), text);
    }

    #[test]
    fn roundtrip_is_a_fixpoint() {
        for text in [
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 1-0",
            "{start} 1. e4 {sharp} e5 (1... c5 $1 2. Nf3 (2. c3 d5)) 2. Nf3 $14 *",
            "(1. d4) 1. e4 e5 0-1 {post-mortem}",
            "1. e4 $1 $18 e5 2... Nc6",
        ] {
            let tree = Movetext::parse(text);
            assert!(tree.diagnostics.is_empty(), "diagnostics for {:?}", text);
            let serialized = tree.to_string();
            let reparsed = Movetext::parse(&serialized);
            assert_eq!(tree, reparsed, "round trip changed {:?}", text);
        }
    }
}
