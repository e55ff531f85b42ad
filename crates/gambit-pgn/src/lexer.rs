//! Movetext lexer.
//!
//! Splits raw movetext into tokens while tracking line and column for
//! diagnostics. The lexer never fails: unrecognized input becomes a
//! diagnostic and is skipped.

use crate::movetext::GameTermination;
use std::fmt;

/// A movetext token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Digits followed by dots ("1.", "3...", or a bare number). Three or
    /// more dots mean the following move is black's.
    MoveNumber { number: u16, dots: u8 },
    /// A move word in any algebraic notation; validated later, against the
    /// position it applies to.
    San(String),
    /// A numeric annotation glyph ("$1").
    Nag(String),
    /// A `{...}` or `;...` comment, trimmed.
    Comment(String),
    /// `(` - starts a recursive variation.
    VariationStart,
    /// `)` - ends a variation.
    VariationEnd,
    /// A game termination marker.
    Termination(GameTermination),
}

/// A token plus where it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedToken {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

/// Severity of a parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

/// A non-fatal problem found while parsing PGN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        write!(f, "{}:{}: {}: {}", self.line, self.column, level, self.message)
    }
}

pub(crate) struct LexOutcome {
    pub tokens: Vec<LocatedToken>,
    pub diagnostics: Vec<Diagnostic>,
    /// A '{' comment ran to the end of the input.
    pub unclosed_brace: bool,
}

struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, literal: &str) -> bool {
        let mut i = self.idx;
        for expected in literal.chars() {
            if self.chars.get(i) != Some(&expected) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// True when `literal` starts here and ends at a token boundary.
    fn matches_word(&self, literal: &str) -> bool {
        self.starts_with(literal)
            && self
                .chars
                .get(self.idx + literal.chars().count())
                .map_or(true, |&next| Self::is_boundary(next))
    }

    /// True when the character cannot continue a word token.
    fn is_boundary(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | ';' | '$')
    }
}

/// Characters that may appear inside a SAN-ish word.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '=' | '!' | '?' | '-' | '@' | '/')
}

/// Tokenizes movetext, reporting problems instead of failing.
pub(crate) fn tokenize(input: &str) -> LexOutcome {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        idx: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut unclosed_brace = false;

    while let Some(c) = lexer.peek() {
        let (line, column) = (lexer.line, lexer.column);
        let mut push = |token| tokens.push(LocatedToken { token, line, column });

        match c {
            _ if c.is_whitespace() => {
                lexer.bump();
            }
            '{' => {
                lexer.bump();
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = lexer.bump() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    unclosed_brace = true;
                    diagnostics.push(Diagnostic {
                        level: DiagnosticLevel::Error,
                        message: "unclosed '{' comment".to_string(),
                        line,
                        column,
                    });
                }
                push(Token::Comment(text.trim().to_string()));
            }
            ';' => {
                lexer.bump();
                let mut text = String::new();
                while let Some(c) = lexer.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    lexer.bump();
                }
                push(Token::Comment(text.trim().to_string()));
            }
            '(' => {
                lexer.bump();
                push(Token::VariationStart);
            }
            ')' => {
                lexer.bump();
                push(Token::VariationEnd);
            }
            '$' => {
                lexer.bump();
                let mut digits = String::new();
                while let Some(c) = lexer.peek() {
                    if c.is_ascii_digit() {
                        digits.push(c);
                        lexer.bump();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() {
                    diagnostics.push(Diagnostic {
                        level: DiagnosticLevel::Warning,
                        message: "'$' with no annotation number".to_string(),
                        line,
                        column,
                    });
                } else {
                    push(Token::Nag(format!("${}", digits)));
                }
            }
            '*' => {
                lexer.bump();
                push(Token::Termination(GameTermination::Undecided));
            }
            _ if c.is_ascii_digit() => {
                // Result literals and zero-style castling win over move
                // numbers.
                let termination = [
                    ("1/2-1/2", GameTermination::Draw),
                    ("1-0", GameTermination::WhiteWins),
                    ("0-1", GameTermination::BlackWins),
                ]
                .into_iter()
                .find(|(literal, _)| lexer.matches_word(literal));

                if let Some((literal, result)) = termination {
                    for _ in 0..literal.len() {
                        lexer.bump();
                    }
                    push(Token::Termination(result));
                    continue;
                }

                if let Some(castle) = ["0-0-0", "0-0"]
                    .into_iter()
                    .find(|literal| lexer.matches_word(literal))
                {
                    for _ in 0..castle.len() {
                        lexer.bump();
                    }
                    push(Token::San(castle.to_string()));
                    continue;
                }

                let mut digits = String::new();
                while let Some(c) = lexer.peek() {
                    if c.is_ascii_digit() {
                        digits.push(c);
                        lexer.bump();
                    } else {
                        break;
                    }
                }
                let mut dots = 0u8;
                while lexer.peek() == Some('.') {
                    dots = dots.saturating_add(1);
                    lexer.bump();
                }
                let number = digits.parse::<u16>().unwrap_or_else(|_| {
                    diagnostics.push(Diagnostic {
                        level: DiagnosticLevel::Warning,
                        message: format!("move number '{}' out of range", digits),
                        line,
                        column,
                    });
                    0
                });
                push(Token::MoveNumber { number, dots });
            }
            _ if is_word_char(c) => {
                let mut word = String::new();
                while let Some(c) = lexer.peek() {
                    if is_word_char(c) {
                        word.push(c);
                        lexer.bump();
                    } else {
                        break;
                    }
                }
                push(Token::San(word));
            }
            _ => {
                lexer.bump();
                diagnostics.push(Diagnostic {
                    level: DiagnosticLevel::Warning,
                    message: format!("unknown token '{}'", c),
                    line,
                    column,
                });
            }
        }
    }

    LexOutcome {
        tokens,
        diagnostics,
        unclosed_brace,
    }
}
