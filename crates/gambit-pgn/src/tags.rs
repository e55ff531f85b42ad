//! PGN tag-pair section.

use crate::PgnError;
use std::fmt;

/// The ordered tag pairs of a PGN game.
///
/// Order is preserved so that games round-trip; lookups go by key. Unknown
/// tags pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags {
    pairs: Vec<(String, String)>,
}

impl Tags {
    /// The seven tags every archival PGN game must carry, in export order.
    pub const SEVEN_TAG_ROSTER: [&'static str; 7] =
        ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

    /// Creates an empty tag section.
    pub fn new() -> Self {
        Tags::default()
    }

    /// Returns the value of a tag.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a tag, replacing an existing value or appending a new pair.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Sets a tag only when it is still missing.
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        if self.get(key).is_none() {
            self.set(key, value);
        }
    }

    /// Returns the pairs in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the roster tags missing from this section.
    pub fn missing_roster_tags(&self) -> Vec<&'static str> {
        Self::SEVEN_TAG_ROSTER
            .into_iter()
            .filter(|key| self.get(key).is_none())
            .collect()
    }

    /// Parses a tag section: one `[Key "Value"]` per line, any order.
    pub fn parse(header: &str) -> Result<Self, PgnError> {
        let mut tags = Tags::new();
        for line in header.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = parse_tag_line(line)?;
            tags.set(key, value);
        }
        Ok(tags)
    }
}

fn parse_tag_line(line: &str) -> Result<(String, String), PgnError> {
    let malformed = || PgnError::InvalidPgn(format!("malformed tag pair '{}'", line));

    let inner = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(malformed)?;

    let (key, rest) = inner.split_once(char::is_whitespace).ok_or_else(malformed)?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed());
    }

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('"').ok_or_else(malformed)?;

    // Unescape up to the closing quote; \" and \\ are the only escapes.
    let mut value = String::new();
    let mut chars = rest.chars();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => value.push(escaped),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => return Err(malformed()),
            },
            '"' => {
                closed = true;
                break;
            }
            _ => value.push(c),
        }
    }
    if !closed || !chars.as_str().trim().is_empty() {
        return Err(malformed());
    }

    Ok((key.to_string(), value))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.pairs {
            writeln!(f, "[{} \"{}\"]", key, escape(value))?;
        }
        Ok(())
    }
}
