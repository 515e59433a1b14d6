//! Shell-like line parsing for the embedded terminal.
//!
//! Two passes, both infallible: [`split_commands`] cuts a submitted line into `;`-separated
//! segments while keeping quoting intact, then [`tokenize`] turns one segment into argv tokens.
//! Malformed quoting degrades gracefully instead of failing the line.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Separator between chained command segments.
pub const SEGMENT_SEPARATOR: char = ';';

/// One parsed command segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Trimmed raw segment text, quoting preserved.
    pub raw: String,
    /// Tokens produced by [`tokenize`].
    pub tokens: Vec<String>,
}

impl Segment {
    /// Parses one raw segment.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let tokens = tokenize(&raw);
        Self { raw, tokens }
    }

    /// Returns the command name token, if any.
    pub fn head(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Returns the argument tokens after the head.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }
}

/// Splits a submitted line into trimmed, non-empty segments.
///
/// Quote characters and escapes are copied through verbatim; they only decide whether a `;` is
/// live. A backslash escapes only inside quotes, so an unquoted `;` always splits. An
/// unterminated quote swallows the rest of the line into the final segment.
pub fn split_commands(line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = line.trim().chars();
    let mut quote = None::<char>;

    while let Some(ch) = chars.next() {
        match quote {
            Some(_) if ch == '\\' => {
                current.push(ch);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(active) if ch == active => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == SEGMENT_SEPARATOR => push_segment(&mut segments, &mut current),
            None => current.push(ch),
        }
    }

    push_segment(&mut segments, &mut current);
    segments
}

fn push_segment(segments: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
    current.clear();
}

/// Splits one segment into argv tokens.
///
/// Whitespace outside quotes separates tokens, `\` makes the next character literal, and quote
/// characters are dropped from the token text. A trailing lone `\` is kept as-is.
pub fn tokenize(segment: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = segment.trim().chars().peekable();
    let mut quote = None::<char>;

    while let Some(ch) = chars.next() {
        match quote {
            Some(_) if ch == '\\' && chars.peek().is_some() => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(active) if ch == active => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\\' && chars.peek().is_some() => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Parses a full line into segments with their tokens.
pub fn parse_line(line: &str) -> Vec<Segment> {
    split_commands(line).into_iter().map(Segment::parse).collect()
}
