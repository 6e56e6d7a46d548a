//! Char/byte offset mapping and word edges
//!
//! Spans are expressed in chars while the regex engines and `str` slicing work
//! in bytes. [`OffsetMap`] converts between the two for one piece of text.
//! [`WordEdges`] stretches a span over the word it sits in.

use crate::domain::{RedactorError, Result};
use crate::redaction::models::Span;
use regex::Regex;

/// Offset table for a single text
///
/// Pure-ASCII text (the common case) needs no table: char and byte offsets
/// coincide.
#[derive(Debug, Clone)]
pub struct OffsetMap<'a> {
    text: &'a str,
    /// Byte offset of every char start, plus `text.len()` as a sentinel
    boundaries: Option<Vec<usize>>,
}

impl<'a> OffsetMap<'a> {
    /// Build the offset table for `text`
    pub fn new(text: &'a str) -> Self {
        let boundaries = if text.is_ascii() {
            None
        } else {
            Some(
                text.char_indices()
                    .map(|(byte, _)| byte)
                    .chain(std::iter::once(text.len()))
                    .collect(),
            )
        };
        Self { text, boundaries }
    }

    /// The text this table was built for
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Length of the text in chars
    pub fn char_len(&self) -> usize {
        match &self.boundaries {
            None => self.text.len(),
            Some(b) => b.len() - 1,
        }
    }

    /// Convert a byte offset to a char offset
    ///
    /// Returns `None` if the offset is past the end or not on a char boundary.
    pub fn to_char(&self, byte: usize) -> Option<usize> {
        match &self.boundaries {
            None => (byte <= self.text.len()).then_some(byte),
            Some(b) => b.binary_search(&byte).ok(),
        }
    }

    /// Convert a char offset to a byte offset
    ///
    /// Returns `None` if the offset is past the end.
    pub fn to_byte(&self, ch: usize) -> Option<usize> {
        match &self.boundaries {
            None => (ch <= self.text.len()).then_some(ch),
            Some(b) => b.get(ch).copied(),
        }
    }

    /// Convert a byte range to a char range
    pub fn char_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        Some((self.to_char(start)?, self.to_char(end)?))
    }

    /// Convert a char range to a byte range
    pub fn byte_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        Some((self.to_byte(start)?, self.to_byte(end)?))
    }
}

/// Stretches recognizer spans to whole words
///
/// A widened span has no word character (`\w`, as the matchers see it) on
/// either side, and no `(` or `+` directly after it. Replacing it with a
/// placeholder therefore never creates a word boundary or an unguarded phone
/// prefix that the pattern matchers did not already see.
#[derive(Debug, Clone)]
pub struct WordEdges {
    word: Regex,
}

impl WordEdges {
    /// Create the word classifier
    pub fn new() -> Result<Self> {
        let word = Regex::new(r"^\w$")
            .map_err(|e| RedactorError::pattern_fault("word", format!("invalid pattern: {e}")))?;
        Ok(Self { word })
    }

    fn is_word(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.word.is_match(c.encode_utf8(&mut buf))
    }

    /// Widen `span` to the enclosing word
    ///
    /// Returns `None` if the span does not lie within the mapped text.
    pub fn widen(&self, map: &OffsetMap<'_>, span: Span) -> Option<Span> {
        let text = map.text();
        let (start, end) = map.byte_range(span.start, span.end)?;

        let start = text[..start]
            .char_indices()
            .rev()
            .take_while(|&(_, c)| self.is_word(c))
            .last()
            .map_or(start, |(i, _)| i);
        let end = text[end..]
            .char_indices()
            .take_while(|&(_, c)| self.is_word(c) || c == '(' || c == '+')
            .last()
            .map_or(end, |(i, c)| end + i + c.len_utf8());

        let (start, end) = map.char_range(start, end)?;
        Some(Span { start, end, ..span })
    }
}
