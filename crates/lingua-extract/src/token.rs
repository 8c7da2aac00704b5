//! Token stream with explicit consumption tracking.
//!
//! Extraction works over an ordered, index-addressable list of normalized
//! words. Resolvers never mutate the word list; instead each recognized
//! span is marked consumed, and the leftover text is produced by filtering
//! out consumed indices. Consumption is monotonic — a consumed index is
//! never reinterpreted — and spans must not overlap.

use std::ops::Range;

/// A normalized word sequence with per-index consumption marks.
#[derive(Debug, Clone)]
pub(crate) struct TokenStream {
    words: Vec<String>,
    consumed: Vec<bool>,
}

impl TokenStream {
    /// Split `text` on whitespace, lowercase each word, and strip clinging
    /// sentence punctuation. Apostrophes and hyphens are kept ("o'clock",
    /// "twenty-two").
    pub fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();
        let consumed = vec![false; words.len()];
        Self { words, consumed }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// The word at `i`, or `None` past the end. Consumption does not hide
    /// a word; callers check [`is_consumed`](Self::is_consumed) when it
    /// matters.
    pub fn word(&self, i: usize) -> Option<&str> {
        self.words.get(i).map(String::as_str)
    }

    /// The word at `i` only if it has not been consumed.
    pub fn live(&self, i: usize) -> Option<&str> {
        if self.is_consumed(i) {
            None
        } else {
            self.word(i)
        }
    }

    pub fn is_consumed(&self, i: usize) -> bool {
        self.consumed.get(i).copied().unwrap_or(false)
    }

    /// Mark `span` consumed. Overlapping an already-consumed index is a
    /// logic error in the caller.
    pub fn consume(&mut self, span: Range<usize>) {
        for i in span {
            debug_assert!(!self.consumed[i], "token {i} consumed twice");
            self.consumed[i] = true;
        }
    }

    /// Unconsumed words rejoined with single spaces, trimmed.
    pub fn leftover(&self) -> String {
        let mut out = String::new();
        for (i, w) in self.words.iter().enumerate() {
            if self.consumed[i] {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(w);
        }
        out
    }
}
