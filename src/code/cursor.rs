//! Sequential word cursor over an encoded program.

use crate::code::error::{DecodeError, DecodeResult};

/// Forward-only cursor over a compiled program.
///
/// `position` counts the words consumed so far. It only grows, by exactly one
/// per consumed word, and every skip-field check in the decoder is expressed
/// against it.
#[derive(Debug, Clone)]
pub struct WordCursor<'w> {
    words: &'w [u32],
    position: usize,
}

impl<'w> WordCursor<'w> {
    /// Creates a cursor at position `0`.
    pub fn new(words: &'w [u32]) -> Self {
        Self { words, position: 0 }
    }

    /// Returns the number of words consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of words not yet consumed.
    pub fn remaining(&self) -> usize {
        self.words.len() - self.position
    }

    /// Returns `true` once every word has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.words.len()
    }

    /// Consumes and returns the next word.
    pub fn next_word(&mut self) -> DecodeResult<u32> {
        let word = self
            .words
            .get(self.position)
            .copied()
            .ok_or_else(|| DecodeError::exhausted_input(self.position))?;
        self.position += 1;
        Ok(word)
    }

    /// Consumes exactly `N` words into a fixed-size array.
    pub fn next_array<const N: usize>(&mut self) -> DecodeResult<[u32; N]> {
        let mut out = [0u32; N];
        for slot in &mut out {
            *slot = self.next_word()?;
        }
        Ok(out)
    }

    /// Consumes `count` words into a vector.
    pub fn next_words(&mut self, count: usize) -> DecodeResult<Vec<u32>> {
        // Reservation is capped at the words actually left.
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            out.push(self.next_word()?);
        }
        Ok(out)
    }

    /// Returns the word at absolute `index` without consuming anything.
    ///
    /// Only the conditional-block decoder needs this: the encoding gives no
    /// other way to tell a then-only block from a then/else block.
    pub fn peek_at(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }
}
