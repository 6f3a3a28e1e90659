//! Thread reference parsing.
//!
//! A thread URL looks like `https://boards.4chan.org/c/thread/4322780`: five
//! `/` separators, the board between the third and fourth, the thread id after
//! the fifth. Anything else is rejected up front rather than guessed at.

use thiserror::Error;

/// Number of `/` characters a canonical thread URL contains.
const EXPECTED_SLASHES: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadRefError {
    #[error("Malformed address: expected 5 '/' separators, found {found}")]
    SlashCount { found: usize },

    #[error("Malformed address: empty {0}")]
    EmptySegment(&'static str),
}

/// Board and thread id of the watched thread. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub board: String,
    pub thread_id: String,
}

impl ThreadRef {
    pub fn parse(address: &str) -> Result<Self, ThreadRefError> {
        let slashes: Vec<usize> = address
            .char_indices()
            .filter(|&(_, c)| c == '/')
            .map(|(i, _)| i)
            .collect();
        if slashes.len() != EXPECTED_SLASHES {
            return Err(ThreadRefError::SlashCount {
                found: slashes.len(),
            });
        }

        let board = &address[slashes[2] + 1..slashes[3]];
        let thread_id = &address[slashes[4] + 1..];
        if board.is_empty() {
            return Err(ThreadRefError::EmptySegment("board"));
        }
        if thread_id.is_empty() {
            return Err(ThreadRefError::EmptySegment("thread id"));
        }

        Ok(Self {
            board: board.to_string(),
            thread_id: thread_id.to_string(),
        })
    }
}

impl std::fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.board, self.thread_id)
    }
}
