//! Ephemeral per-user review session state.
//!
//! The session is threaded through the engine as an explicit parameter; it
//! is never persisted and dies with the HTTP session that owns it.

use serde::{Deserialize, Serialize};

/// A scrambled rendering of one word, generated when stage 2 is entered
/// and kept so re-renders of the same attempt show the same letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambledAttempt {
    pub word_id: i64,
    pub letters: String,
}

/// Transient review-cycle state for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSession {
    /// Pointer into the current due-word list.
    pub current_word_index: usize,
    /// Scrambled letters for the current stage-2 attempt, if any.
    pub scrambled: Option<ScrambledAttempt>,
}

impl ReviewSession {
    /// Create a fresh session at the start of the due list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the pointer against the current due-list length.
    ///
    /// Returns `None` when nothing is due. A pointer past the end of the
    /// list (the list shrank between requests) resets to 0 rather than
    /// failing.
    pub fn select(&mut self, due_count: usize) -> Option<usize> {
        if due_count == 0 {
            return None;
        }
        if self.current_word_index >= due_count {
            self.current_word_index = 0;
        }
        Some(self.current_word_index)
    }

    /// Move to the next word after a grading event.
    pub fn advance(&mut self) {
        self.current_word_index += 1;
    }

    /// The stored scrambled letters for a word, if this session has them.
    pub fn scrambled_for(&self, word_id: i64) -> Option<&str> {
        self.scrambled
            .as_ref()
            .filter(|attempt| attempt.word_id == word_id)
            .map(|attempt| attempt.letters.as_str())
    }

    /// Store the scrambled letters for a stage-2 attempt, replacing any
    /// previous attempt. Stale state for words the user has advanced past
    /// is a benign leftover; it is only ever overwritten here.
    pub fn set_scrambled(&mut self, word_id: i64, letters: impl Into<String>) {
        self.scrambled = Some(ScrambledAttempt {
            word_id,
            letters: letters.into(),
        });
    }
}
