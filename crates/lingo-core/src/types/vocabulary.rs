//! Vocabulary entry type and its review-scheduling fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vocabulary word owned by a user, with spaced-repetition state.
///
/// The scheduling fields (`next_review`, `interval`, `ease_factor`,
/// `learning_stage`) are mutated only by the grading step of the review
/// engine, always together in one committed update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: String,
    /// The word in the language being learned.
    pub word: String,
    /// Translation in the user's language.
    pub translation: String,
    /// Optional pronunciation audio URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_url: Option<String>,
    /// When the word is next due for review. At creation this is the
    /// creation instant, so a new word is immediately due.
    pub next_review: DateTime<Utc>,
    /// Current review interval in fractional days.
    pub interval: f64,
    /// Ease factor, bounded [1.3, 2.5]. Lower means shorter intervals.
    pub ease_factor: f64,
    /// Learning stage: 0 is new; higher stages use harder question formats.
    pub learning_stage: u32,
}

impl VocabularyEntry {
    /// Check whether this entry is due for review.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// The answer the user must produce at the current stage.
    ///
    /// Even stages ask for the word (the translation is shown), odd stages
    /// ask for the translation. This parity rule holds across all formats:
    /// multiple choice, unscramble, and free text.
    pub fn expected_answer(&self) -> &str {
        if self.learning_stage % 2 == 0 {
            &self.word
        } else {
            &self.translation
        }
    }

    /// The prompt shown to the user at the current stage.
    pub fn prompt(&self) -> &str {
        if self.learning_stage % 2 == 0 {
            &self.translation
        } else {
            &self.word
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(stage: u32) -> VocabularyEntry {
        VocabularyEntry {
            id: 1,
            user_id: "u1".to_string(),
            word: "chat".to_string(),
            translation: "cat".to_string(),
            pronunciation_url: None,
            next_review: Utc::now(),
            interval: 0.0,
            ease_factor: 2.5,
            learning_stage: stage,
        }
    }

    #[test]
    fn test_expected_answer_parity() {
        assert_eq!(entry(0).expected_answer(), "chat");
        assert_eq!(entry(1).expected_answer(), "cat");
        assert_eq!(entry(2).expected_answer(), "chat");
        assert_eq!(entry(3).expected_answer(), "cat");
        assert_eq!(entry(4).expected_answer(), "chat");
    }

    #[test]
    fn test_prompt_is_opposite_side() {
        for stage in 0..6 {
            let e = entry(stage);
            assert_ne!(e.prompt(), e.expected_answer());
        }
    }
}
