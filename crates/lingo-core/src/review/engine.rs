//! Review engine: ties the due-word query, question construction, and the
//! scheduler together over the vocabulary store.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LingoResult;
use crate::normalize::answers_match;
use crate::review::question::{build_question, Question};
use crate::review::scheduler::ReviewScheduler;
use crate::review::session::ReviewSession;
use crate::store::VocabularyStore;
use crate::types::VocabularyEntry;

/// The next question in a review cycle, with progress counters for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTurn {
    pub question: Question,
    /// 1-based position within the current due list.
    pub position: usize,
    pub total_due: usize,
}

/// Outcome of grading one submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFeedback {
    pub correct: bool,
    /// Human-readable feedback for the user.
    pub message: String,
    /// The entry with its rescheduled review state.
    pub entry: VocabularyEntry,
}

/// Spaced-repetition review engine for one vocabulary store.
pub struct ReviewEngine {
    store: VocabularyStore,
    scheduler: ReviewScheduler,
}

impl ReviewEngine {
    /// Create an engine over a vocabulary store with default scheduling.
    pub fn new(store: VocabularyStore) -> Self {
        Self {
            store,
            scheduler: ReviewScheduler::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    /// Compute the next question for a user's review cycle.
    ///
    /// Returns `Ok(None)` when nothing is due. The due list and the
    /// distractor pool are recomputed per call; the session only carries
    /// the pointer and any in-flight scrambled attempt.
    pub fn next_question<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        session: &mut ReviewSession,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> LingoResult<Option<QuestionTurn>> {
        let due = self.store.due_words(user_id, now)?;
        let index = match session.select(due.len()) {
            Some(index) => index,
            None => return Ok(None),
        };
        let entry = &due[index];

        let pool: Vec<VocabularyEntry> = self
            .store
            .list(user_id)?
            .into_iter()
            .filter(|other| other.id != entry.id)
            .collect();

        let question = build_question(entry, &pool, session, rng);
        Ok(Some(QuestionTurn {
            question,
            position: index + 1,
            total_due: due.len(),
        }))
    }

    /// Grade a submitted answer and commit the rescheduled state.
    ///
    /// The expected answer is the word or the translation depending on
    /// stage parity; comparison is over normalized text. The session
    /// pointer advances past the graded word.
    pub fn submit_answer(
        &self,
        user_id: &str,
        word_id: i64,
        answer: &str,
        session: &mut ReviewSession,
        now: DateTime<Utc>,
    ) -> LingoResult<ReviewFeedback> {
        let entry = self.store.get_owned(word_id, user_id)?;
        let expected = entry.expected_answer().to_string();
        let correct = answers_match(answer, &expected);

        let update = self.scheduler.apply(&entry, correct, now);
        let entry = self.store.apply_review(word_id, user_id, &update)?;
        session.advance();

        debug!(
            word_id,
            correct,
            stage = entry.learning_stage,
            "graded review answer"
        );

        let message = if correct {
            "Correct!".to_string()
        } else {
            format!("Incorrect! The correct answer was \"{}\".", expected)
        };

        Ok(ReviewFeedback {
            correct,
            message,
            entry,
        })
    }
}
