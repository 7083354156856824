//! Spaced-repetition review engine.
//!
//! Chooses the next due vocabulary entry, selects a question format based
//! on the learning stage, grades submitted answers, and reschedules.

mod engine;
mod question;
mod scheduler;
mod session;

pub use engine::{QuestionTurn, ReviewEngine, ReviewFeedback};
pub use question::{build_question, sample_distractors, scramble_word, Question, QuestionFormat};
pub use scheduler::{ReviewScheduler, ReviewUpdate};
pub use session::{ReviewSession, ScrambledAttempt};
