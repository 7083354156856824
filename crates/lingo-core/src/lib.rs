//! lingo-core - Core library for lingo.
//!
//! This crate provides the vocabulary review engine (spaced repetition),
//! the test grading engine (inline answer markup), answer normalization,
//! and the SQLite-backed stores behind them.
//!
//! # Example
//!
//! ```ignore
//! use lingo_core::{ReviewEngine, ReviewSession, VocabularyStore};
//!
//! let store = VocabularyStore::new("vocabulary.db")?;
//! let engine = ReviewEngine::new(store);
//!
//! let mut session = ReviewSession::new();
//! let mut rng = rand::thread_rng();
//! if let Some(turn) = engine.next_question("user1", &mut session, chrono::Utc::now(), &mut rng)? {
//!     // render turn.question, then grade the submission:
//!     let feedback = engine.submit_answer(
//!         "user1", turn.question.word_id, "chat", &mut session, chrono::Utc::now(),
//!     )?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod grading;
pub mod normalize;
pub mod review;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ErrorCode, LingoError, LingoResult};
pub use grading::{
    grade_standard, grade_tile_order, paragraph_tiles, parse_test_content, sentence_tiles,
    shuffle_tiles, Blank, BlankKind, BlankWidget, GradedField, GradedTile, ParsedTest,
    RenderSegment, Segment, StandardGrade, Tile, TileGrade, WidgetKind,
};
pub use normalize::{answers_match, normalize};
pub use review::{
    Question, QuestionFormat, QuestionTurn, ReviewEngine, ReviewFeedback, ReviewScheduler,
    ReviewSession, ReviewUpdate, ScrambledAttempt,
};
pub use store::{NewTest, ReadingStore, TestStore, TestUpdate, VocabularyStore};
pub use types::{
    ActivityOverview, Book, LearnTestProgress, ReadingActivity, ReadingPage, ReadingProgress,
    Test, TestMode, TestResult, VocabularyEntry,
};
