//! SQLite-backed persistence.
//!
//! Each store owns a connection behind a mutex, creates its schema on
//! first use, and stores timestamps as RFC 3339 text.

mod reading;
mod tests_store;
mod vocabulary;

pub use reading::ReadingStore;
pub use tests_store::{NewTest, TestStore, TestUpdate};
pub use vocabulary::VocabularyStore;
