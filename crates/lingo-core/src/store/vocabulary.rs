//! Vocabulary persistence.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{ErrorCode, LingoError, LingoResult};
use crate::review::ReviewUpdate;
use crate::types::VocabularyEntry;

/// SQLite-backed store for vocabulary entries and their review state.
pub struct VocabularyStore {
    conn: Arc<Mutex<Connection>>,
}

impl VocabularyStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> LingoResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> LingoResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> LingoResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS vocabulary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                word TEXT NOT NULL,
                translation TEXT NOT NULL,
                pronunciation_url TEXT,
                next_review TEXT NOT NULL,
                interval REAL NOT NULL DEFAULT 0,
                ease_factor REAL NOT NULL DEFAULT 2.5,
                learning_stage INTEGER NOT NULL DEFAULT 0
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_vocabulary_user_word
                ON vocabulary(user_id, word);
            CREATE INDEX IF NOT EXISTS idx_vocabulary_next_review
                ON vocabulary(user_id, next_review);
            ",
        )?;
        Ok(())
    }

    /// Add a word to a user's vocabulary.
    ///
    /// The new entry is immediately due (`next_review = now`). A word the
    /// user already has is rejected as a validation error.
    pub fn add_word(
        &self,
        user_id: &str,
        word: &str,
        translation: &str,
        now: DateTime<Utc>,
    ) -> LingoResult<VocabularyEntry> {
        if word.trim().is_empty() || translation.trim().is_empty() {
            return Err(LingoError::validation_with_code(
                "word or translation is missing",
                ErrorCode::ValMissingField,
            ));
        }

        let conn = self.lock()?;

        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM vocabulary WHERE user_id = ?1 AND word = ?2",
                params![user_id, word],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(LingoError::validation_with_code(
                "Word already exists in your vocabulary",
                ErrorCode::ValDuplicateWord,
            ));
        }

        conn.execute(
            "INSERT INTO vocabulary
             (user_id, word, translation, pronunciation_url, next_review, interval, ease_factor, learning_stage)
             VALUES (?1, ?2, ?3, NULL, ?4, 0, 2.5, 0)",
            params![user_id, word, translation, now.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, user_id, word, translation, pronunciation_url,
                    next_review, interval, ease_factor, learning_stage
             FROM vocabulary WHERE id = ?1",
            params![id],
            row_to_entry,
        )
        .map_err(LingoError::from)
    }

    /// Get an entry by id.
    pub fn get(&self, word_id: i64) -> LingoResult<Option<VocabularyEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT id, user_id, word, translation, pronunciation_url,
                        next_review, interval, ease_factor, learning_stage
                 FROM vocabulary WHERE id = ?1",
                params![word_id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Get an entry by id, requiring the given owner.
    ///
    /// A missing entry and an entry owned by another user are the same
    /// not-found failure; ownership is never leaked.
    pub fn get_owned(&self, word_id: i64, user_id: &str) -> LingoResult<VocabularyEntry> {
        match self.get(word_id)? {
            Some(entry) if entry.user_id == user_id => Ok(entry),
            _ => Err(LingoError::word_not_found(word_id)),
        }
    }

    /// All of a user's vocabulary.
    pub fn list(&self, user_id: &str) -> LingoResult<Vec<VocabularyEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, word, translation, pronunciation_url,
                    next_review, interval, ease_factor, learning_stage
             FROM vocabulary WHERE user_id = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![user_id], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// All of a user's entries with `next_review <= now`, oldest first.
    ///
    /// An empty result is the benign "nothing due" state, not an error.
    pub fn due_words(&self, user_id: &str, now: DateTime<Utc>) -> LingoResult<Vec<VocabularyEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, word, translation, pronunciation_url,
                    next_review, interval, ease_factor, learning_stage
             FROM vocabulary
             WHERE user_id = ?1 AND next_review <= ?2
             ORDER BY next_review ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![user_id, now.to_rfc3339()], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Update a word's text fields (explicit user edit).
    pub fn update_word(
        &self,
        word_id: i64,
        user_id: &str,
        word: &str,
        translation: &str,
    ) -> LingoResult<VocabularyEntry> {
        if word.trim().is_empty() || translation.trim().is_empty() {
            return Err(LingoError::validation_with_code(
                "word or translation is missing",
                ErrorCode::ValMissingField,
            ));
        }
        {
            let conn = self.lock()?;
            let updated = conn.execute(
                "UPDATE vocabulary SET word = ?1, translation = ?2 WHERE id = ?3 AND user_id = ?4",
                params![word, translation, word_id, user_id],
            )?;
            if updated == 0 {
                return Err(LingoError::word_not_found(word_id));
            }
        }
        self.get_owned(word_id, user_id)
    }

    /// Delete a word (explicit user action).
    pub fn delete_word(&self, word_id: i64, user_id: &str) -> LingoResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM vocabulary WHERE id = ?1 AND user_id = ?2",
            params![word_id, user_id],
        )?;
        if deleted == 0 {
            return Err(LingoError::word_not_found(word_id));
        }
        Ok(())
    }

    /// Commit a grading outcome.
    ///
    /// Stage, ease factor, interval, and next_review change together in
    /// one transaction or not at all; a failure rolls back.
    pub fn apply_review(
        &self,
        word_id: i64,
        user_id: &str,
        update: &ReviewUpdate,
    ) -> LingoResult<VocabularyEntry> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE vocabulary
             SET learning_stage = ?1, ease_factor = ?2, interval = ?3, next_review = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![
                update.learning_stage,
                update.ease_factor,
                update.interval,
                update.next_review.to_rfc3339(),
                word_id,
                user_id,
            ],
        )?;
        if updated == 0 {
            return Err(LingoError::word_not_found(word_id));
        }

        let entry = tx.query_row(
            "SELECT id, user_id, word, translation, pronunciation_url,
                    next_review, interval, ease_factor, learning_stage
             FROM vocabulary WHERE id = ?1",
            params![word_id],
            row_to_entry,
        )?;

        tx.commit()?;
        Ok(entry)
    }

    fn lock(&self) -> LingoResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LingoError::database(e.to_string()))
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<VocabularyEntry> {
    let next_review_str: String = row.get(5)?;
    let next_review = DateTime::parse_from_rfc3339(&next_review_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(VocabularyEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        word: row.get(2)?,
        translation: row.get(3)?,
        pronunciation_url: row.get(4)?,
        next_review,
        interval: row.get(6)?,
        ease_factor: row.get(7)?,
        learning_stage: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_add_word_is_immediately_due() {
        let store = VocabularyStore::in_memory().unwrap();
        let now = Utc::now();
        let entry = store.add_word("u1", "chat", "cat", now).unwrap();

        assert_eq!(entry.learning_stage, 0);
        assert_eq!(entry.ease_factor, 2.5);
        assert!(entry.is_due(now));

        let due = store.due_words("u1", now).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_duplicate_word_rejected() {
        let store = VocabularyStore::in_memory().unwrap();
        let now = Utc::now();
        store.add_word("u1", "chat", "cat", now).unwrap();

        let err = store.add_word("u1", "chat", "feline", now).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValDuplicateWord);

        // A different user may add the same word
        assert!(store.add_word("u2", "chat", "cat", now).is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let store = VocabularyStore::in_memory().unwrap();
        let err = store.add_word("u1", "  ", "cat", Utc::now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValMissingField);
    }

    #[test]
    fn test_get_owned_hides_other_users_words() {
        let store = VocabularyStore::in_memory().unwrap();
        let entry = store.add_word("u1", "chat", "cat", Utc::now()).unwrap();

        assert!(store.get_owned(entry.id, "u1").is_ok());
        let err = store.get_owned(entry.id, "u2").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NfWord);
    }

    #[test]
    fn test_due_query_excludes_future_words() {
        let store = VocabularyStore::in_memory().unwrap();
        let now = Utc::now();
        let entry = store.add_word("u1", "chat", "cat", now).unwrap();
        store.add_word("u1", "chien", "dog", now).unwrap();

        let update = ReviewUpdate {
            learning_stage: 1,
            ease_factor: 2.3,
            interval: 1.0 / 1440.0,
            next_review: now + Duration::days(1),
        };
        store.apply_review(entry.id, "u1", &update).unwrap();

        let due = store.due_words("u1", now).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].word, "chien");
    }

    #[test]
    fn test_apply_review_commits_all_fields_together() {
        let store = VocabularyStore::in_memory().unwrap();
        let now = Utc::now();
        let entry = store.add_word("u1", "chat", "cat", now).unwrap();

        let update = ReviewUpdate {
            learning_stage: 3,
            ease_factor: 1.9,
            interval: 1.0,
            next_review: now + Duration::days(1),
        };
        let updated = store.apply_review(entry.id, "u1", &update).unwrap();

        assert_eq!(updated.learning_stage, 3);
        assert!((updated.ease_factor - 1.9).abs() < 1e-9);
        assert!((updated.interval - 1.0).abs() < 1e-9);
        assert!(updated.next_review > now);
    }

    #[test]
    fn test_apply_review_for_foreign_word_rolls_back() {
        let store = VocabularyStore::in_memory().unwrap();
        let now = Utc::now();
        let entry = store.add_word("u1", "chat", "cat", now).unwrap();

        let update = ReviewUpdate {
            learning_stage: 5,
            ease_factor: 1.3,
            interval: 4.0,
            next_review: now + Duration::days(4),
        };
        let err = store.apply_review(entry.id, "intruder", &update).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NfWord);

        // Nothing changed
        let unchanged = store.get(entry.id).unwrap().unwrap();
        assert_eq!(unchanged.learning_stage, 0);
        assert_eq!(unchanged.ease_factor, 2.5);
    }

    #[test]
    fn test_update_and_delete_word() {
        let store = VocabularyStore::in_memory().unwrap();
        let entry = store.add_word("u1", "chat", "cat", Utc::now()).unwrap();

        let edited = store
            .update_word(entry.id, "u1", "chatte", "female cat")
            .unwrap();
        assert_eq!(edited.word, "chatte");

        store.delete_word(entry.id, "u1").unwrap();
        assert!(store.get(entry.id).unwrap().is_none());
    }
}
