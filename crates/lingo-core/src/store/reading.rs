//! Reading activity persistence with progressive page unlocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ErrorCode, LingoError, LingoResult};
use crate::types::{ActivityOverview, ReadingActivity, ReadingPage, ReadingProgress};

/// SQLite-backed store for reading activities, pages, and unlock state.
pub struct ReadingStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReadingStore {
    /// Create a new store with the given database path.
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
            CREATE TABLE IF NOT EXISTS reading_activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reading_pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity_id INTEGER NOT NULL REFERENCES reading_activities(id) ON DELETE CASCADE,
                page_number INTEGER NOT NULL,
                content TEXT NOT NULL,
                UNIQUE(activity_id, page_number)
            );

            CREATE TABLE IF NOT EXISTS reading_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                activity_id INTEGER NOT NULL REFERENCES reading_activities(id) ON DELETE CASCADE,
                unlocked_pages TEXT NOT NULL,
                UNIQUE(user_id, activity_id)
            );
            ",
        )?;
        Ok(())
    }

    /// Create an activity, paginating the content into pages of
    /// `page_size` words. Empty content still yields one (empty) page.
    pub fn create_activity(
        &self,
        title: &str,
        content: &str,
        page_size: usize,
    ) -> LingoResult<ReadingActivity> {
        if title.trim().is_empty() {
            return Err(LingoError::validation_with_code(
                "title is required",
                ErrorCode::ValMissingField,
            ));
        }
        if page_size == 0 {
            return Err(LingoError::validation("words per page must be positive"));
        }

        let words: Vec<&str> = content.split_whitespace().collect();
        let pages: Vec<String> = if words.is_empty() {
            vec![String::new()]
        } else {
            words.chunks(page_size).map(|c| c.join(" ")).collect()
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO reading_activities (title) VALUES (?1)",
            params![title],
        )?;
        let activity_id = tx.last_insert_rowid();

        for (index, page_content) in pages.iter().enumerate() {
            tx.execute(
                "INSERT INTO reading_pages (activity_id, page_number, content) VALUES (?1, ?2, ?3)",
                params![activity_id, (index + 1) as u32, page_content],
            )?;
        }

        tx.commit()?;
        Ok(ReadingActivity {
            id: activity_id,
            title: title.to_string(),
        })
    }

    /// Get an activity by id.
    pub fn get_activity(&self, activity_id: i64) -> LingoResult<Option<ReadingActivity>> {
        let conn = self.lock()?;
        let activity = conn
            .query_row(
                "SELECT id, title FROM reading_activities WHERE id = ?1",
                params![activity_id],
                |row| {
                    Ok(ReadingActivity {
                        id: row.get(0)?,
                        title: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(activity)
    }

    /// All activities ordered by title.
    pub fn list_activities(&self) -> LingoResult<Vec<ReadingActivity>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, title FROM reading_activities ORDER BY title COLLATE NOCASE")?;
        let activities = stmt
            .query_map([], |row| {
                Ok(ReadingActivity {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    /// Number of pages in an activity.
    pub fn page_count(&self, activity_id: i64) -> LingoResult<u32> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reading_pages WHERE activity_id = ?1",
            params![activity_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// One page of an activity.
    pub fn get_page(&self, activity_id: i64, page_number: u32) -> LingoResult<Option<ReadingPage>> {
        let conn = self.lock()?;
        let page = conn
            .query_row(
                "SELECT id, activity_id, page_number, content
                 FROM reading_pages WHERE activity_id = ?1 AND page_number = ?2",
                params![activity_id, page_number],
                |row| {
                    Ok(ReadingPage {
                        id: row.get(0)?,
                        activity_id: row.get(1)?,
                        page_number: row.get(2)?,
                        content: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }

    /// A user's unlock state for an activity, creating it (page 1
    /// unlocked) on first access.
    pub fn ensure_progress(&self, user_id: &str, activity_id: i64) -> LingoResult<ReadingProgress> {
        if self.get_activity(activity_id)?.is_none() {
            return Err(LingoError::activity_not_found(activity_id));
        }
        if let Some(progress) = self.get_progress(user_id, activity_id)? {
            return Ok(progress);
        }

        let progress = ReadingProgress::new(user_id, activity_id);
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO reading_progress (user_id, activity_id, unlocked_pages)
             VALUES (?1, ?2, ?3)",
            params![
                user_id,
                activity_id,
                serde_json::to_string(&progress.unlocked_pages)?
            ],
        )?;
        Ok(progress)
    }

    /// A user's unlock state for an activity, if it exists.
    pub fn get_progress(
        &self,
        user_id: &str,
        activity_id: i64,
    ) -> LingoResult<Option<ReadingProgress>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT unlocked_pages FROM reading_progress
                 WHERE user_id = ?1 AND activity_id = ?2",
                params![user_id, activity_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|json| ReadingProgress {
            user_id: user_id.to_string(),
            activity_id,
            // Reset to the default if the stored value is bad
            unlocked_pages: serde_json::from_str(&json).unwrap_or_else(|_| vec![1]),
        }))
    }

    /// Mark a page unlocked for a user. Returns the updated unlock list.
    pub fn unlock_page(
        &self,
        user_id: &str,
        activity_id: i64,
        page_number: u32,
    ) -> LingoResult<Vec<u32>> {
        let mut progress = self.ensure_progress(user_id, activity_id)?;
        if progress.unlock(page_number) {
            let conn = self.lock()?;
            conn.execute(
                "UPDATE reading_progress SET unlocked_pages = ?1
                 WHERE user_id = ?2 AND activity_id = ?3",
                params![
                    serde_json::to_string(&progress.unlocked_pages)?,
                    user_id,
                    activity_id,
                ],
            )?;
        }
        Ok(progress.unlocked_pages)
    }

    /// Per-activity progress summaries for a user's activity listing.
    pub fn overviews(
        &self,
        user_id: &str,
    ) -> LingoResult<Vec<(ReadingActivity, ActivityOverview)>> {
        let activities = self.list_activities()?;
        let mut cards = Vec::with_capacity(activities.len());
        for activity in activities {
            let total_pages = self.page_count(activity.id)?;
            let progress = self
                .get_progress(user_id, activity.id)?
                .unwrap_or_else(|| ReadingProgress::new(user_id, activity.id));
            let overview = progress.overview(total_pages);
            cards.push((activity, overview));
        }
        Ok(cards)
    }

    fn lock(&self) -> LingoResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LingoError::database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_activity_paginates_by_word_count() {
        let store = ReadingStore::in_memory().unwrap();
        let content = "one two three four five six seven";
        let activity = store.create_activity("Story", content, 3).unwrap();

        assert_eq!(store.page_count(activity.id).unwrap(), 3);
        let first = store.get_page(activity.id, 1).unwrap().unwrap();
        assert_eq!(first.content, "one two three");
        let last = store.get_page(activity.id, 3).unwrap().unwrap();
        assert_eq!(last.content, "seven");
    }

    #[test]
    fn test_empty_content_yields_one_page() {
        let store = ReadingStore::in_memory().unwrap();
        let activity = store.create_activity("Empty", "", 100).unwrap();
        assert_eq!(store.page_count(activity.id).unwrap(), 1);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let store = ReadingStore::in_memory().unwrap();
        assert!(store.create_activity("Story", "words", 0).is_err());
    }

    #[test]
    fn test_first_access_creates_progress_with_page_one() {
        let store = ReadingStore::in_memory().unwrap();
        let activity = store.create_activity("Story", "a b c d", 2).unwrap();

        let progress = store.ensure_progress("u1", activity.id).unwrap();
        assert_eq!(progress.unlocked_pages, vec![1]);
    }

    #[test]
    fn test_unlock_page_persists_sorted() {
        let store = ReadingStore::in_memory().unwrap();
        let activity = store.create_activity("Story", "a b c d e f", 2).unwrap();

        store.unlock_page("u1", activity.id, 3).unwrap();
        let unlocked = store.unlock_page("u1", activity.id, 2).unwrap();
        assert_eq!(unlocked, vec![1, 2, 3]);

        // Idempotent
        let again = store.unlock_page("u1", activity.id, 2).unwrap();
        assert_eq!(again, vec![1, 2, 3]);
    }

    #[test]
    fn test_unlock_unknown_activity_fails() {
        let store = ReadingStore::in_memory().unwrap();
        let err = store.unlock_page("u1", 99, 2).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NfActivity);
    }

    #[test]
    fn test_overviews() {
        let store = ReadingStore::in_memory().unwrap();
        let activity = store.create_activity("Story", "a b c d e f", 2).unwrap();
        store.unlock_page("u1", activity.id, 2).unwrap();

        let cards = store.overviews("u1").unwrap();
        assert_eq!(cards.len(), 1);
        let (_, overview) = &cards[0];
        assert_eq!(overview.total_pages, 3);
        assert_eq!(overview.pages_unlocked, 2);
        assert!(!overview.completed);
    }

    #[test]
    fn test_progress_is_per_user() {
        let store = ReadingStore::in_memory().unwrap();
        let activity = store.create_activity("Story", "a b c d", 2).unwrap();
        store.unlock_page("u1", activity.id, 2).unwrap();

        assert!(store.get_progress("u2", activity.id).unwrap().is_none());
    }
}
