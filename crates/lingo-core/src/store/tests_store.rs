//! Test, book, result, and learn-progress persistence.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{ErrorCode, LingoError, LingoResult};
use crate::types::{Book, LearnTestProgress, Test, TestResult};

/// Fields for creating a test. The book is looked up by title and created
/// if missing.
#[derive(Debug, Clone)]
pub struct NewTest {
    pub book_title: String,
    pub name: String,
    pub content: String,
    pub time_limit: Option<u32>,
    pub shuffle_sentences: bool,
    pub shuffle_paragraphs: bool,
    pub created_by: String,
}

/// Editable fields of an existing test.
#[derive(Debug, Clone)]
pub struct TestUpdate {
    pub name: String,
    pub content: String,
    pub time_limit: Option<u32>,
    pub shuffle_sentences: bool,
    pub shuffle_paragraphs: bool,
}

/// SQLite-backed store for tests and their attempt records.
pub struct TestStore {
    conn: Arc<Mutex<Connection>>,
}

impl TestStore {
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
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS tests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                time_limit INTEGER,
                shuffle_sentences INTEGER NOT NULL DEFAULT 0,
                shuffle_paragraphs INTEGER NOT NULL DEFAULT 0,
                created_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score INTEGER NOT NULL,
                total_questions INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                user_id TEXT NOT NULL,
                test_id INTEGER NOT NULL REFERENCES tests(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS learn_test_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                test_id INTEGER NOT NULL REFERENCES tests(id) ON DELETE CASCADE,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS learn_test_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                test_id INTEGER NOT NULL REFERENCES tests(id) ON DELETE CASCADE,
                answers TEXT NOT NULL,
                last_updated TEXT NOT NULL,
                UNIQUE(user_id, test_id)
            );

            CREATE INDEX IF NOT EXISTS idx_tests_book ON tests(book_id);
            CREATE INDEX IF NOT EXISTS idx_test_results_user ON test_results(user_id);
            ",
        )?;
        Ok(())
    }

    /// Create a test, creating its book when the title is new.
    pub fn add_test(&self, new_test: &NewTest) -> LingoResult<Test> {
        if new_test.name.trim().is_empty()
            || new_test.content.trim().is_empty()
            || new_test.book_title.trim().is_empty()
        {
            return Err(LingoError::validation_with_code(
                "book title, test name, and content are required",
                ErrorCode::ValMissingField,
            ));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let book_id: i64 = match tx
            .query_row(
                "SELECT id FROM books WHERE title = ?1",
                params![new_test.book_title],
                |row| row.get(0),
            )
            .optional()?
        {
            Some(id) => id,
            None => {
                tx.execute(
                    "INSERT INTO books (title) VALUES (?1)",
                    params![new_test.book_title],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.execute(
            "INSERT INTO tests
             (name, content, book_id, time_limit, shuffle_sentences, shuffle_paragraphs, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new_test.name,
                new_test.content,
                book_id,
                new_test.time_limit,
                new_test.shuffle_sentences as i32,
                new_test.shuffle_paragraphs as i32,
                new_test.created_by,
            ],
        )?;
        let test_id = tx.last_insert_rowid();

        let test = tx.query_row(
            "SELECT id, name, content, book_id, time_limit,
                    shuffle_sentences, shuffle_paragraphs, created_by
             FROM tests WHERE id = ?1",
            params![test_id],
            row_to_test,
        )?;

        tx.commit()?;
        Ok(test)
    }

    /// Get a test by id.
    pub fn get_test(&self, test_id: i64) -> LingoResult<Option<Test>> {
        let conn = self.lock()?;
        let test = conn
            .query_row(
                "SELECT id, name, content, book_id, time_limit,
                        shuffle_sentences, shuffle_paragraphs, created_by
                 FROM tests WHERE id = ?1",
                params![test_id],
                row_to_test,
            )
            .optional()?;
        Ok(test)
    }

    /// Get a test by id or fail with not-found.
    pub fn require_test(&self, test_id: i64) -> LingoResult<Test> {
        self.get_test(test_id)?
            .ok_or_else(|| LingoError::test_not_found(test_id))
    }

    /// Update a test. Only its creator may edit it.
    pub fn update_test(
        &self,
        test_id: i64,
        user_id: &str,
        update: &TestUpdate,
    ) -> LingoResult<Test> {
        if update.name.trim().is_empty() || update.content.trim().is_empty() {
            return Err(LingoError::validation_with_code(
                "test name and content are required",
                ErrorCode::ValMissingField,
            ));
        }
        {
            let conn = self.lock()?;
            let updated = conn.execute(
                "UPDATE tests
                 SET name = ?1, content = ?2, time_limit = ?3,
                     shuffle_sentences = ?4, shuffle_paragraphs = ?5
                 WHERE id = ?6 AND created_by = ?7",
                params![
                    update.name,
                    update.content,
                    update.time_limit,
                    update.shuffle_sentences as i32,
                    update.shuffle_paragraphs as i32,
                    test_id,
                    user_id,
                ],
            )?;
            if updated == 0 {
                return Err(LingoError::test_not_found(test_id));
            }
        }
        self.require_test(test_id)
    }

    /// Delete a test. Only its creator may delete it.
    pub fn delete_test(&self, test_id: i64, user_id: &str) -> LingoResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM tests WHERE id = ?1 AND created_by = ?2",
            params![test_id, user_id],
        )?;
        if deleted == 0 {
            return Err(LingoError::test_not_found(test_id));
        }
        Ok(())
    }

    /// All books, ordered by title.
    pub fn list_books(&self) -> LingoResult<Vec<Book>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, title FROM books ORDER BY title")?;
        let books = stmt
            .query_map([], |row| {
                Ok(Book {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    /// Tests belonging to one book.
    pub fn list_tests(&self, book_id: i64) -> LingoResult<Vec<Test>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, content, book_id, time_limit,
                    shuffle_sentences, shuffle_paragraphs, created_by
             FROM tests WHERE book_id = ?1 ORDER BY id",
        )?;
        let tests = stmt
            .query_map(params![book_id], row_to_test)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tests)
    }

    /// Books whose title contains the query (case-insensitive).
    pub fn search_books(&self, query: &str) -> LingoResult<Vec<Book>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, title FROM books WHERE title LIKE ?1 ORDER BY title")?;
        let pattern = format!("%{}%", query);
        let books = stmt
            .query_map(params![pattern], |row| {
                Ok(Book {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    /// Tests whose name contains the query (case-insensitive).
    pub fn search_tests(&self, query: &str) -> LingoResult<Vec<Test>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, content, book_id, time_limit,
                    shuffle_sentences, shuffle_paragraphs, created_by
             FROM tests WHERE name LIKE ?1 ORDER BY name",
        )?;
        let pattern = format!("%{}%", query);
        let tests = stmt
            .query_map(params![pattern], row_to_test)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tests)
    }

    /// Record a graded attempt.
    pub fn record_result(
        &self,
        user_id: &str,
        test_id: i64,
        score: u32,
        total_questions: u32,
        now: DateTime<Utc>,
    ) -> LingoResult<TestResult> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO test_results (score, total_questions, timestamp, user_id, test_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![score, total_questions, now.to_rfc3339(), user_id, test_id],
        )?;
        Ok(TestResult {
            id: conn.last_insert_rowid(),
            score,
            total_questions,
            timestamp: now,
            user_id: user_id.to_string(),
            test_id,
        })
    }

    /// A user's past results, newest first.
    pub fn results_for_user(&self, user_id: &str) -> LingoResult<Vec<TestResult>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, score, total_questions, timestamp, user_id, test_id
             FROM test_results WHERE user_id = ?1 ORDER BY timestamp DESC, id DESC",
        )?;
        let results = stmt
            .query_map(params![user_id], |row| {
                let timestamp_str: String = row.get(3)?;
                let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());
                Ok(TestResult {
                    id: row.get(0)?,
                    score: row.get(1)?,
                    total_questions: row.get(2)?,
                    timestamp,
                    user_id: row.get(4)?,
                    test_id: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Record a fully-correct learn attempt and clear the saved progress.
    pub fn record_learn_completion(
        &self,
        user_id: &str,
        test_id: i64,
        now: DateTime<Utc>,
    ) -> LingoResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO learn_test_results (user_id, test_id, completed_at) VALUES (?1, ?2, ?3)",
            params![user_id, test_id, now.to_rfc3339()],
        )?;
        tx.execute(
            "DELETE FROM learn_test_progress WHERE user_id = ?1 AND test_id = ?2",
            params![user_id, test_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Save (or replace) the in-progress learn answers for (user, test).
    pub fn save_progress(
        &self,
        user_id: &str,
        test_id: i64,
        answers: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> LingoResult<LearnTestProgress> {
        let answers_json = serde_json::to_string(answers)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO learn_test_progress (user_id, test_id, answers, last_updated)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, test_id)
             DO UPDATE SET answers = ?3, last_updated = ?4",
            params![user_id, test_id, answers_json, now.to_rfc3339()],
        )?;
        Ok(LearnTestProgress {
            user_id: user_id.to_string(),
            test_id,
            answers: answers.clone(),
            last_updated: now,
        })
    }

    /// The saved learn answers for (user, test), if any.
    pub fn get_progress(
        &self,
        user_id: &str,
        test_id: i64,
    ) -> LingoResult<Option<LearnTestProgress>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT answers, last_updated FROM learn_test_progress
                 WHERE user_id = ?1 AND test_id = ?2",
                params![user_id, test_id],
                |row| {
                    let answers: String = row.get(0)?;
                    let last_updated: String = row.get(1)?;
                    Ok((answers, last_updated))
                },
            )
            .optional()?;

        match row {
            Some((answers_json, last_updated_str)) => {
                let answers: HashMap<String, String> =
                    serde_json::from_str(&answers_json).unwrap_or_default();
                let last_updated = DateTime::parse_from_rfc3339(&last_updated_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());
                Ok(Some(LearnTestProgress {
                    user_id: user_id.to_string(),
                    test_id,
                    answers,
                    last_updated,
                }))
            }
            None => Ok(None),
        }
    }

    fn lock(&self) -> LingoResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LingoError::database(e.to_string()))
    }
}

fn row_to_test(row: &Row<'_>) -> rusqlite::Result<Test> {
    let shuffle_sentences: i32 = row.get(5)?;
    let shuffle_paragraphs: i32 = row.get(6)?;
    Ok(Test {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        book_id: row.get(3)?,
        time_limit: row.get(4)?,
        shuffle_sentences: shuffle_sentences != 0,
        shuffle_paragraphs: shuffle_paragraphs != 0,
        created_by: row.get(7)?,
    })
}
