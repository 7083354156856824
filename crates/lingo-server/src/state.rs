//! Server state management.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lingo_core::config::AppConfig;
use lingo_core::error::LingoResult;
use lingo_core::review::{ReviewEngine, ReviewSession};
use lingo_core::store::{ReadingStore, TestStore, VocabularyStore};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A started timed-test attempt. The time limit is advisory: elapsed time
/// is compared at submission, never enforced during the attempt.
#[derive(Debug, Clone)]
pub struct TestAttempt {
    pub test_id: i64,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub review: ReviewEngine,
    pub tests: TestStore,
    pub reading: ReadingStore,
    /// Ephemeral review sessions, keyed by user. Never persisted.
    pub sessions: RwLock<HashMap<String, ReviewSession>>,
    /// Started timed-test attempts, keyed by attempt token.
    pub attempts: RwLock<HashMap<Uuid, TestAttempt>>,
}

impl AppState {
    /// Create application state backed by the configured databases.
    pub fn new(config: &AppConfig) -> LingoResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let vocabulary = VocabularyStore::new(config.vocabulary_db_path())?;
        let tests = TestStore::new(config.tests_db_path())?;
        let reading = ReadingStore::new(config.reading_db_path())?;
        Ok(Self::with_stores(vocabulary, tests, reading))
    }

    /// Create application state over in-memory stores (useful for tests).
    pub fn in_memory() -> LingoResult<Self> {
        Ok(Self::with_stores(
            VocabularyStore::in_memory()?,
            TestStore::in_memory()?,
            ReadingStore::in_memory()?,
        ))
    }

    fn with_stores(vocabulary: VocabularyStore, tests: TestStore, reading: ReadingStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                review: ReviewEngine::new(vocabulary),
                tests,
                reading,
                sessions: RwLock::new(HashMap::new()),
                attempts: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Run a closure against a user's review session, creating it on
    /// first use and storing the possibly-updated state back.
    pub async fn with_session<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut ReviewSession) -> T,
    ) -> T {
        let mut sessions = self.inner.sessions.write().await;
        let session = sessions.entry(user_id.to_string()).or_default();
        f(session)
    }

    /// Register a started timed-test attempt and return its token.
    pub async fn start_attempt(
        &self,
        test_id: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Uuid {
        let attempt_id = Uuid::new_v4();
        self.inner.attempts.write().await.insert(
            attempt_id,
            TestAttempt {
                test_id,
                user_id: user_id.to_string(),
                started_at: now,
            },
        );
        attempt_id
    }

    /// Consume a started attempt, returning it if it matches the
    /// submitting user and test.
    pub async fn take_attempt(
        &self,
        attempt_id: Uuid,
        test_id: i64,
        user_id: &str,
    ) -> Option<TestAttempt> {
        let mut attempts = self.inner.attempts.write().await;
        match attempts.get(&attempt_id) {
            Some(attempt) if attempt.test_id == test_id && attempt.user_id == user_id => {
                attempts.remove(&attempt_id)
            }
            _ => None,
        }
    }
}
