//! Route definitions for the REST API.

mod health;
mod reading;
mod vocabulary;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;
use crate::translate;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Vocabulary
        .route("/vocabulary", get(vocabulary::list_vocabulary))
        .route("/vocabulary", post(vocabulary::add_word))
        .route("/vocabulary/:id", put(vocabulary::edit_word))
        .route("/vocabulary/:id", delete(vocabulary::delete_word))
        .route("/vocabulary/due", get(vocabulary::due_words))
        // Review cycle
        .route("/vocabulary/review/next", get(vocabulary::next_question))
        .route("/vocabulary/review/answer", post(vocabulary::submit_answer))
        // Books and tests
        .route("/books", get(tests::list_books))
        .route("/books/:id/tests", get(tests::book_tests))
        .route("/search", get(tests::search))
        .route("/tests", post(tests::add_test))
        .route("/tests/:id", put(tests::edit_test))
        .route("/tests/:id", delete(tests::delete_test))
        .route("/tests/:id/render", get(tests::render_test))
        .route("/tests/:id/grade", post(tests::grade_test))
        .route("/tests/:id/learn", get(tests::learn_test))
        .route("/tests/:id/learn", post(tests::submit_learn_test))
        .route("/tests/:id/learn", put(tests::save_learn_progress))
        // Reading activities
        .route("/reading/activities", get(reading::list_activities))
        .route("/reading/activities", post(reading::create_activity))
        .route(
            "/reading/activities/:id/pages/:page",
            get(reading::read_page),
        )
        .route(
            "/reading/activities/:id/unlock/:page",
            post(reading::unlock_page),
        )
        // Translation lookup
        .route("/translate", get(translate::translate_word))
        // Attach state
        .with_state(state)
}

pub use health::*;
pub use reading::*;
pub use tests::*;
pub use vocabulary::*;
