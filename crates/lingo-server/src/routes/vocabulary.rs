//! Vocabulary and review endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use lingo_core::error::LingoError;
use lingo_core::review::{QuestionTurn, ReviewFeedback};
use lingo_core::types::VocabularyEntry;

/// Query parameters identifying the requesting user.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// Response for listing vocabulary.
#[derive(Debug, Serialize)]
pub struct VocabularyListResponse {
    pub words: Vec<VocabularyEntry>,
}

/// List a user's vocabulary.
/// GET /vocabulary
pub async fn list_vocabulary(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<VocabularyListResponse>> {
    let words = state.inner.review.store().list(&query.user_id)?;
    Ok(Json(VocabularyListResponse { words }))
}

/// Request body for adding a word.
#[derive(Debug, Deserialize)]
pub struct AddWordRequest {
    pub user_id: String,
    pub word: Option<String>,
    pub translation: Option<String>,
}

/// Response for adding a word: `{"success": bool, "error"?: string}`.
#[derive(Debug, Serialize)]
pub struct AddWordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Add a word to the user's vocabulary. The new word is immediately due.
/// POST /vocabulary
pub async fn add_word(
    State(state): State<AppState>,
    Json(request): Json<AddWordRequest>,
) -> (StatusCode, Json<AddWordResponse>) {
    let word = request.word.unwrap_or_default();
    let translation = request.translation.unwrap_or_default();
    if word.trim().is_empty() || translation.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AddWordResponse {
                success: false,
                error: Some("Invalid data: word or translation is missing".to_string()),
            }),
        );
    }

    match state
        .inner
        .review
        .store()
        .add_word(&request.user_id, &word, &translation, Utc::now())
    {
        Ok(_) => (
            StatusCode::OK,
            Json(AddWordResponse {
                success: true,
                error: None,
            }),
        ),
        Err(err @ LingoError::Validation { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(AddWordResponse {
                success: false,
                error: Some(err.to_string()),
            }),
        ),
        Err(err) => {
            error!(error = %err, "failed to add vocabulary word");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AddWordResponse {
                    success: false,
                    error: Some("Something went wrong. Please try again.".to_string()),
                }),
            )
        }
    }
}

/// Request body for editing a word.
#[derive(Debug, Deserialize)]
pub struct EditWordRequest {
    pub user_id: String,
    pub word: String,
    pub translation: String,
}

/// Edit a word's text fields.
/// PUT /vocabulary/:id
pub async fn edit_word(
    State(state): State<AppState>,
    Path(word_id): Path<i64>,
    Json(request): Json<EditWordRequest>,
) -> ApiResult<Json<VocabularyEntry>> {
    let entry = state.inner.review.store().update_word(
        word_id,
        &request.user_id,
        &request.word,
        &request.translation,
    )?;
    Ok(Json(entry))
}

/// Delete a word.
/// DELETE /vocabulary/:id
pub async fn delete_word(
    State(state): State<AppState>,
    Path(word_id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .inner
        .review
        .store()
        .delete_word(word_id, &query.user_id)?;
    Ok(Json(serde_json::json!({
        "message": "Word deleted successfully"
    })))
}

/// List the user's due words.
/// GET /vocabulary/due
pub async fn due_words(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<VocabularyListResponse>> {
    let words = state
        .inner
        .review
        .store()
        .due_words(&query.user_id, Utc::now())?;
    Ok(Json(VocabularyListResponse { words }))
}

/// Response for the next review question.
#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    /// True when no words are due; a terminal state, not an error.
    pub nothing_due: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<QuestionTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Compute the next review question for the user.
/// GET /vocabulary/review/next
pub async fn next_question(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<NextQuestionResponse>> {
    let turn = state
        .with_session(&query.user_id, |session| {
            state.inner.review.next_question(
                &query.user_id,
                session,
                Utc::now(),
                &mut rand::thread_rng(),
            )
        })
        .await?;

    Ok(Json(match turn {
        Some(turn) => NextQuestionResponse {
            nothing_due: false,
            turn: Some(turn),
            message: None,
        },
        None => NextQuestionResponse {
            nothing_due: true,
            turn: None,
            message: Some("No words due for review today!".to_string()),
        },
    }))
}

/// Request body for submitting a review answer.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub user_id: String,
    pub word_id: i64,
    pub answer: String,
}

/// Grade a review answer and reschedule the word.
/// POST /vocabulary/review/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> ApiResult<Json<ReviewFeedback>> {
    let feedback = state
        .with_session(&request.user_id, |session| {
            state.inner.review.submit_answer(
                &request.user_id,
                request.word_id,
                &request.answer,
                session,
                Utc::now(),
            )
        })
        .await
        .map_err(ApiError::from)?;
    Ok(Json(feedback))
}
