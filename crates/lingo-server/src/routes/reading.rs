//! Reading activity endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::routes::vocabulary::UserQuery;
use crate::state::AppState;
use lingo_core::error::LingoError;
use lingo_core::types::{ActivityOverview, ReadingActivity, ReadingPage};

/// One entry of the activity listing.
#[derive(Debug, Serialize)]
pub struct ActivityCard {
    pub activity: ReadingActivity,
    #[serde(flatten)]
    pub overview: ActivityOverview,
}

/// Response for the activity listing.
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityCard>,
}

/// List activities with the user's progress.
/// GET /reading/activities
pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ActivityListResponse>> {
    let cards = state
        .inner
        .reading
        .overviews(&query.user_id)?
        .into_iter()
        .map(|(activity, overview)| ActivityCard { activity, overview })
        .collect();
    Ok(Json(ActivityListResponse { activities: cards }))
}

/// Request body for creating an activity.
#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub title: String,
    pub content: String,
    /// Words per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    100
}

/// Create a reading activity from raw text.
/// POST /reading/activities
pub async fn create_activity(
    State(state): State<AppState>,
    Json(request): Json<CreateActivityRequest>,
) -> ApiResult<Json<ReadingActivity>> {
    if request.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }
    let activity = state.inner.reading.create_activity(
        request.title.trim(),
        &request.content,
        request.page_size,
    )?;
    Ok(Json(activity))
}

/// A readable page together with the user's unlock state.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub activity: ReadingActivity,
    pub page: ReadingPage,
    pub unlocked_pages: Vec<u32>,
}

/// Read one page, if the user has unlocked it.
/// GET /reading/activities/:id/pages/:page
pub async fn read_page(
    State(state): State<AppState>,
    Path((activity_id, page_number)): Path<(i64, u32)>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<PageResponse>> {
    let activity = state
        .inner
        .reading
        .get_activity(activity_id)?
        .ok_or_else(|| ApiError::not_found("Reading activity not found"))?;
    let page = state
        .inner
        .reading
        .get_page(activity_id, page_number)?
        .ok_or_else(|| ApiError::not_found("Page not found"))?;

    let progress = state
        .inner
        .reading
        .ensure_progress(&query.user_id, activity_id)?;
    if !progress.is_unlocked(page_number) {
        let highest = progress.unlocked_pages.last().copied().unwrap_or(1);
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "PAGE_LOCKED",
            "You haven't unlocked this page yet.",
        )
        .with_details(serde_json::json!({ "highest_unlocked": highest })));
    }

    Ok(Json(PageResponse {
        activity,
        page,
        unlocked_pages: progress.unlocked_pages,
    }))
}

/// Request body for unlocking a page.
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub user_id: String,
}

/// Response for unlocking: `{"success": bool, "unlocked": [..]}`.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Mark a page as unlocked for the user.
/// POST /reading/activities/:id/unlock/:page
pub async fn unlock_page(
    State(state): State<AppState>,
    Path((activity_id, page_number)): Path<(i64, u32)>,
    Json(request): Json<UnlockRequest>,
) -> (StatusCode, Json<UnlockResponse>) {
    match state
        .inner
        .reading
        .unlock_page(&request.user_id, activity_id, page_number)
    {
        Ok(unlocked) => (
            StatusCode::OK,
            Json(UnlockResponse {
                success: true,
                unlocked: Some(unlocked),
                error: None,
            }),
        ),
        Err(err @ LingoError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(UnlockResponse {
                success: false,
                unlocked: None,
                error: Some(err.to_string()),
            }),
        ),
        Err(err) => {
            error!(error = %err, "failed to unlock page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UnlockResponse {
                    success: false,
                    unlocked: None,
                    error: Some("Database error during unlock".to_string()),
                }),
            )
        }
    }
}
