//! Translation lookup via an external translate API.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Query parameters for translation.
#[derive(Debug, Deserialize)]
pub struct TranslateQuery {
    pub word: String,
    /// Source language code.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    /// Target language code.
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "uk".to_string()
}

/// Translation lookup result.
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub pronunciation_url: String,
}

/// Look up a word's translation and pronunciation URL.
/// GET /translate
pub async fn translate_word(
    Query(query): Query<TranslateQuery>,
) -> ApiResult<Json<TranslateResponse>> {
    let word = query.word.trim();
    if word.is_empty() {
        return Err(ApiError::bad_request("No word provided for translation"));
    }

    let client = reqwest::Client::new();
    let response = client
        .get(TRANSLATE_URL)
        .query(&[
            ("client", "gtx"),
            ("sl", query.source_lang.as_str()),
            ("tl", query.target_lang.as_str()),
            ("dt", "t"),
            ("q", word),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(error = %e, "translation request failed");
            ApiError::internal(format!("Translation API request failed: {}", e))
        })?;

    let data: serde_json::Value = response.json().await.map_err(|e| {
        warn!(error = %e, "translation response was not json");
        ApiError::internal("Unexpected translation response format")
    })?;

    // The response nests the translation at [0][0][0]
    let translation = data
        .get(0)
        .and_then(|v| v.get(0))
        .and_then(|v| v.get(0))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::internal("Unexpected translation response format"))?
        .to_string();

    let pronunciation_url = format!(
        "{}?ie=UTF-8&tl={}&client=gtx&q={}",
        TTS_URL, query.source_lang, word
    );

    Ok(Json(TranslateResponse {
        translation,
        pronunciation_url,
    }))
}
