//! Single-text translation endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub text_ja: String,
}

/// POST /api/translate
///
/// Body `{"text": "..."}`. Runs one line through the batcher, so it shares
/// the per-line cache and the pass-through fallback with the quiz pipeline.
pub async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing text".to_string()))?;

    let mut translated = state.translator.translate_lines(&[text]).await;
    let text_ja = translated
        .pop()
        .ok_or_else(|| ApiError::Internal("empty translation result".to_string()))?;

    Ok(Json(TranslateResponse { text_ja }))
}

/// Build translation routes
pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/api/translate", post(translate_text))
}
