//! Quiz endpoints: by month, random, by code, by genre
//!
//! Handlers validate input, drive the sampler/fetcher, then run the shared
//! translate-and-assemble tail. Upstream trouble is a generic 502; only
//! validation detail reaches the client.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use klq_common::Coordinate;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{QuizPayload, SongRecord};
use crate::services::assemble;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: Option<u16>,
    pub month: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CodeParams {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenreParams {
    pub genre: Option<String>,
}

/// GET /api/quiz?year=&month=
pub async fn quiz_by_month(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> ApiResult<Json<QuizPayload>> {
    let (year, month) = match (params.year, params.month) {
        (Some(year), Some(month)) => (year, month),
        _ => return Err(ApiError::BadRequest("missing year or month".to_string())),
    };
    if !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest("month must be 1-12".to_string()));
    }

    let record = state.sampler.by_month(year, month).await?;
    respond(&state, record).await
}

/// GET /api/quiz/random
pub async fn quiz_random(State(state): State<AppState>) -> ApiResult<Json<QuizPayload>> {
    let record = state.sampler.random().await?;
    respond(&state, record).await
}

/// GET /api/quiz/code?code=
pub async fn quiz_by_code(
    State(state): State<AppState>,
    Query(params): Query<CodeParams>,
) -> ApiResult<Json<QuizPayload>> {
    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing code".to_string()))?;
    let coord = Coordinate::decode(&code)
        .ok_or_else(|| ApiError::BadRequest("malformed code".to_string()))?;

    let record = state.fetcher.fetch(coord).await?;
    respond(&state, record).await
}

/// GET /api/quiz/genre?genre=
pub async fn quiz_by_genre(
    State(state): State<AppState>,
    Query(params): Query<GenreParams>,
) -> ApiResult<Json<QuizPayload>> {
    let genre = params
        .genre
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing genre".to_string()))?;

    let record = state.sampler.by_genre(&genre).await?;
    respond(&state, record).await
}

/// Shared pipeline tail: translate, annotate, assemble
async fn respond(state: &AppState, record: SongRecord) -> ApiResult<Json<QuizPayload>> {
    info!(
        coord = %record.coordinate(),
        title = %record.title,
        lines = record.lines.len(),
        "Serving quiz record"
    );
    let translated = state.translator.translate_lines(&record.lines).await;
    Ok(Json(assemble(record, translated, &state.annotator).await))
}

/// Build quiz routes
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quiz", get(quiz_by_month))
        .route("/api/quiz/random", get(quiz_random))
        .route("/api/quiz/code", get(quiz_by_code))
        .route("/api/quiz/genre", get(quiz_by_genre))
}
