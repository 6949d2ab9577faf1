use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{DateQuery, DateRangeQuery};
use super::repo_types::DiaryEntry;
use crate::{error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/read/diary", get(read_diary))
        .route("/read/diaries", get(read_diaries))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/create/diary", post(create_diary))
        .route("/update/diary", put(update_diary))
        .route("/delete/diary", delete(delete_diary))
}

/// POST /create/diary?date=YYYY-MM-DD, body = diary text
#[instrument(skip(state, text))]
pub async fn create_diary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
    text: String,
) -> Result<StatusCode, AppError> {
    state.service.create_diary(q.date, &text).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn read_diary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<DiaryEntry>>, AppError> {
    Ok(Json(state.service.read_diary(q.date).await?))
}

#[instrument(skip(state))]
pub async fn read_diaries(
    State(state): State<AppState>,
    Query(q): Query<DateRangeQuery>,
) -> Result<Json<Vec<DiaryEntry>>, AppError> {
    let entries = state
        .service
        .read_diaries(q.start_date, q.end_date)
        .await?;
    Ok(Json(entries))
}

/// PUT /update/diary?date=YYYY-MM-DD. Answers 200 whether or not an entry matched.
#[instrument(skip(state, text))]
pub async fn update_diary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
    text: String,
) -> Result<StatusCode, AppError> {
    state.service.update_diary(q.date, &text).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn delete_diary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<StatusCode, AppError> {
    state.service.delete_diary(q.date).await?;
    Ok(StatusCode::OK)
}
