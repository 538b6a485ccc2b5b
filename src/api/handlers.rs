use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Genre, MovieSearchResult, NewWatchRecord, SummaryData, User, WatchRecord},
    services::summary,
};

use super::{AppState, CurrentUser};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub year: Option<i32>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
}

const DEFAULT_SIGN_IN_PROVIDER: &str = "google";

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// OAuth sign-in URL for the browser to follow
pub async fn sign_in(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
) -> AppResult<Json<SignInResponse>> {
    let provider = query
        .provider
        .as_deref()
        .unwrap_or(DEFAULT_SIGN_IN_PROVIDER);
    let url = state.identity.sign_in_url(provider)?;
    Ok(Json(SignInResponse { url }))
}

/// Ends the session and forgets everything cached for it
pub async fn sign_out(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<StatusCode> {
    state.sessions.invalidate(&current.access_token).await;
    state.journals.evict(current.user.id).await;

    state.identity.sign_out(&current.access_token).await?;

    tracing::info!(user_id = %current.user.id, "Signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

/// Lists the user's watch records, optionally by year and title
pub async fn list_movies(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<WatchRecord>>> {
    let journal = state
        .journals
        .refresh(state.records.as_ref(), current.user.id)
        .await?;
    let records = journal.lock().await.filter(query.year, query.q.as_deref());
    Ok(Json(records))
}

/// Logs a newly watched movie
pub async fn add_movie(
    State(state): State<AppState>,
    current: CurrentUser,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewWatchRecord>,
) -> AppResult<(StatusCode, Json<WatchRecord>)> {
    let record = request.into_record(current.user.id)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %current.user.id,
        record_id = %record.id,
        "Adding watch record"
    );

    let journal = state
        .journals
        .journal(state.records.as_ref(), current.user.id)
        .await?;
    journal
        .lock()
        .await
        .add(state.records.as_ref(), record.clone())
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Deletes one of the user's watch records
pub async fn delete_movie(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let journal = state
        .journals
        .journal(state.records.as_ref(), current.user.id)
        .await?;
    journal.lock().await.delete(state.records.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Searches the metadata service for movies to log
pub async fn search_movies(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSearchResult>>> {
    let results = state.metadata.search_movies(&params.query).await?;

    tracing::debug!(
        user_id = %current.user.id,
        provider = state.metadata.name(),
        results = results.len(),
        "Metadata search served"
    );

    Ok(Json(results))
}

/// Genre labels offered when logging a movie
pub async fn list_genres(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.metadata.list_genres().await?;

    tracing::debug!(
        user_id = %current.user.id,
        provider = state.metadata.name(),
        genres = genres.len(),
        "Genre list served"
    );

    Ok(Json(genres))
}

/// Yearly wrapped summary, for the current year unless `year` is given
pub async fn yearly_summary(
    State(state): State<AppState>,
    current: CurrentUser,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<SummaryData>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let journal = state
        .journals
        .journal(state.records.as_ref(), current.user.id)
        .await?;
    // Release the journal before the generator call
    let records = journal.lock().await.for_year(year);

    tracing::info!(
        request_id = %request_id,
        user_id = %current.user.id,
        year,
        records = records.len(),
        "Computing yearly summary"
    );

    let summary = summary::compute_summary(&records, year, state.generator.as_ref()).await;
    Ok(Json(summary))
}
