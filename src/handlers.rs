// handlers.rs
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::models::{
    CreatePollRequest, Poll, PollResults, PollSummary, UpdateOptionsRequest, VoteRequest,
    VoteResponse,
};
use crate::state::AppState;

/// Fetch a poll's title and current options.
pub async fn get_poll(
    State(state): State<AppState>,
    Path(poll_id): Path<i64>,
) -> Result<Json<Poll>, ApiError> {
    let poll = state.store.get_poll(poll_id).await?;
    Ok(Json(poll))
}

/// Cast a vote for one option of a poll.
///
/// Returns the full updated options array so the caller can render results
/// without a second fetch.
pub async fn vote(
    State(state): State<AppState>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let (poll_id, option_index) = match (payload.poll_id, payload.option_index) {
        (Some(poll_id), Some(option_index)) => (poll_id, option_index),
        _ => return Err(ApiError::InvalidParams),
    };
    // A negative index can never address an option.
    let option_index = usize::try_from(option_index).map_err(|_| ApiError::InvalidOption)?;

    let results = state.store.increment_vote(poll_id, option_index).await?;
    info!(poll_id, option_index, "vote recorded");

    Ok(Json(VoteResponse {
        success: true,
        message: "Vote recorded".to_string(),
        results,
    }))
}

/// Results breakdown for a poll: vote totals and integer percentage shares.
pub async fn get_results(
    State(state): State<AppState>,
    Path(poll_id): Path<i64>,
) -> Result<Json<PollResults>, ApiError> {
    let poll = state.store.get_poll(poll_id).await?;
    Ok(Json(poll.results()))
}

/// List all polls with their vote totals (admin).
pub async fn list_polls(
    State(state): State<AppState>,
) -> Result<Json<Vec<PollSummary>>, ApiError> {
    let polls = state.store.list_polls().await?;
    Ok(Json(polls))
}

/// Create a new poll (admin).
pub async fn create_poll(
    State(state): State<AppState>,
    Json(payload): Json<CreatePollRequest>,
) -> Result<(StatusCode, Json<Poll>), ApiError> {
    let poll = state.store.create_poll(&payload.title, payload.options).await?;
    info!(poll_id = poll.id, "poll created");
    Ok((StatusCode::CREATED, Json(poll)))
}

/// Replace a poll's options (admin label edits).
pub async fn update_options(
    State(state): State<AppState>,
    Path(poll_id): Path<i64>,
    Json(payload): Json<UpdateOptionsRequest>,
) -> Result<Json<Poll>, ApiError> {
    let poll = state.store.save_options(poll_id, payload.options).await?;
    info!(poll_id, "poll options updated");
    Ok(Json(poll))
}
