use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CommentRequest, VoteRequest, VoteResponse},
    repo_types::Comment,
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn engagement_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/:id/comments", post(add_comment))
        .route("/reports/:id/vote", post(cast_vote))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = services::add_comment(&state.db, report_id, user_id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state))]
pub async fn cast_vote(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> AppResult<Json<VoteResponse>> {
    let outcome = services::cast_vote(&state.db, report_id, user_id, payload.direction).await?;
    Ok(Json(VoteResponse {
        state: outcome.state,
        votes: outcome.tally.into(),
    }))
}
