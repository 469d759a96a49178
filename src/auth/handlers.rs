use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
    services::{self, TokenPair},
};
use crate::{
    error::AppResult,
    state::AppState,
    users::{self, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

async fn auth_response(state: &AppState, user: User, tokens: TokenPair) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: users::services::profile_response(state.storage.as_ref(), user).await?,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, tokens) = services::register(&state.db, &state.jwt, payload).await?;
    Ok((StatusCode::CREATED, Json(auth_response(&state, user, tokens).await?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, tokens) = services::login(&state.db, &state.jwt, &payload.email, &payload.password).await?;
    Ok(Json(auth_response(&state, user, tokens).await?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, tokens) = services::refresh(&state.db, &state.jwt, &payload.refresh_token).await?;
    Ok(Json(auth_response(&state, user, tokens).await?))
}
