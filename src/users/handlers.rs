use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{DarkModeResponse, NotificationsResponse, ProfileResponse, UpdateProfileRequest},
    services,
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    photos::UploadItem,
    reports::{self, repo_types::Report},
    state::{AppState, MAX_UPLOAD_BYTES},
};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route(
            "/me/profile-image",
            post(upload_profile_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/me/dark-mode", post(toggle_dark_mode))
        .route("/me/notifications", post(toggle_notifications))
        .route("/me/reports", get(my_reports))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = services::get_user(&state.db, user_id).await?;
    Ok(Json(services::profile_response(state.storage.as_ref(), user).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = services::update_profile(&state.db, user_id, payload.into()).await?;
    Ok(Json(services::profile_response(state.storage.as_ref(), user).await?))
}

/// POST /me/profile-image (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if !matches!(field.name(), Some("image") | Some("profile_image")) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        upload = Some(UploadItem { filename, body });
    }
    let Some(upload) = upload else {
        warn!(%user_id, "profile image upload without file");
        return Err(AppError::validation("image is required"));
    };

    let user = services::set_profile_image(&state.db, state.storage.as_ref(), user_id, upload).await?;
    Ok(Json(services::profile_response(state.storage.as_ref(), user).await?))
}

#[instrument(skip(state))]
pub async fn toggle_dark_mode(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<DarkModeResponse>> {
    let dark_mode = services::toggle_dark_mode(&state.db, user_id).await?;
    Ok(Json(DarkModeResponse { dark_mode }))
}

#[instrument(skip(state))]
pub async fn toggle_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<NotificationsResponse>> {
    let notifications = services::toggle_notifications(&state.db, user_id).await?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// The caller's own reports, newest first.
#[instrument(skip(state))]
pub async fn my_reports(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Report>>> {
    Ok(Json(reports::services::list_by_owner(&state.db, user_id).await?))
}
