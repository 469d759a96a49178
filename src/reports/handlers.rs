use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{FeedItem, PhotoResponse, ReportResponse},
    repo_types::Report,
    search::ReportFilter,
    services::{self, ReportInput, FEED_LIMIT},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    photos::{
        services::{presign_many, remove_objects, store_uploads, UploadKind},
        UploadItem,
    },
    state::{AppState, MAX_UPLOAD_BYTES},
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports",
            get(list_feed)
                .post(create_report)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/reports/:id", get(get_report).delete(delete_report))
        .route("/search", get(search))
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
}
fn default_feed_limit() -> i64 {
    FEED_LIMIT
}

/// GET /reports: the newest reports, at most 50.
#[instrument(skip(state))]
pub async fn list_feed(
    State(state): State<AppState>,
    Query(p): Query<FeedParams>,
) -> AppResult<Json<Vec<FeedItem>>> {
    Ok(Json(services::list_feed(&state.db, p.limit).await?))
}

/// GET /search?q=&city=&category=
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<Report>>> {
    Ok(Json(services::search(&state.db, &filter).await?))
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReportResponse>> {
    let details = services::get_report(&state.db, id).await?;
    let keys: Vec<String> = details.photos.iter().map(|p| p.storage_key.clone()).collect();
    let urls = presign_many(state.storage.as_ref(), &keys).await?;
    let photos = details
        .photos
        .iter()
        .zip(urls)
        .map(|(p, url)| PhotoResponse { id: p.id, url })
        .collect();

    Ok(Json(ReportResponse {
        report: details.report,
        author: details.author,
        photos,
        comments: details.comments,
        votes: details.votes.into(),
    }))
}

async fn read_report_form(mp: &mut Multipart) -> AppResult<(ReportInput, Vec<UploadItem>)> {
    let bad = |e: axum::extract::multipart::MultipartError| AppError::validation(e.body_text());
    let mut input = ReportInput::default();
    let mut uploads = Vec::new();

    while let Some(field) = mp.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photos" | "photos[]" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let body = field.bytes().await.map_err(bad)?;
                // Browsers send an empty part when no file was picked.
                if filename.is_empty() && body.is_empty() {
                    continue;
                }
                uploads.push(UploadItem { filename, body });
            }
            "title" => input.title = field.text().await.map_err(bad)?,
            "description" => input.description = field.text().await.map_err(bad)?,
            "category" => input.category = field.text().await.map_err(bad)?,
            "latitude" => input.latitude = Some(field.text().await.map_err(bad)?),
            "longitude" => input.longitude = Some(field.text().await.map_err(bad)?),
            "address" => input.address = Some(field.text().await.map_err(bad)?),
            _ => {}
        }
    }
    Ok((input, uploads))
}

/// POST /reports (multipart): title, description, category, latitude,
/// longitude, address, and any number of `photos` files.
#[instrument(skip(state, mp))]
pub async fn create_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<impl IntoResponse> {
    let (input, uploads) = read_report_form(&mut mp).await?;
    let new = input.validate().map_err(|e| {
        warn!(%user_id, error = %e, "rejected report");
        e
    })?;

    let keys = store_uploads(state.storage.as_ref(), UploadKind::Report, user_id, uploads).await?;
    let report = match services::create_report(&state.db, user_id, &new, &keys).await {
        Ok(r) => r,
        Err(e) => {
            remove_objects(state.storage.as_ref(), &keys).await;
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/reports/{}", report.id))],
        Json(report),
    ))
}

#[instrument(skip(state))]
pub async fn delete_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_report(&state.db, state.storage.as_ref(), id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
