use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::FeedItem,
    repo,
    repo_types::{NewReport, Report},
    search::ReportFilter,
};
use crate::{
    engagement::{self, repo_types::{CommentWithAuthor, VoteTally}},
    error::{AppError, AppResult},
    photos::{self, services::remove_objects, Photo},
    storage::StorageClient,
    validate,
};

/// Most items `GET /api/reports` ever returns.
pub const FEED_LIMIT: i64 = 50;

/// Raw create-report input as it arrives from the client.
#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub address: Option<String>,
}

fn parse_coordinate(field: &str, raw: Option<String>, bound: f64) -> AppResult<Option<f64>> {
    let Some(raw) = validate::optional(raw) else {
        return Ok(None);
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| AppError::validation(format!("{field} must be a number")))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(AppError::validation(format!("{field} must be within ±{bound}")));
    }
    Ok(Some(value))
}

impl ReportInput {
    pub fn validate(self) -> AppResult<NewReport> {
        let title = validate::required("title", &self.title)?;
        let description = validate::required("description", &self.description)?;
        let category = validate::required("category", &self.category)?;
        let latitude = parse_coordinate("latitude", self.latitude, 90.0)?;
        let longitude = parse_coordinate("longitude", self.longitude, 180.0)?;
        let coordinate = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            (None, None) => None,
            _ => {
                return Err(AppError::validation(
                    "latitude and longitude must be given together",
                ))
            }
        };
        Ok(NewReport {
            title,
            description,
            category,
            coordinate,
            address: validate::optional(self.address),
        })
    }
}

/// Insert a pending report and its photo rows in one transaction.
pub async fn create_report(
    db: &PgPool,
    owner_id: Uuid,
    new: &NewReport,
    photo_keys: &[String],
) -> AppResult<Report> {
    let mut tx = db.begin().await?;
    let report = repo::insert_report(&mut tx, owner_id, new).await?;
    for key in photo_keys {
        photos::repo::insert_photo(&mut tx, report.id, key).await?;
    }
    tx.commit().await?;

    info!(report_id = %report.id, %owner_id, photos = photo_keys.len(), "report created");
    Ok(report)
}

/// A report with everything hanging off it, loaded by explicit queries.
#[derive(Debug, Clone)]
pub struct ReportDetails {
    pub report: Report,
    pub author: String,
    pub photos: Vec<Photo>,
    pub comments: Vec<CommentWithAuthor>,
    pub votes: VoteTally,
}

pub async fn get_report(db: &PgPool, report_id: Uuid) -> AppResult<ReportDetails> {
    let (report, author) = repo::find_with_author(db, report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("report {} not found", report_id)))?;
    let photos = photos::repo::list_by_report(db, report_id).await?;
    let comments = engagement::repo::list_comments(db, report_id).await?;
    let votes = engagement::repo::tally(db, report_id).await?;
    Ok(ReportDetails {
        report,
        author,
        photos,
        comments,
        votes,
    })
}

/// Newest first; `None` means no bound.
pub async fn list_recent(db: &PgPool, limit: Option<i64>) -> AppResult<Vec<Report>> {
    if limit.is_some_and(|n| n < 0) {
        return Err(AppError::validation("limit must not be negative"));
    }
    Ok(repo::search(db, &ReportFilter::default(), limit).await?)
}

/// Newest first, all matches.
pub async fn search(db: &PgPool, filter: &ReportFilter) -> AppResult<Vec<Report>> {
    Ok(repo::search(db, filter, None).await?)
}

pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> AppResult<Vec<Report>> {
    Ok(repo::list_by_owner(db, owner_id).await?)
}

pub async fn list_feed(db: &PgPool, limit: i64) -> AppResult<Vec<FeedItem>> {
    let rows = repo::feed(db, limit.clamp(1, FEED_LIMIT)).await?;
    Ok(rows.into_iter().map(FeedItem::from).collect())
}

/// Delete the caller's own report. Someone else's report reads as missing.
pub async fn delete_report(
    db: &PgPool,
    storage: &dyn StorageClient,
    report_id: Uuid,
    owner_id: Uuid,
) -> AppResult<()> {
    let mut tx = db.begin().await?;
    if !repo::lock_owned(&mut tx, report_id, owner_id).await? {
        return Err(AppError::not_found(format!("report {} not found", report_id)));
    }
    let keys = photos::repo::keys_by_report(&mut tx, report_id).await?;
    repo::delete_owned(&mut tx, report_id, owner_id).await?;
    tx.commit().await?;

    remove_objects(storage, &keys).await;
    info!(%report_id, %owner_id, photos = keys.len(), "report deleted");
    Ok(())
}
