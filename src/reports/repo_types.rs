use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a report. New reports start as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

/// Report record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid, // owner, never reassigned
    pub title: String,
    pub description: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub status: ReportStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated input for a new report; only built by `ReportInput::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) coordinate: Option<(f64, f64)>, // (latitude, longitude)
    pub(crate) address: Option<String>,
}

/// Feed row: a report joined with its author and photo count.
#[derive(Debug, Clone, FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub status: ReportStatus,
    pub created_at: OffsetDateTime,
    pub author: String,
    pub photo_count: i64,
}
