use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FeedRow, Report, ReportStatus};
use crate::engagement::{dto::VoteSummary, repo_types::CommentWithAuthor};

/// Characters of description kept in feed items.
pub const FEED_DESCRIPTION_CHARS: usize = 100;

/// Cut to `FEED_DESCRIPTION_CHARS` characters, marking the cut with `...`.
pub fn truncate_description(text: &str) -> String {
    match text.char_indices().nth(FEED_DESCRIPTION_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Item of `GET /api/reports`.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub status: ReportStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author: String,
    pub photo_count: i64,
}

impl From<FeedRow> for FeedItem {
    fn from(r: FeedRow) -> Self {
        Self {
            id: r.id,
            description: truncate_description(&r.description),
            title: r.title,
            category: r.category,
            latitude: r.latitude,
            longitude: r.longitude,
            address: r.address,
            status: r.status,
            created_at: r.created_at,
            author: r.author,
            photo_count: r.photo_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub url: String,
}

/// Full report view with photos, comments and vote tally.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub author: String,
    pub photos: Vec<PhotoResponse>,
    pub comments: Vec<CommentWithAuthor>,
    pub votes: VoteSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(description: &str) -> FeedRow {
        FeedRow {
            id: Uuid::new_v4(),
            title: "Broken streetlight".into(),
            description: description.into(),
            category: "lighting".into(),
            latitude: Some(-8.05),
            longitude: Some(-34.9),
            address: Some("Rua da Aurora, Recife".into()),
            status: ReportStatus::Pending,
            created_at: OffsetDateTime::UNIX_EPOCH,
            author: "ana".into(),
            photo_count: 2,
        }
    }

    #[test]
    fn long_description_is_cut_at_100_chars() {
        let item = FeedItem::from(row(&"x".repeat(150)));
        assert_eq!(item.description, format!("{}...", "x".repeat(100)));
    }

    #[test]
    fn short_description_is_left_alone() {
        assert_eq!(truncate_description("dark corner"), "dark corner");
        assert_eq!(truncate_description(&"y".repeat(100)), "y".repeat(100));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ã".repeat(120);
        let cut = truncate_description(&text);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.starts_with(&"ã".repeat(100)));
    }

    #[test]
    fn feed_item_wire_shape() {
        let json = serde_json::to_value(FeedItem::from(row("pothole"))).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "address", "author", "category", "created_at", "description", "id", "latitude",
                "longitude", "photo_count", "status", "title"
            ]
        );
        assert_eq!(json["status"], "pending");
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }
}
