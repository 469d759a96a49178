use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Comment record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Comment joined with the commenter's username, for report pages.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Up/down counts for one report, derived from vote rows on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct VoteTally {
    pub up: i64,
    pub down: i64,
}

impl VoteTally {
    pub fn score(&self) -> i64 {
        self.up - self.down
    }
}
