use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    repo,
    repo_types::{Comment, VoteDirection, VoteTally},
    vote::{self, VoteAction, VoteState},
};
use crate::{
    error::{is_foreign_key_violation, is_unique_violation, AppError, AppResult},
    reports, validate,
};

fn report_not_found(report_id: Uuid) -> AppError {
    AppError::not_found(format!("report {} not found", report_id))
}

pub async fn add_comment(db: &PgPool, report_id: Uuid, user_id: Uuid, content: &str) -> AppResult<Comment> {
    let content = validate::required("content", content)?;

    let mut tx = db.begin().await?;
    if !reports::repo::lock_exists(&mut tx, report_id).await? {
        return Err(report_not_found(report_id));
    }
    let comment = repo::insert_comment(&mut tx, report_id, user_id, &content)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found(format!("user {} not found", user_id))
            } else {
                AppError::from(e)
            }
        })?;
    tx.commit().await?;

    info!(%report_id, %user_id, comment_id = %comment.id, "comment added");
    Ok(comment)
}

/// Result of a vote toggle: the caller's vote and the report's tally after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub state: VoteState,
    pub tally: VoteTally,
}

/// Toggle the user's vote on a report.
///
/// Read, decide and write happen in one transaction with the existing vote
/// row locked. Two first-time votes racing past the lock collide on the
/// `(user_id, report_id)` unique key; the loser gets a conflict and may retry.
pub async fn cast_vote(
    db: &PgPool,
    report_id: Uuid,
    user_id: Uuid,
    direction: VoteDirection,
) -> AppResult<VoteOutcome> {
    let mut tx = db.begin().await?;

    if !reports::repo::lock_exists(&mut tx, report_id).await? {
        return Err(report_not_found(report_id));
    }

    let existing = repo::find_vote_for_update(&mut tx, report_id, user_id).await?;
    let action = vote::decide(existing, direction);
    let written = match action {
        VoteAction::Insert(d) => repo::insert_vote(&mut tx, report_id, user_id, d).await,
        VoteAction::Flip(d) => repo::update_vote(&mut tx, report_id, user_id, d).await,
        VoteAction::Delete => repo::delete_vote(&mut tx, report_id, user_id).await,
    };
    if let Err(e) = written {
        if is_unique_violation(&e) {
            warn!(%report_id, %user_id, "concurrent vote lost the race");
            return Err(AppError::conflict("vote changed concurrently, retry"));
        }
        if is_foreign_key_violation(&e) {
            return Err(AppError::not_found(format!("user {} not found", user_id)));
        }
        return Err(e.into());
    }

    let tally = repo::tally_in(&mut tx, report_id).await?;
    tx.commit().await?;

    let state = action.resulting_state();
    info!(%report_id, %user_id, ?action, ?state, score = tally.score(), "vote cast");
    Ok(VoteOutcome { state, tally })
}
