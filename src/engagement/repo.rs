use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{Comment, CommentWithAuthor, VoteDirection, VoteTally};

// ---- Comments ----

pub async fn insert_comment(
    conn: &mut PgConnection,
    report_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (report_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, report_id, user_id, content, created_at
        "#,
    )
    .bind(report_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(conn)
    .await
}

/// Comments of a report with author usernames, newest first.
pub async fn list_comments(db: &PgPool, report_id: Uuid) -> sqlx::Result<Vec<CommentWithAuthor>> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.user_id, u.username AS author, c.content, c.created_at
          FROM comments c
          JOIN users u ON u.id = c.user_id
         WHERE c.report_id = $1
         ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(report_id)
    .fetch_all(db)
    .await
}

// ---- Votes ----

/// Current direction of the user's vote, row-locked for the rest of the transaction.
pub async fn find_vote_for_update(
    conn: &mut PgConnection,
    report_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<VoteDirection>> {
    sqlx::query_scalar::<_, VoteDirection>(
        "SELECT direction FROM votes WHERE report_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(report_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn insert_vote(
    conn: &mut PgConnection,
    report_id: Uuid,
    user_id: Uuid,
    direction: VoteDirection,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO votes (report_id, user_id, direction) VALUES ($1, $2, $3)")
        .bind(report_id)
        .bind(user_id)
        .bind(direction)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_vote(
    conn: &mut PgConnection,
    report_id: Uuid,
    user_id: Uuid,
    direction: VoteDirection,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE votes
           SET direction = $3, updated_at = now()
         WHERE report_id = $1 AND user_id = $2
        "#,
    )
    .bind(report_id)
    .bind(user_id)
    .bind(direction)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete_vote(conn: &mut PgConnection, report_id: Uuid, user_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM votes WHERE report_id = $1 AND user_id = $2")
        .bind(report_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

const TALLY_SQL: &str = r#"
    SELECT COUNT(*) FILTER (WHERE direction = 'up')   AS up,
           COUNT(*) FILTER (WHERE direction = 'down') AS down
      FROM votes
     WHERE report_id = $1
"#;

pub async fn tally(db: &PgPool, report_id: Uuid) -> sqlx::Result<VoteTally> {
    sqlx::query_as::<_, VoteTally>(TALLY_SQL)
        .bind(report_id)
        .fetch_one(db)
        .await
}

pub async fn tally_in(conn: &mut PgConnection, report_id: Uuid) -> sqlx::Result<VoteTally> {
    sqlx::query_as::<_, VoteTally>(TALLY_SQL)
        .bind(report_id)
        .fetch_one(conn)
        .await
}

/// Number of vote rows a user holds on a report. At most one by construction.
pub async fn count_user_votes(db: &PgPool, report_id: Uuid, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM votes WHERE report_id = $1 AND user_id = $2",
    )
    .bind(report_id)
    .bind(user_id)
    .fetch_one(db)
    .await
}
