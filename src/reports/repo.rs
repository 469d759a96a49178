use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{
    repo_types::{FeedRow, NewReport, Report},
    search::{select_reports, ReportFilter, REPORT_COLUMNS},
};

pub async fn insert_report(
    conn: &mut PgConnection,
    owner_id: Uuid,
    new: &NewReport,
) -> sqlx::Result<Report> {
    let (latitude, longitude) = new.coordinate.unzip();
    sqlx::query_as::<_, Report>(
        r#"
        INSERT INTO reports (user_id, title, description, category, latitude, longitude, address)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, title, description, category, latitude, longitude,
                  address, status, created_at
        "#,
    )
    .bind(owner_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.category)
    .bind(latitude)
    .bind(longitude)
    .bind(&new.address)
    .fetch_one(conn)
    .await
}

/// A report together with its author's username.
pub async fn find_with_author(db: &PgPool, id: Uuid) -> sqlx::Result<Option<(Report, String)>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        report: Report,
        author: String,
    }

    let row = sqlx::query_as::<_, Row>(&format!(
        r#"
        SELECT {REPORT_COLUMNS}, u.username AS author
          FROM reports r
          JOIN users u ON u.id = r.user_id
         WHERE r.id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|r| (r.report, r.author)))
}

/// Existence check that also holds a share lock until the transaction ends,
/// so the report cannot disappear under a vote or comment.
pub async fn lock_exists(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<bool> {
    let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM reports WHERE id = $1 FOR SHARE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

pub async fn search(db: &PgPool, filter: &ReportFilter, limit: Option<i64>) -> sqlx::Result<Vec<Report>> {
    select_reports(filter, limit)
        .build_query_as::<Report>()
        .fetch_all(db)
        .await
}

pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<Report>> {
    sqlx::query_as::<_, Report>(&format!(
        r#"
        SELECT {REPORT_COLUMNS}
          FROM reports r
         WHERE r.user_id = $1
         ORDER BY r.created_at DESC, r.id DESC
        "#
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn feed(db: &PgPool, limit: i64) -> sqlx::Result<Vec<FeedRow>> {
    sqlx::query_as::<_, FeedRow>(
        r#"
        SELECT r.id, r.title, r.description, r.category, r.latitude, r.longitude,
               r.address, r.status, r.created_at,
               u.username AS author,
               (SELECT COUNT(*) FROM report_photos p WHERE p.report_id = r.id) AS photo_count
          FROM reports r
          JOIN users u ON u.id = r.user_id
         ORDER BY r.created_at DESC, r.id DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Delete a report owned by `owner_id`. Photos, comments and votes go with it
/// through `ON DELETE CASCADE`.
pub async fn delete_owned(conn: &mut PgConnection, id: Uuid, owner_id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM reports WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn lock_owned(conn: &mut PgConnection, id: Uuid, owner_id: Uuid) -> sqlx::Result<bool> {
    let found = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM reports WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(conn)
    .await?;
    Ok(found.is_some())
}
