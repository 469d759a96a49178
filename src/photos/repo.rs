use sqlx::{FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored image attached to a report.
#[derive(Debug, Clone, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub report_id: Uuid,
    pub storage_key: String,
    pub created_at: OffsetDateTime,
}

/// Insert a photo row; meant to run inside the report-creation transaction.
pub async fn insert_photo(
    conn: &mut PgConnection,
    report_id: Uuid,
    storage_key: &str,
) -> sqlx::Result<Photo> {
    sqlx::query_as::<_, Photo>(
        r#"
        INSERT INTO report_photos (report_id, storage_key)
        VALUES ($1, $2)
        RETURNING id, report_id, storage_key, created_at
        "#,
    )
    .bind(report_id)
    .bind(storage_key)
    .fetch_one(conn)
    .await
}

// ---- Queries ----

/// All photos of a report, oldest first (upload order).
pub async fn list_by_report(db: &PgPool, report_id: Uuid) -> sqlx::Result<Vec<Photo>> {
    sqlx::query_as::<_, Photo>(
        r#"
        SELECT id, report_id, storage_key, created_at
          FROM report_photos
         WHERE report_id = $1
         ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(report_id)
    .fetch_all(db)
    .await
}

pub async fn keys_by_report(conn: &mut PgConnection, report_id: Uuid) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>("SELECT storage_key FROM report_photos WHERE report_id = $1")
        .bind(report_id)
        .fetch_all(conn)
        .await
}
