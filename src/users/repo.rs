use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::repo_types::{NewUser, Preference, ProfilePatch, User};

const USER_COLUMNS: &str = "id, email, username, password_hash, name, surname, birth_date, \
     gender, race, phone, national_id, city, profile_image, is_dark_mode, \
     notifications_enabled, created_at";

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn email_taken(db: &PgPool, email: &str, except: Option<Uuid>) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(db)
        .await
    }

    pub async fn username_taken(db: &PgPool, username: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(db)
            .await
    }

    pub async fn create(db: &PgPool, new: &NewUser) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, name, surname, birth_date,
                               gender, race, phone, national_id, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(&new.surname)
        .bind(new.birth_date)
        .bind(&new.gender)
        .bind(&new.race)
        .bind(&new.phone)
        .bind(&new.national_id)
        .bind(&new.city)
        .fetch_one(db)
        .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name    = COALESCE($2, name),
                   surname = COALESCE($3, surname),
                   email   = COALESCE($4, email),
                   phone   = COALESCE($5, phone),
                   city    = COALESCE($6, city)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.surname)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.city)
        .fetch_optional(db)
        .await
    }

    /// Lock the user row and return its current profile image key.
    /// Outer `None` means the user does not exist.
    pub async fn lock_profile_image(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> sqlx::Result<Option<Option<String>>> {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT profile_image FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn set_profile_image(
        conn: &mut PgConnection,
        id: Uuid,
        key: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET profile_image = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(key)
        .fetch_one(conn)
        .await
    }

    /// Negate a preference flag in a single statement and return the new value.
    pub async fn toggle_preference(
        db: &PgPool,
        id: Uuid,
        pref: Preference,
    ) -> sqlx::Result<Option<bool>> {
        let col = pref.column();
        sqlx::query_scalar::<_, bool>(&format!(
            "UPDATE users SET {col} = NOT {col} WHERE id = $1 RETURNING {col}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
