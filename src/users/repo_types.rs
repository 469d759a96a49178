use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String, // argon2 PHC string
    pub name: String,
    pub surname: String,
    pub birth_date: Option<Date>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub city: Option<String>,
    pub profile_image: Option<String>, // storage key
    pub is_dark_mode: bool,
    pub notifications_enabled: bool,
    pub created_at: OffsetDateTime,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<Date>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub city: Option<String>,
}

/// Profile edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// Preference flags a user can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    DarkMode,
    Notifications,
}

impl Preference {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::DarkMode => "is_dark_mode",
            Self::Notifications => "notifications_enabled",
        }
    }
}
