use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{ProfilePatch, User};

/// Public part of the user returned to the client. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub city: Option<String>,
    pub profile_image: Option<String>,
    pub profile_image_url: Option<String>,
    pub dark_mode: bool,
    pub notifications: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProfileResponse {
    pub fn new(user: User, profile_image_url: Option<String>) -> Self {
        let birth_date = user
            .birth_date
            .and_then(|d| d.format(format_description!("[year]-[month]-[day]")).ok());
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            surname: user.surname,
            birth_date,
            gender: user.gender,
            race: user.race,
            phone: user.phone,
            national_id: user.national_id,
            city: user.city,
            profile_image: user.profile_image,
            profile_image_url,
            dark_mode: user.is_dark_mode,
            notifications: user.notifications_enabled,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl From<UpdateProfileRequest> for ProfilePatch {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            name: r.name,
            surname: r.surname,
            email: r.email,
            phone: r.phone,
            city: r.city,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DarkModeResponse {
    pub dark_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@city.gov".into(),
            username: "ana".into(),
            password_hash: "$argon2id$secret".into(),
            name: "Ana".into(),
            surname: "Souza".into(),
            birth_date: Date::from_calendar_date(1990, Month::July, 1).ok(),
            gender: None,
            race: None,
            phone: None,
            national_id: None,
            city: Some("Recife".into()),
            profile_image: None,
            is_dark_mode: true,
            notifications_enabled: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn profile_hides_hash_and_formats_dates() {
        let json = serde_json::to_value(ProfileResponse::new(user(), None)).unwrap();
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["birth_date"], "1990-07-01");
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
        assert_eq!(json["dark_mode"], true);
        assert_eq!(json["notifications"], false);
    }
}
