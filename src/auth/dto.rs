use serde::{Deserialize, Serialize};

use crate::users::dto::ProfileResponse;

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub birth_date: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: ProfileResponse,
}
