use sqlx::PgPool;
use tracing::{info, warn};

use super::{
    dto::RegisterRequest,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::{is_unique_violation, violated_constraint, AppError, AppResult},
    users::repo_types::{NewUser, User},
    validate,
};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Access/refresh token pair issued on login, registration and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn issue_tokens(keys: &JwtKeys, user: &User) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
    })
}

/// Validate the registration form and hash the password.
pub(crate) fn prepare_new_user(req: RegisterRequest) -> AppResult<NewUser> {
    let email = validate::normalize_email(&req.email)?;
    let username = validate::required("username", &req.username)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }
    let name = validate::required("name", &req.name)?;
    let surname = validate::required("surname", &req.surname)?;
    let birth_date = validate::parse_date("birth_date", req.birth_date)?;

    Ok(NewUser {
        email,
        username,
        password_hash: hash_password(&req.password)?,
        name,
        surname,
        birth_date,
        gender: validate::optional(req.gender),
        race: validate::optional(req.race),
        phone: validate::optional(req.phone),
        national_id: validate::optional(req.national_id),
        city: validate::optional(req.city),
    })
}

/// Create an account. Duplicate email or username is a conflict and leaves
/// no row behind.
pub async fn register(db: &PgPool, keys: &JwtKeys, req: RegisterRequest) -> AppResult<(User, TokenPair)> {
    let new = prepare_new_user(req)?;

    if User::email_taken(db, &new.email, None).await? {
        warn!(email = %new.email, "email already registered");
        return Err(AppError::conflict("Email already registered"));
    }
    if User::username_taken(db, &new.username).await? {
        warn!(username = %new.username, "username already taken");
        return Err(AppError::conflict("Username already taken"));
    }

    // Unique constraints catch a concurrent registration that slipped past the checks.
    let user = User::create(db, &new).await.map_err(|e| {
        if is_unique_violation(&e) {
            match violated_constraint(&e) {
                Some("users_username_key") => AppError::conflict("Username already taken"),
                _ => AppError::conflict("Email already registered"),
            }
        } else {
            AppError::from(e)
        }
    })?;

    let tokens = issue_tokens(keys, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((user, tokens))
}

/// Exchange credentials for tokens. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(db: &PgPool, keys: &JwtKeys, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
    let invalid = || AppError::unauthorized("Invalid credentials");
    let email = validate::normalize_email(email).map_err(|_| invalid())?;

    let Some(user) = User::find_by_email(db, &email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let tokens = issue_tokens(keys, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, tokens))
}

pub async fn refresh(db: &PgPool, keys: &JwtKeys, refresh_token: &str) -> AppResult<(User, TokenPair)> {
    let claims = keys
        .verify_refresh(refresh_token)
        .map_err(|e| AppError::unauthorized(e.to_string()))?;
    let user = User::find_by_id(db, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    let tokens = issue_tokens(keys, &user)?;
    Ok((user, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: " Ana@City.gov ".into(),
            username: " ana ".into(),
            password: "longenough".into(),
            name: "Ana".into(),
            surname: "Souza".into(),
            birth_date: Some("1990-01-31".into()),
            gender: Some(" ".into()),
            race: None,
            phone: Some("+55 81 5555-0000".into()),
            national_id: None,
            city: Some("Recife".into()),
        }
    }

    #[test]
    fn registration_is_normalized_and_hashed() {
        let new = prepare_new_user(request()).unwrap();
        assert_eq!(new.email, "ana@city.gov");
        assert_eq!(new.username, "ana");
        assert_eq!(new.gender, None);
        assert_eq!(new.city.as_deref(), Some("Recife"));
        assert!(new.birth_date.is_some());
        assert_ne!(new.password_hash, "longenough");
        assert!(verify_password("longenough", &new.password_hash).unwrap());
    }

    #[test]
    fn registration_rejects_bad_input() {
        let cases: [fn(&mut RegisterRequest); 6] = [
            |r: &mut RegisterRequest| r.email = "broken".into(),
            |r: &mut RegisterRequest| r.username = "  ".into(),
            |r: &mut RegisterRequest| r.password = "short".into(),
            |r: &mut RegisterRequest| r.name = String::new(),
            |r: &mut RegisterRequest| r.surname = String::new(),
            |r: &mut RegisterRequest| r.birth_date = Some("yesterday".into()),
        ];
        for mutate in cases {
            let mut req = request();
            mutate(&mut req);
            assert!(matches!(prepare_new_user(req), Err(AppError::Validation(_))));
        }
    }
}
