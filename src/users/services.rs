use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::ProfileResponse,
    repo_types::{Preference, ProfilePatch, User},
};
use crate::{
    error::{is_unique_violation, AppError, AppResult},
    photos::services::{
        remove_objects, store_uploads, UploadItem, UploadKind, PRESIGN_TTL_SECS,
    },
    storage::StorageClient,
    validate,
};

fn user_not_found(user_id: Uuid) -> AppError {
    AppError::not_found(format!("user {} not found", user_id))
}

pub async fn get_user(db: &PgPool, user_id: Uuid) -> AppResult<User> {
    User::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

/// Profile view with the image key resolved to a presigned URL.
pub async fn profile_response(storage: &dyn StorageClient, user: User) -> AppResult<ProfileResponse> {
    let url = match user.profile_image.as_deref() {
        Some(key) => Some(storage.presign_get(key, PRESIGN_TTL_SECS).await?),
        None => None,
    };
    Ok(ProfileResponse::new(user, url))
}

/// Trim the patch, drop blanks, and validate a new email.
pub(crate) fn normalize_patch(patch: ProfilePatch) -> AppResult<ProfilePatch> {
    let email = match validate::optional(patch.email) {
        Some(e) => Some(validate::normalize_email(&e)?),
        None => None,
    };
    Ok(ProfilePatch {
        name: validate::optional(patch.name),
        surname: validate::optional(patch.surname),
        email,
        phone: validate::optional(patch.phone),
        city: validate::optional(patch.city),
    })
}

pub async fn update_profile(db: &PgPool, user_id: Uuid, patch: ProfilePatch) -> AppResult<User> {
    let patch = normalize_patch(patch)?;

    if let Some(email) = patch.email.as_deref() {
        if User::email_taken(db, email, Some(user_id)).await? {
            return Err(AppError::conflict("Email already registered"));
        }
    }

    let updated = User::update_profile(db, user_id, &patch)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Email already registered")
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| user_not_found(user_id))?;

    info!(%user_id, "profile updated");
    Ok(updated)
}

/// Store a new profile image and point the user at it; the old object is removed.
pub async fn set_profile_image(
    db: &PgPool,
    storage: &dyn StorageClient,
    user_id: Uuid,
    upload: UploadItem,
) -> AppResult<User> {
    let keys = store_uploads(storage, UploadKind::Profile, user_id, vec![upload]).await?;

    let result = async {
        let mut tx = db.begin().await?;
        let previous = User::lock_profile_image(&mut tx, user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;
        let user = User::set_profile_image(&mut tx, user_id, &keys[0]).await?;
        tx.commit().await?;
        Ok::<_, AppError>((user, previous))
    }
    .await;

    match result {
        Ok((user, previous)) => {
            if let Some(old) = previous {
                remove_objects(storage, &[old]).await;
            }
            info!(%user_id, "profile image replaced");
            Ok(user)
        }
        Err(e) => {
            remove_objects(storage, &keys).await;
            Err(e)
        }
    }
}

pub async fn toggle_dark_mode(db: &PgPool, user_id: Uuid) -> AppResult<bool> {
    toggle(db, user_id, Preference::DarkMode).await
}

pub async fn toggle_notifications(db: &PgPool, user_id: Uuid) -> AppResult<bool> {
    toggle(db, user_id, Preference::Notifications).await
}

async fn toggle(db: &PgPool, user_id: Uuid, pref: Preference) -> AppResult<bool> {
    let value = User::toggle_preference(db, user_id, pref)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    info!(%user_id, preference = ?pref, value, "preference toggled");
    Ok(value)
}
