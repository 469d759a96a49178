//! Account and preference flows against PostgreSQL.
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

mod common;

use sqlx::PgPool;
use urban_reports::{
    auth::services::{login, refresh, register},
    users::{repo_types::ProfilePatch, services},
    AppError,
};
use uuid::Uuid;

async fn user_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn duplicate_email_is_rejected_without_a_new_row(pool: PgPool) {
    common::user(&pool, "ana").await;

    let mut again = common::registration("ana2");
    again.email = "ANA@example.com ".into();
    let err = register(&pool, &common::keys(), again).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    assert_eq!(user_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn duplicate_username_is_rejected_without_a_new_row(pool: PgPool) {
    common::user(&pool, "bruno").await;

    let mut again = common::registration("bruno");
    again.email = "other@example.com".into();
    let err = register(&pool, &common::keys(), again).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref m) if m.contains("Username")), "{err:?}");
    assert_eq!(user_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn login_and_refresh(pool: PgPool) {
    let user = common::user(&pool, "carla").await;
    let keys = common::keys();

    let (logged_in, tokens) = login(&pool, &keys, " Carla@Example.com", "correct-horse")
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
    assert_eq!(keys.verify(&tokens.access_token).unwrap().sub, user.id);

    let err = login(&pool, &keys, "carla@example.com", "wrong-horse").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    let err = login(&pool, &keys, "nobody@example.com", "correct-horse").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let (again, _) = refresh(&pool, &keys, &tokens.refresh_token).await.unwrap();
    assert_eq!(again.id, user.id);
    let err = refresh(&pool, &keys, &tokens.access_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn preferences_flip_each_call(pool: PgPool) {
    let user = common::user(&pool, "dora").await;
    assert!(!user.is_dark_mode);
    assert!(user.notifications_enabled);

    assert!(services::toggle_dark_mode(&pool, user.id).await.unwrap());
    assert!(!services::toggle_dark_mode(&pool, user.id).await.unwrap());
    assert!(!services::toggle_notifications(&pool, user.id).await.unwrap());

    let stored = services::get_user(&pool, user.id).await.unwrap();
    assert!(!stored.is_dark_mode);
    assert!(!stored.notifications_enabled);

    let err = services::toggle_dark_mode(&pool, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn profile_edit_keeps_unset_fields_and_guards_email(pool: PgPool) {
    let ana = common::user(&pool, "ana").await;
    common::user(&pool, "bia").await;

    let updated = services::update_profile(
        &pool,
        ana.id,
        ProfilePatch {
            city: Some("Olinda".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.city.as_deref(), Some("Olinda"));
    assert_eq!(updated.name, ana.name);
    assert_eq!(updated.email, ana.email);

    let err = services::update_profile(
        &pool,
        ana.id,
        ProfilePatch {
            email: Some("bia@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
