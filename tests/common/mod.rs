#![allow(dead_code)]

use sqlx::PgPool;
use urban_reports::{
    auth::{dto::RegisterRequest, services, JwtKeys},
    config::JwtConfig,
    reports::{
        repo_types::Report,
        services::{create_report, ReportInput},
    },
    users::User,
};
use uuid::Uuid;

pub fn keys() -> JwtKeys {
    JwtKeys::from_config(&JwtConfig {
        secret: "integration".into(),
        issuer: "test-issuer".into(),
        audience: "test-aud".into(),
        ttl_minutes: 5,
        refresh_ttl_minutes: 60,
    })
}

pub fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        email: format!("{}@example.com", username),
        username: username.into(),
        password: "correct-horse".into(),
        name: "Test".into(),
        surname: "User".into(),
        birth_date: None,
        gender: None,
        race: None,
        phone: None,
        national_id: None,
        city: Some("Recife".into()),
    }
}

pub async fn user(pool: &PgPool, username: &str) -> User {
    services::register(pool, &keys(), registration(username))
        .await
        .expect("register")
        .0
}

pub fn input(title: &str, description: &str, category: &str, address: Option<&str>) -> ReportInput {
    ReportInput {
        title: title.into(),
        description: description.into(),
        category: category.into(),
        latitude: None,
        longitude: None,
        address: address.map(Into::into),
    }
}

pub async fn report(pool: &PgPool, owner: Uuid, input: ReportInput, photos: &[String]) -> Report {
    let new = input.validate().expect("valid report");
    create_report(pool, owner, &new, photos).await.expect("create report")
}

pub async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("count")
}
