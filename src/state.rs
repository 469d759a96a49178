use std::sync::Arc;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{
    auth::JwtKeys,
    config::{AppConfig, JwtConfig, StorageConfig},
    storage::{MemoryStorage, S3Storage, StorageClient},
};

/// Largest accepted multipart body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Everything a request handler may touch, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(
            S3Storage::new(&config.storage)
                .await
                .context("init object storage")?,
        ) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(db, Arc::new(config), storage))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            db,
            config,
            jwt,
            storage,
        }
    }

    /// State with a pool that never connects unless queried and in-memory storage.
    pub fn fake() -> Self {
        let db = PgPoolOptions::new().connect_lazy_with(
            PgConnectOptions::new()
                .host("localhost")
                .database("urban_reports_test"),
        );

        let config = Arc::new(AppConfig {
            database_url: "postgres://localhost/urban_reports_test".into(),
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            storage: StorageConfig {
                endpoint: "memory".into(),
                bucket: "fake".into(),
                access_key: "fake".into(),
                secret_key: "fake".into(),
                region: "us-east-1".into(),
            },
        });

        Self::from_parts(db, config, Arc::new(MemoryStorage::new()))
    }
}
