use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// S3-compatible object store holding report photos and profile images.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: env_or("JWT_ISSUER", "urban-reports"),
            audience: env_or("JWT_AUDIENCE", "urban-reports-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let storage = StorageConfig {
            endpoint: env_or("MINIO_ENDPOINT", "http://localhost:9000"),
            bucket: env_or("MINIO_BUCKET", "urban-reports"),
            access_key: env_or("MINIO_ACCESS_KEY", "minioadmin"),
            secret_key: env_or("MINIO_SECRET_KEY", "minioadmin"),
            region: env_or("MINIO_REGION", "us-east-1"),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            host: env_or("APP_HOST", "0.0.0.0"),
            port: env_parse("APP_PORT", 8080),
            jwt,
            storage,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("URBAN_REPORTS_TEST_PORT", "not-a-number");
        assert_eq!(env_parse::<u16>("URBAN_REPORTS_TEST_PORT", 8080), 8080);
        std::env::set_var("URBAN_REPORTS_TEST_PORT", "9090");
        assert_eq!(env_parse::<u16>("URBAN_REPORTS_TEST_PORT", 8080), 9090);
    }

    #[test]
    fn env_or_uses_default_when_unset() {
        assert_eq!(env_or("URBAN_REPORTS_TEST_UNSET_KEY", "fallback"), "fallback");
    }
}
