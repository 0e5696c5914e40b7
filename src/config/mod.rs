use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::db::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,

    /// Bearer token required on /api routes. Empty disables auth (dev mode).
    pub api_token: Option<String>,

    // Write path
    pub write_retry_max_attempts: u32,
    pub write_retry_base_delay_ms: u64,
    pub write_retry_max_delay_ms: u64,

    // Logging
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            run_migrations: parse_or("RUN_MIGRATIONS", true),

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            write_retry_max_attempts: parse_or("WRITE_RETRY_MAX_ATTEMPTS", 3),
            write_retry_base_delay_ms: parse_or("WRITE_RETRY_BASE_DELAY_MS", 100),
            write_retry_max_delay_ms: parse_or("WRITE_RETRY_MAX_DELAY_MS", 2_000),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Minimal configuration for tests and local tooling.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".into(),
            port: 0,
            db_max_connections: 5,
            run_migrations: true,
            api_token: None,
            write_retry_max_attempts: 3,
            write_retry_base_delay_ms: 10,
            write_retry_max_delay_ms: 100,
            log_json: false,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.write_retry_max_attempts.max(1),
            base_delay: Duration::from_millis(self.write_retry_base_delay_ms),
            max_delay: Duration::from_millis(self.write_retry_max_delay_ms),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
