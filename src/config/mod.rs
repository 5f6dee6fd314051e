use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr};

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub notifier: NotifierConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown storage backend '{other}' (expected postgres or memory)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// `json` switches the log output to JSON lines.
    pub log_format: String,
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Sessions live in Redis when a URL is set, in process memory otherwise
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
    pub breaker_failure_threshold: u32,
    pub breaker_cool_down_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    pub interval_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let storage: StorageBackend = parse_or("STORAGE", "postgres")?;
        let database_url = match storage {
            StorageBackend::Postgres => env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            StorageBackend::Memory => var_or("DATABASE_URL", ""),
        };

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_or("PORT", "8080")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "cinema_booking=debug,tower_http=debug"),
                log_format: var_or("LOG_FORMAT", "text"),
                request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", "30")?,
                storage,
            },
            database: DatabaseConfig {
                url: database_url,
                pool_size: parse_or("DB_POOL_SIZE", "20")?,
            },
            redis: RedisConfig { url: optional("REDIS_URL") },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
                expires_in_hours: parse_or("JWT_EXPIRES_IN_HOURS", "24")?,
                bcrypt_cost: parse_or("BCRYPT_COST", "10")?,
            },
            email: EmailConfig {
                api_url: optional("EMAIL_API_URL"),
                api_key: var_or("EMAIL_API_KEY", ""),
                timeout_secs: parse_or("EMAIL_TIMEOUT_SECS", "10")?,
                breaker_failure_threshold: parse_or("EMAIL_BREAKER_FAILURE_THRESHOLD", "5")?,
                breaker_cool_down_secs: parse_or("EMAIL_BREAKER_COOL_DOWN_SECS", "60")?,
            },
            notifier: NotifierConfig {
                queue_capacity: parse_or("NOTIFIER_QUEUE_CAPACITY", "1024")?,
            },
            cleanup: CleanupConfig {
                interval_secs: parse_or("CLEANUP_INTERVAL_SECS", "300")?,
            },
        })
    }
}

impl Default for Config {
    /// Local defaults: in-memory storage and sessions, no mail API.
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                environment: "development".to_string(),
                rust_log: "cinema_booking=debug,tower_http=debug".to_string(),
                log_format: "text".to_string(),
                request_timeout_secs: 30,
                storage: StorageBackend::Memory,
            },
            database: DatabaseConfig { url: String::new(), pool_size: 20 },
            redis: RedisConfig { url: None },
            jwt: JwtConfig {
                secret: "change-me".to_string(),
                expires_in_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            email: EmailConfig {
                api_url: None,
                api_key: String::new(),
                timeout_secs: 10,
                breaker_failure_threshold: 5,
                breaker_cool_down_secs: 60,
            },
            notifier: NotifierConfig { queue_capacity: 1024 },
            cleanup: CleanupConfig { interval_secs: 300 },
        }
    }
}
