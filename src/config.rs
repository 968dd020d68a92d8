use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub hh_base_url: String,
    pub mail_webhook_url: String,
    pub admin_email: Option<String>,
    pub ingest_per_page: u32,
    pub ingest_pace_ms: u64,
    pub ingest_page_pace_ms: u64,
    pub ingest_fetch_attempts: u32,
    pub ingest_data_dir: Option<String>,
    pub ingest_cron: String,
    pub scheduler_enabled: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout_secs: get_env_parse_or("DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            hh_base_url: env::var("HH_BASE_URL")
                .unwrap_or_else(|_| "https://api.hh.ru".to_string()),
            mail_webhook_url: get_env("MAIL_WEBHOOK_URL")?,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            ingest_per_page: get_env_parse_or("INGEST_PER_PAGE", 20)?,
            ingest_pace_ms: get_env_parse_or("INGEST_PACE_MS", 2_000)?,
            ingest_page_pace_ms: get_env_parse_or("INGEST_PAGE_PACE_MS", 10_000)?,
            ingest_fetch_attempts: get_env_parse_or("INGEST_FETCH_ATTEMPTS", 5)?,
            ingest_data_dir: env::var("INGEST_DATA_DIR").ok(),
            ingest_cron: env::var("INGEST_CRON").unwrap_or_else(|_| "0 0 6 * * *".to_string()),
            scheduler_enabled: env::var("INGEST_SCHEDULER_ENABLED")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(false),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
