use anyhow::Context;
use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub allowed_origin: Option<String>,
}

impl Settings {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_LOG_FILTER: &'static str = "info,sqlx=warn";
}

/// Reads `.env` (if present) and then the process environment.
pub fn get_configuration() -> anyhow::Result<Settings> {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let host = env::var("APP_HOST").unwrap_or_else(|_| Settings::DEFAULT_HOST.to_string());
    let port = match env::var("APP_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("APP_PORT is not a valid port: {raw}"))?,
        Err(_) => Settings::DEFAULT_PORT,
    };

    let log_filter =
        env::var("RUST_LOG").unwrap_or_else(|_| Settings::DEFAULT_LOG_FILTER.to_string());
    let allowed_origin = env::var("ALLOWED_ORIGIN").ok().filter(|o| !o.trim().is_empty());

    Ok(Settings {
        database_url,
        jwt_secret,
        host,
        port,
        log_filter,
        allowed_origin,
    })
}
