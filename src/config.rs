//! Environment-based configuration, 12-factor style: every setting has a
//! default except the MongoDB connection string.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind, `HOST` (default `0.0.0.0`).
    pub host: String,
    /// Port to listen on, `PORT` (default `4000`).
    pub port: u16,
    /// MongoDB connection string, `MONGODB_URI` (required).
    pub mongodb_uri: String,
    /// Database name, `MONGODB_DATABASE` (default `cinema`).
    pub database: String,
    /// Directory for uploaded posters, `MEDIA_ROOT` (default `media`).
    pub media_root: PathBuf,
    /// CORS origin, `APP_URL`. Unset means no CORS layer.
    pub allowed_origin: Option<String>,
    /// Comma-separated admin bearer tokens, `ADMIN_TOKENS`.
    pub admin_tokens: Vec<String>,
    /// Comma-separated regular-user bearer tokens, `USER_TOKENS`.
    pub user_tokens: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongodb_uri = env::var("MONGODB_URI").map_err(|_| ConfigError::Missing {
            name: "MONGODB_URI",
        })?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => 4000,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            mongodb_uri,
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "cinema".to_string()),
            media_root: PathBuf::from(
                env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
            ),
            allowed_origin: env::var("APP_URL").ok(),
            admin_tokens: split_tokens(&env::var("ADMIN_TOKENS").unwrap_or_default()),
            user_tokens: split_tokens(&env::var("USER_TOKENS").unwrap_or_default()),
        })
    }
}

fn split_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
