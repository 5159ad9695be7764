//! Runtime configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. [`AppConfig::from_lookup`] takes the lookup as a function so parsing
//! can be exercised without touching the real environment.

use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "plantao-development-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be set when APP_ENV=production")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub app_url: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub asset_version: String,
    pub seed_sample_data: bool,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("local") | Some("testing") => {
                Environment::Development
            }
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        let jwt_secret = match (get("JWT_SECRET"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Production) => {
                return Err(ConfigError::Missing { key: "JWT_SECRET" });
            }
            (None, Environment::Development) => {
                warn!("JWT_SECRET not set, using the development default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let host = get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(get("APP_PORT"), "APP_PORT", 8080)?;
        let app_url = get("APP_URL").unwrap_or_else(|| format!("http://localhost:{}", port));

        Ok(Self {
            environment,
            host,
            port,
            app_url,
            jwt_secret,
            token_ttl_secs: parse_or(get("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", 3600)?,
            asset_version: get("ASSET_VERSION").unwrap_or_else(|| "1".to_string()),
            seed_sample_data: parse_bool(get("SEED_SAMPLE_DATA"), "SEED_SAMPLE_DATA", true)?,
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_bool(raw: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
        }),
    }
}
