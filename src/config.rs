use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// JWT signing parameters
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expires_days: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub public_base_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub stripe_secret_key: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment (call `dotenv` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 5000)?,
            mongodb_uri: required("MONGODB_URI")?,
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "travel-squad".to_string()),
                expires_days: parse_or("JWT_EXPIRES_DAYS", 30)?,
            },
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            public_base_url: optional("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            cors_origins: optional("CORS_ORIGINS")
                .map(|list| split_origins(&list))
                .unwrap_or_default(),
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            log::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

fn split_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            mongodb_uri: "mongodb://localhost:27017/travelsquad_test".to_string(),
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                issuer: "travel-squad".to_string(),
                expires_days: 30,
            },
            // bcrypt minimum, keeps hashing fast in tests
            bcrypt_cost: 4,
            upload_dir: env::temp_dir().join(format!("travel-squad-uploads-{}", uuid::Uuid::new_v4())),
            public_base_url: None,
            cors_origins: Vec::new(),
            stripe_secret_key: None,
        }
    }
}
