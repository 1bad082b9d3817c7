// Application configuration, read from the environment once at startup

use std::env;

const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 1800; // 30 minutes
const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 604800; // 7 days

/// Configuration errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{0} is not a valid value: {1}")]
    Invalid(&'static str, String),
}

/// Token signing configuration, immutable after startup.
///
/// The same secret signs both access and refresh tokens; the embedded kind
/// tag is what keeps them from being interchangeable. The access TTL must be
/// configured strictly shorter than the refresh TTL.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// When set, users are persisted in Postgres; otherwise an in-memory
    /// store is used. Decided once at startup, never per request.
    pub database_url: Option<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let access_token_ttl =
            parse_secs("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl =
            parse_secs("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            host,
            port,
            database_url: env::var("DATABASE_URL").ok(),
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl,
                refresh_token_ttl,
            },
        })
    }
}

fn parse_secs(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.parse::<i64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_access_shorter_than_refresh() {
        assert!(DEFAULT_ACCESS_TOKEN_TTL_SECS < DEFAULT_REFRESH_TOKEN_TTL_SECS);
    }
}
