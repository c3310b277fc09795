//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Password given to every account created through the user API.
pub const DEFAULT_USER_PASSWORD: &str = "changeme";

/// Longest accepted access token lifetime (one year).
pub const MAX_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60 * 24 * 365;

/// Longest accepted refresh token lifetime (ten years).
pub const MAX_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 3650;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token expiry in minutes
    pub jwt_access_token_expiry_minutes: i64,

    /// JWT refresh token expiry in days
    pub jwt_refresh_token_expiry_days: i64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Plain-text password hashed into every newly created account
    pub default_user_password: String,

    /// Username of the bootstrap administrator
    pub admin_username: String,

    /// Email of the bootstrap administrator
    pub admin_email: String,

    /// Bootstrap administrator password; no admin is provisioned when unset
    pub admin_password: Option<String>,

    /// "development" enables the CORS origin whitelist
    pub environment: String,

    /// Comma separated CORS origins (development only)
    pub cors_origins: String,
}

redacted_debug!(Config {
    redact database_url,
    show bind_address,
    show log_level,
    redact jwt_secret,
    show jwt_access_token_expiry_minutes,
    show jwt_refresh_token_expiry_days,
    show bcrypt_cost,
    redact default_user_password,
    show admin_username,
    show admin_email,
    redact_option admin_password,
    show environment,
    show cors_origins,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bcrypt_cost = lookup("BCRYPT_COST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Config(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let jwt_access_token_expiry_minutes = lookup("JWT_ACCESS_TOKEN_EXPIRY_MINUTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        if !(1..=MAX_ACCESS_TOKEN_EXPIRY_MINUTES).contains(&jwt_access_token_expiry_minutes) {
            return Err(AppError::Config(format!(
                "JWT_ACCESS_TOKEN_EXPIRY_MINUTES must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_EXPIRY_MINUTES, jwt_access_token_expiry_minutes
            )));
        }

        let jwt_refresh_token_expiry_days = lookup("JWT_REFRESH_TOKEN_EXPIRY_DAYS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);
        if !(1..=MAX_REFRESH_TOKEN_EXPIRY_DAYS).contains(&jwt_refresh_token_expiry_days) {
            return Err(AppError::Config(format!(
                "JWT_REFRESH_TOKEN_EXPIRY_DAYS must be between 1 and {}, got {}",
                MAX_REFRESH_TOKEN_EXPIRY_DAYS, jwt_refresh_token_expiry_days
            )));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| AppError::Config("JWT_SECRET not set".into()))?,
            jwt_access_token_expiry_minutes,
            jwt_refresh_token_expiry_days,
            bcrypt_cost,
            default_user_password: lookup("DEFAULT_USER_PASSWORD")
                .unwrap_or_else(|| DEFAULT_USER_PASSWORD.into()),
            admin_username: lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| "admin@localhost".into()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "production".into()),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".into()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/accounts"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.jwt_access_token_expiry_minutes, 30);
        assert_eq!(config.jwt_refresh_token_expiry_days, 7);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.default_user_password, DEFAULT_USER_PASSWORD);
        assert_eq!(config.admin_username, "admin");
        assert!(config.admin_password.is_none());
        assert!(!config.is_development());
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn test_missing_jwt_secret() {
        let err =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("JWT_SECRET")));
    }

    #[test]
    fn test_bcrypt_cost_out_of_range() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("BCRYPT_COST", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_token_expiry_out_of_range() {
        let max = i64::MAX.to_string();
        for (key, value) in [
            ("JWT_ACCESS_TOKEN_EXPIRY_MINUTES", max.as_str()),
            ("JWT_ACCESS_TOKEN_EXPIRY_MINUTES", "0"),
            ("JWT_REFRESH_TOKEN_EXPIRY_DAYS", max.as_str()),
            ("JWT_REFRESH_TOKEN_EXPIRY_DAYS", "-1"),
        ] {
            let err = Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://x"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]))
            .unwrap_err();
            assert!(matches!(err, AppError::Config(msg) if msg.contains(key)));
        }

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("JWT_ACCESS_TOKEN_EXPIRY_MINUTES", "525600"),
            ("JWT_REFRESH_TOKEN_EXPIRY_DAYS", "3650"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_access_token_expiry_minutes, MAX_ACCESS_TOKEN_EXPIRY_MINUTES);
        assert_eq!(config.jwt_refresh_token_expiry_days, MAX_REFRESH_TOKEN_EXPIRY_DAYS);
    }

    #[test]
    fn test_empty_admin_password_is_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("ADMIN_PASSWORD", ""),
        ]))
        .unwrap();
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://user:hunter2@db/accounts"),
            ("JWT_SECRET", "jwt-signing-secret"),
            ("ADMIN_PASSWORD", "admin-pass"),
        ]))
        .unwrap();
        let output = format!("{:?}", config);
        assert!(!output.contains("hunter2"));
        assert!(!output.contains("jwt-signing-secret"));
        assert!(!output.contains("admin-pass"));
        assert!(!output.contains(DEFAULT_USER_PASSWORD));
        assert!(output.contains("bind_address"));
    }
}
