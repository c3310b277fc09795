//! Authentication service.
//!
//! Handles credential checks, JWT token management, and password hashing.

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::{User, UserId};
use crate::store::UserStore;

const ACCESS_TOKEN: &str = "access";
const REFRESH_TOKEN: &str = "refresh";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    /// Username
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

/// Token pair response
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Authentication service
pub struct AuthService {
    config: Arc<Config>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: Arc<Config>) -> Self {
        let secret = config.jwt_secret.clone();
        Self {
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Authenticate user with username and password
    pub async fn authenticate(
        &self,
        users: &dyn UserStore,
        username: &str,
        password: &str,
    ) -> Result<(User, TokenPair)> {
        let user = users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !Self::verify_password(password, &user.password_hash)? {
            tracing::info!(username, "Rejected login");
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let tokens = self.generate_tokens(&user)?;
        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok((user, tokens))
    }

    /// Generate access and refresh tokens for a user
    pub fn generate_tokens(&self, user: &User) -> Result<TokenPair> {
        let now = Utc::now();
        let access_exp = Duration::try_minutes(self.config.jwt_access_token_expiry_minutes)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| AppError::Internal("Access token expiry out of range".to_string()))?;
        let refresh_exp = Duration::try_days(self.config.jwt_refresh_token_expiry_days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| AppError::Internal("Refresh token expiry out of range".to_string()))?;

        let access_token = self.encode_claims(&Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            token_type: ACCESS_TOKEN.to_string(),
        })?;

        let refresh_token = self.encode_claims(&Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            token_type: REFRESH_TOKEN.to_string(),
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: (self.config.jwt_access_token_expiry_minutes.max(0) * 60) as u64,
        })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let token_data = self.decode_token(token)?;

        if token_data.claims.token_type != ACCESS_TOKEN {
            return Err(AppError::Authentication("Invalid token type".to_string()));
        }

        Ok(token_data.claims)
    }

    /// Refresh tokens using a refresh token
    pub async fn refresh_tokens(
        &self,
        users: &dyn UserStore,
        refresh_token: &str,
    ) -> Result<(User, TokenPair)> {
        let token_data = self.decode_token(refresh_token)?;

        if token_data.claims.token_type != REFRESH_TOKEN {
            return Err(AppError::Authentication("Invalid token type".to_string()));
        }

        // The account may have been deleted since the token was issued
        let user = users
            .find_by_id(token_data.claims.sub)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::Authentication("User not found".to_string()),
                other => other,
            })?;

        let tokens = self.generate_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Decode and validate a token
    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }

    /// Hash a password with the configured cost
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.config.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}
