//! JWT Token Service
//! Mission: Issue and validate access/refresh token pairs securely

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use crate::auth::models::{AccessClaims, RefreshClaims, TokenPair};
use crate::models::Role;

/// Token service for issuing and validating JWT pairs.
///
/// Access and refresh tokens are signed with separate secrets, so one can
/// never stand in for the other.
pub struct TokenService {
    secret: String,
    refresh_secret: String,
    access_ttl_hours: i64,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(
        secret: &str,
        refresh_secret: &str,
        access_ttl_hours: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            secret: secret.to_string(),
            refresh_secret: refresh_secret.to_string(),
            access_ttl_hours,
            refresh_ttl_days,
        }
    }

    /// Issue an access token carrying the user's id and role
    pub fn issue_access_token(&self, user_id: &Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.access_ttl_hours))
            .context("Invalid timestamp")?
            .timestamp();

        let claims = AccessClaims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiration,
        };

        debug!(
            "Issuing access token for user {} ({}), expires in {}h",
            user_id,
            role.as_str(),
            self.access_ttl_hours
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate access token")
    }

    /// Issue a refresh token carrying only the user's id
    pub fn issue_refresh_token(&self, user_id: &Uuid) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::days(self.refresh_ttl_days))
            .context("Invalid timestamp")?
            .timestamp();

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .context("Failed to generate refresh token")
    }

    /// Issue a fresh access/refresh pair
    pub fn issue_pair(&self, user_id: &Uuid, role: Role) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user_id, role)?,
            refresh_token: self.issue_refresh_token(user_id)?,
        })
    }

    /// Validate an access token and extract its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        let decoded = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }

    /// Validate a refresh token and extract its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims> {
        let decoded = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired refresh token")?;

        Ok(decoded.claims)
    }
}
