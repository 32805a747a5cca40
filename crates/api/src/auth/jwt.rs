//! HS256 bearer tokens carrying the user's id and username.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use marbles_core::types::DbId;
use marbles_db::config::{env_opt, env_parse, ConfigError};
use serde::{Deserialize, Serialize};

/// Default token lifetime in hours (one week).
const DEFAULT_EXPIRY_HOURS: i64 = 168;

/// Longest accepted token lifetime in hours (ten years).
const MAX_EXPIRY_HOURS: i64 = 24 * 365 * 10;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// The user's internal database id.
    pub id: DbId,
    pub username: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

/// Configuration for JWT signing and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours.
    pub expiry_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `168`   |
    ///
    /// `JWT_KEY` is read when `JWT_SECRET` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env_opt("JWT_SECRET")
            .or_else(|| env_opt("JWT_KEY"))
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let expiry_hours =
            check_expiry_hours(env_parse("JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS)?)?;

        Ok(Self {
            secret,
            expiry_hours,
        })
    }
}

/// Token lifetimes must lie in `1..=MAX_EXPIRY_HOURS`.
fn check_expiry_hours(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_EXPIRY_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            name: "JWT_EXPIRY_HOURS",
            value: hours.to_string(),
        })
    }
}

/// Sign a token for the given user.
pub fn issue_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        iat: now,
        exp: now.saturating_add(config.expiry_hours.saturating_mul(3600)),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a token's signature and expiry, returning its [`Claims`].
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}
