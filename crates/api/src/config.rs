use axum::http::HeaderValue;
use marbles_db::config::{env_opt, env_parse, ConfigError};

use crate::auth::jwt::JwtConfig;

/// Default allowed origin for local frontend development.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Server configuration loaded from environment variables.
///
/// Everything except the JWT secret has a default suitable for local
/// development. Database settings are loaded separately through
/// [`marbles_db::DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `PORT`                 | `3000`                                   |
    /// | `CORS_ORIGINS`         | `FRONTEND_URL`, else `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                     |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_opt("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = env_parse("PORT", 3000u16)?;
        let request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", 30u64)?;

        let (origin_var, raw_origins) = match env_opt("CORS_ORIGINS") {
            Some(value) => ("CORS_ORIGINS", value),
            None => (
                "FRONTEND_URL",
                env_opt("FRONTEND_URL").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into()),
            ),
        };
        let cors_origins = parse_origins(origin_var, &raw_origins)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Split a comma separated origin list, rejecting values that are not valid headers.
fn parse_origins(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|_| ConfigError::Invalid {
                    name,
                    value: origin.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins =
            parse_origins("CORS_ORIGINS", " http://a.test , http://b.test,,").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let result = parse_origins("CORS_ORIGINS", "http://ok.test,bad\norigin");
        assert_matches!(result, Err(ConfigError::Invalid { name: "CORS_ORIGINS", .. }));
    }
}
