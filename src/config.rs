//! Environment configuration.
//!
//! Values are read once at startup; any invalid value fails startup.
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::services::bearer::{BearerGuard, StaticTokenVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// One entry of `BEARER_TOKENS`: the token and the scopes it grants.
pub type TokenGrant = (String, Vec<String>);

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,

    // None means the guard's default realm.
    pub bearer_realm: Option<String>,
    pub bearer_tokens: Vec<TokenGrant>,
    pub bearer_required_scope: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = match get("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        let bearer_realm = non_blank(get("BEARER_REALM"));
        let bearer_required_scope = non_blank(get("BEARER_REQUIRED_SCOPE"));

        let bearer_tokens = parse_token_grants(&get("BEARER_TOKENS").unwrap_or_default())?;
        if bearer_tokens.is_empty() {
            tracing::warn!("BEARER_TOKENS is empty; every bearer token will be rejected");
        }

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            body_limit_bytes,
            bearer_realm,
            bearer_tokens,
            bearer_required_scope,
        })
    }

    /// Guard backed by the configured static token table.
    pub fn bearer_guard(&self) -> BearerGuard {
        let mut verifier = StaticTokenVerifier::new(self.bearer_tokens.clone());
        if let Some(scope) = &self.bearer_required_scope {
            verifier = verifier.require_scope(scope.clone());
        }

        let guard = BearerGuard::new(verifier);
        match &self.bearer_realm {
            Some(realm) => guard.with_realm(realm.clone()),
            None => guard,
        }
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse `token[:scope scope ...]` entries separated by commas.
pub fn parse_token_grants(raw: &str) -> Result<Vec<TokenGrant>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, scopes) = entry.split_once(':').unwrap_or((entry, ""));
            let token = token.trim();
            if token.is_empty() || token.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid("BEARER_TOKENS"));
            }
            let scopes = scopes.split_whitespace().map(str::to_string).collect();
            Ok((token.to_string(), scopes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.body_limit_bytes, 1024 * 1024);
        assert!(config.bearer_realm.is_none());
        assert!(config.bearer_tokens.is_empty());
        assert_eq!(config.bearer_guard().realm(), "Bearer");
    }

    #[test]
    fn realm_and_tokens_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("APP_ENV", "prod"),
            ("BEARER_REALM", " server.example.com "),
            ("BEARER_TOKENS", "valid_token, admin_token:read write"),
            ("BEARER_REQUIRED_SCOPE", "read"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert!(config.app_env.is_production());
        assert_eq!(config.bearer_realm.as_deref(), Some("server.example.com"));
        assert_eq!(config.bearer_required_scope.as_deref(), Some("read"));
        assert_eq!(
            config.bearer_tokens,
            vec![
                ("valid_token".to_string(), vec![]),
                (
                    "admin_token".to_string(),
                    vec!["read".to_string(), "write".to_string()]
                ),
            ]
        );
        assert_eq!(config.bearer_guard().realm(), "server.example.com");
    }

    #[test]
    fn blank_realm_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[("BEARER_REALM", "   ")])).unwrap();
        assert!(config.bearer_realm.is_none());
    }

    #[test]
    fn invalid_values_fail() {
        assert_eq!(
            Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECONDS", "0")])).unwrap_err(),
            ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS")
        );
        assert_eq!(
            parse_token_grants(":read").unwrap_err(),
            ConfigError::Invalid("BEARER_TOKENS")
        );
    }
}
