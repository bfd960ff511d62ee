//! Environment-sourced configuration.
//!
//! `main` loads `.env` with `dotenv` before calling [`Config::from_env`].
//! `JWT_SECRET` is always required; `DATABASE_URL` is required unless
//! `STORAGE_BACKEND=memory`. Everything else has a default.

use std::env;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Per-operation deadlines.
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    pub standard: Duration,
    /// Deletes and sampling queries.
    pub short: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Deadlines {
            standard: Duration::from_secs(10),
            short: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: NonZeroU32,
    pub burst: NonZeroU32,
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit {
            per_second: NonZeroU32::MIN,
            burst: NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_name: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub cache_max_entries: u64,
    pub deadlines: Deadlines,
    pub rate_limit: RateLimit,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("database_name", &self.database_name)
            .field("jwt_secret", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("deadlines", &self.deadlines)
            .field("rate_limit", &self.rate_limit)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Mongo)?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if backend == StorageBackend::Mongo && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".into()));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".into()))?;

        let deadlines = Deadlines {
            standard: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10u64)?),
            short: Duration::from_secs(parse_or(&lookup, "SHORT_TIMEOUT_SECS", 2u64)?),
        };

        let defaults = RateLimit::default();
        let rate_limit = RateLimit {
            per_second: parse_or(&lookup, "RATE_LIMIT_PER_SECOND", defaults.per_second)?,
            burst: parse_or(&lookup, "RATE_LIMIT_BURST", defaults.burst)?,
        };

        Ok(Config {
            backend,
            database_url,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "ecommerce".to_string()),
            jwt_secret,
            host: parse_or(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or(&lookup, "PORT", 8080u16)?,
            cache_max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", 10_000u64)?,
            deadlines,
            rate_limit,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mongodb://localhost:27017"),
            ("JWT_SECRET", "s3cr3t"),
        ]))
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Mongo);
        assert_eq!(config.database_name, "ecommerce");
        assert_eq!(config.port, 8080);
        assert_eq!(config.deadlines.standard, Duration::from_secs(10));
        assert_eq!(config.deadlines.short, Duration::from_secs(2));
        assert_eq!(config.rate_limit.burst.get(), 5);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn mongo_backend_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "x"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup_from(&[("STORAGE_BACKEND", "memory")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "JWT_SECRET"));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "x"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref v, _) if v == "PORT"));

        let err = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "x"),
            ("RATE_LIMIT_BURST", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref v, _) if v == "RATE_LIMIT_BURST"));
    }
}
