//! Environment configuration.
//!
//! All values come from `STUDY_*` environment variables (a `.env` file is
//! honoured by the binary through `dotenvy`). Loading fails fast: every
//! missing or placeholder required value is reported in a single error so the
//! operator can fix them in one pass.

use std::net::SocketAddr;

use thiserror::Error;

pub const DATABASE_URL: &str = "STUDY_DATABASE_URL";
pub const PUBLIC_URL: &str = "STUDY_PUBLIC_URL";
pub const BIND_ADDR: &str = "STUDY_BIND_ADDR";
pub const DB_MAX_CONNECTIONS: &str = "STUDY_DB_MAX_CONNECTIONS";
pub const SESSION_COOKIE: &str = "STUDY_SESSION_COOKIE";
pub const SESSION_TTL_DAYS: &str = "STUDY_SESSION_TTL_DAYS";
pub const COOKIE_SECURE: &str = "STUDY_COOKIE_SECURE";

const REQUIRED: [&str; 2] = [DATABASE_URL, PUBLIC_URL];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}. Set them in the environment or a .env file.", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Cookie and lifetime settings for anonymous identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_days: i64,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "study_circle_id".to_string(),
            ttl_days: 30,
            secure: true,
        }
    }
}

/// Everything the server needs at startup.
///
/// # Examples
///
/// ```
/// use study_circle::config::AppConfig;
///
/// let config = AppConfig::from_lookup(|key| match key {
///     "STUDY_DATABASE_URL" => Some("postgres://localhost/studies".to_string()),
///     "STUDY_PUBLIC_URL" => Some("https://studies.example.org/".to_string()),
///     _ => None,
/// })
/// .unwrap();
/// assert_eq!(config.public_url, "https://studies.example.org");
/// assert_eq!(config.session.ttl_days, 30);
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Base URL used to build shareable invite links.
    pub public_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// * `ConfigError::Missing` - Lists every required key that is unset, blank
    ///   or a placeholder, in declaration order.
    /// * `ConfigError::Invalid` - The first optional value that fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&'static str> = REQUIRED
            .into_iter()
            .filter(|key| lookup(key).as_deref().map_or(true, is_placeholder))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &str| lookup(key).unwrap_or_default().trim().to_string();
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: optional(SESSION_COOKIE).unwrap_or(defaults.cookie_name),
            ttl_days: parse_or(optional(SESSION_TTL_DAYS), SESSION_TTL_DAYS, defaults.ttl_days)?,
            secure: parse_bool(optional(COOKIE_SECURE), defaults.secure)?,
        };
        if session.ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                key: SESSION_TTL_DAYS,
                reason: "must be a positive number of days".to_string(),
            });
        }

        Ok(Self {
            database_url: required(DATABASE_URL),
            public_url: required(PUBLIC_URL).trim_end_matches('/').to_string(),
            bind_addr: parse_or(
                optional(BIND_ADDR),
                BIND_ADDR,
                SocketAddr::from(([127, 0, 0, 1], 3000)),
            )?,
            db_max_connections: parse_or(optional(DB_MAX_CONNECTIONS), DB_MAX_CONNECTIONS, 10)?,
            session,
        })
    }
}

/// Values that were left at an obvious template placeholder count as unset.
fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    value.is_empty()
        || lower == "changeme"
        || lower.starts_with("your-")
        || lower.starts_with("your_")
        || (value.starts_with('<') && value.ends_with('>'))
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key: COOKIE_SECURE,
            reason: format!("expected a boolean, got '{v}'"),
        }),
    }
}
