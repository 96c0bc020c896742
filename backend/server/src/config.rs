use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Memory,
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackendMode::Remote),
            "memory" => Ok(BackendMode::Memory),
            other => Err(format!("expected remote or memory, got {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_mode: BackendMode,
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub session_ttl: Duration,
    pub session_sweep: Duration,
    pub cookie_secure: bool,
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let backend_mode = try_load("BACKEND_MODE", "remote")?;

        let config = Self {
            port: try_load("RUST_PORT", "8080")?,
            backend_mode,
            backend_url: var("BACKEND_URL"),
            backend_key: read_secret("BACKEND_ANON_KEY"),
            session_ttl: Duration::from_secs(try_load("SESSION_TTL_SECS", "604800")?),
            session_sweep: Duration::from_secs(try_load("SESSION_SWEEP_SECS", "300")?),
            cookie_secure: try_load("COOKIE_SECURE", "false")?,
            admin: (backend_mode == BackendMode::Memory)
                .then(|| var("ADMIN_EMAIL").zip(read_secret("ADMIN_PASSWORD")))
                .flatten(),
        };

        if config.backend_mode == BackendMode::Remote {
            if config.backend_url.is_none() {
                return Err(ConfigError::Missing("BACKEND_URL"));
            }
            if config.backend_key.is_none() {
                return Err(ConfigError::Missing("BACKEND_ANON_KEY"));
            }
        }

        Ok(config)
    }

    /// In-memory backend, nothing read from the environment.
    pub fn local(port: u16) -> Self {
        Self {
            port,
            backend_mode: BackendMode::Memory,
            backend_url: None,
            backend_key: None,
            session_ttl: Duration::from_secs(60 * 60),
            session_sweep: Duration::from_secs(60),
            cookie_secure: false,
            admin: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

/// Docker secret first, then the environment.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) => Some(secret.trim().to_string()),
        Err(e) => {
            warn!("Failed to read {secret_name} from file: {e}, trying environment");
            var(secret_name)
        }
    }
}
