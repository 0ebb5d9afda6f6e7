use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::store::PLACEHOLDER_UPLOAD_URL;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub simulated_latency: Duration,
    pub strict_validation: bool,
    pub body_limit_bytes: usize,
    pub upload_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            static_dir: None,
            simulated_latency: Duration::ZERO,
            strict_validation: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            upload_url: PLACEHOLDER_UPLOAD_URL.to_string(),
        }
    }
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("PROFILE_BIND_ADDR") {
            settings.bind_addr = parse("PROFILE_BIND_ADDR", raw)?;
        }
        if let Some(raw) = lookup("PROFILE_STATIC_DIR") {
            if !raw.trim().is_empty() {
                settings.static_dir = Some(PathBuf::from(raw.trim()));
            }
        }
        if let Some(raw) = lookup("PROFILE_SIMULATED_LATENCY_MS") {
            let ms: u64 = parse("PROFILE_SIMULATED_LATENCY_MS", raw)?;
            settings.simulated_latency = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("PROFILE_STRICT_VALIDATION") {
            settings.strict_validation = parse_bool("PROFILE_STRICT_VALIDATION", raw)?;
        }
        if let Some(raw) = lookup("PROFILE_BODY_LIMIT_BYTES") {
            settings.body_limit_bytes = parse("PROFILE_BODY_LIMIT_BYTES", raw)?;
        }
        if let Some(raw) = lookup("PROFILE_UPLOAD_URL") {
            if !raw.trim().is_empty() {
                settings.upload_url = raw.trim().to_string();
            }
        }

        Ok(settings)
    }
}
