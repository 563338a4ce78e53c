use std::time::Duration;

use chrono_tz::Tz;

/// Runtime settings, read from `WEEKCAP_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Calendar for day and week boundaries. `None` uses the local zone.
    pub calendar: Option<Tz>,
    pub fetch_timeout: Option<Duration>,
    pub metrics_port: Option<u16>,
    pub exclude_end: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: None,
            fetch_timeout: None,
            metrics_port: None,
            exclude_end: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownTimeZone(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownTimeZone(name) => write!(f, "WEEKCAP_TZ: unknown time zone {name:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Numeric and boolean values that fail to parse fall back to defaults;
    /// an unknown zone name is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let calendar = match lookup("WEEKCAP_TZ").filter(|s| !s.trim().is_empty()) {
            Some(name) => Some(
                name.trim()
                    .parse::<Tz>()
                    .map_err(|_| ConfigError::UnknownTimeZone(name.clone()))?,
            ),
            None => defaults.calendar,
        };
        let fetch_timeout = lookup("WEEKCAP_FETCH_TIMEOUT_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        let metrics_port = lookup("WEEKCAP_METRICS_PORT").and_then(|s| s.trim().parse().ok());
        let exclude_end = lookup("WEEKCAP_EXCLUDE_END")
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.exclude_end);

        Ok(Self {
            calendar,
            fetch_timeout,
            metrics_port,
            exclude_end,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
