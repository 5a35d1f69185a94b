// src/config.rs
use std::env;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use governor::Quota;
use crate::poller::RetryPolicy;

pub const PLACE_ID: &str = "PLACE_ID";
pub const MAX_PLAYERS: &str = "MAX_PLAYERS";
pub const ROBLOX_COOKIE: &str = "ROBLOX_COOKIE";
pub const JSONBIN_API_KEY: &str = "JSONBIN_API_KEY";
pub const JSONBIN_BIN_ID: &str = "JSONBIN_BIN_ID";

#[derive(Clone, Debug)]
pub struct Config {
    // Listener
    pub bind_address: String,
    pub port: u16,

    // Trigger endpoint rate limiting
    pub trigger_period_secs: u64,
    pub trigger_burst_limit: u32,

    // Pagination retry/backoff
    pub max_retries: u32,
    pub rate_limit_backoff_ms: u64,
    pub error_backoff_ms: u64,
    pub page_delay_ms: u64,

    // Outbound
    pub request_timeout_secs: u64,
    pub roblox_api_base: String,
    pub jsonbin_api_base: String,

    // Required for a fetch cycle; validated when a cycle is triggered.
    pub place_id: Option<String>,
    pub max_players: Option<String>,
    pub roblox_cookie: Option<String>,
    pub jsonbin_api_key: Option<String>,
    pub jsonbin_bin_id: Option<String>,
}

/// Validated inputs for one fetch cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct PollerSettings {
    pub place_id: String,
    pub max_players: u32,
    pub roblox_cookie: String,
    pub jsonbin_api_key: String,
    pub jsonbin_bin_id: String,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(Vec<&'static str>),
    Invalid { key: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(keys) => {
                write!(f, "Missing environment variables: {}", keys.join(", "))
            }
            Self::Invalid { key, value, reason } => {
                write!(f, "Invalid value for {}: {:?} ({})", key, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            trigger_period_secs: 10,
            trigger_burst_limit: 3,
            max_retries: 5,
            rate_limit_backoff_ms: 15_000,
            error_backoff_ms: 2_000,
            page_delay_ms: 500,
            request_timeout_secs: 30,
            roblox_api_base: "https://games.roblox.com".to_string(),
            jsonbin_api_base: "https://api.jsonbin.io".to_string(),
            place_id: None,
            max_players: None,
            roblox_cookie: None,
            jsonbin_api_key: None,
            jsonbin_bin_id: None,
        }
    }
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn present(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parsed_or("PORT", defaults.port),

            trigger_period_secs: parsed_or("TRIGGER_PERIOD_SECS", defaults.trigger_period_secs),
            trigger_burst_limit: parsed_or("TRIGGER_BURST_LIMIT", defaults.trigger_burst_limit),

            max_retries: parsed_or("MAX_RETRIES", defaults.max_retries),
            rate_limit_backoff_ms: parsed_or("RATE_LIMIT_BACKOFF_MS", defaults.rate_limit_backoff_ms),
            error_backoff_ms: parsed_or("ERROR_BACKOFF_MS", defaults.error_backoff_ms),
            page_delay_ms: parsed_or("PAGE_DELAY_MS", defaults.page_delay_ms),

            request_timeout_secs: parsed_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            roblox_api_base: env::var("ROBLOX_API_BASE").unwrap_or(defaults.roblox_api_base),
            jsonbin_api_base: env::var("JSONBIN_API_BASE").unwrap_or(defaults.jsonbin_api_base),

            place_id: present(PLACE_ID),
            max_players: present(MAX_PLAYERS),
            roblox_cookie: present(ROBLOX_COOKIE),
            jsonbin_api_key: present(JSONBIN_API_KEY),
            jsonbin_bin_id: present(JSONBIN_BIN_ID),
        }
    }

    /// Checks that every value a cycle needs is set, reporting all missing
    /// keys at once. No network call is made here.
    pub fn poller_settings(&self) -> Result<PollerSettings, ConfigError> {
        let required = [
            (PLACE_ID, &self.place_id),
            (MAX_PLAYERS, &self.max_players),
            (ROBLOX_COOKIE, &self.roblox_cookie),
            (JSONBIN_API_KEY, &self.jsonbin_api_key),
            (JSONBIN_BIN_ID, &self.jsonbin_bin_id),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let value = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();

        let raw_max = value(&self.max_players);
        let max_players = raw_max.parse::<u32>().map_err(|e| ConfigError::Invalid {
            key: MAX_PLAYERS,
            value: raw_max.clone(),
            reason: e.to_string(),
        })?;

        Ok(PollerSettings {
            place_id: value(&self.place_id),
            max_players,
            roblox_cookie: value(&self.roblox_cookie),
            jsonbin_api_key: value(&self.jsonbin_api_key),
            jsonbin_bin_id: value(&self.jsonbin_bin_id),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            rate_limit_delay: Duration::from_millis(self.rate_limit_backoff_ms),
            error_delay: Duration::from_millis(self.error_backoff_ms),
            page_delay: Duration::from_millis(self.page_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn trigger_quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.trigger_burst_limit).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.trigger_period_secs))
            .map(|quota| quota.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_minute(burst))
    }
}
