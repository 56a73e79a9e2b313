//! Orchestration settings resolved from defaults and the environment.

use std::time::Duration;

use thiserror::Error;

use crate::retry::RetryPolicy;

const ENV_MAX_RETRIES: &str = "OTAKU_MANGA_MAX_RETRIES";
const ENV_BASE_DELAY_MS: &str = "OTAKU_MANGA_BASE_DELAY_MS";
const MAX_RETRIES_CEILING: u32 = 10;

/// Errors raised while reading orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting held a value that could not be parsed or is out of range.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Environment key or option name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason.
        reason: &'static str,
    },
}

/// Settings consumed by [`crate::DetailView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetailConfig {
    /// Retry policy for the manga-info slot.
    pub retry: RetryPolicy,
}

impl DetailConfig {
    /// Read settings from the process environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse_max_retries(&raw)?;
        }
        if let Some(raw) = lookup(ENV_BASE_DELAY_MS) {
            config.retry.base_delay = parse_base_delay(&raw)?;
        }
        Ok(config)
    }
}

/// Parse a retry budget.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for non-numeric values or budgets above ten.
pub fn parse_max_retries(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| *value <= MAX_RETRIES_CEILING)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_MAX_RETRIES,
            value: raw.to_string(),
            reason: "expected an integer between 0 and 10",
        })
}

/// Parse a backoff base delay given in milliseconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for non-numeric values.
pub fn parse_base_delay(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue {
            key: ENV_BASE_DELAY_MS,
            value: raw.to_string(),
            reason: "expected a number of milliseconds",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_manga_policy() {
        let config = DetailConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.base_delay, Duration::from_millis(1_000));
    }

    #[test]
    fn overrides_are_applied() {
        let config = DetailConfig::from_lookup(|key| match key {
            "OTAKU_MANGA_MAX_RETRIES" => Some("4".into()),
            "OTAKU_MANGA_BASE_DELAY_MS" => Some(" 250 ".into()),
            _ => None,
        })
        .expect("overrides");
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.delay_for_attempt(2), Duration::from_millis(500));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = DetailConfig::from_lookup(|key| {
            (key == "OTAKU_MANGA_MAX_RETRIES").then(|| "many".to_string())
        })
        .expect_err("non numeric");
        assert_eq!(
            err.to_string(),
            "invalid value 'many' for OTAKU_MANGA_MAX_RETRIES: expected an integer between 0 and 10"
        );
        assert!(parse_max_retries("11").is_err());
        assert!(parse_base_delay("-5").is_err());
    }
}
