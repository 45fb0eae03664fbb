//! Executor configuration with validation.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ExecutorError, Result};

/// Default maximum number of rows a query may return.
pub const DEFAULT_QUERY_LIMIT: usize = 1000;

/// Acquisition latency above which a warning is logged.
pub const SLOW_ACQUIRE_THRESHOLD: Duration = Duration::from_millis(100);

/// Executor settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawExecutorConfig")]
pub struct ExecutorConfig {
    /// Row ceiling used when a call does not pass its own limit.
    pub default_limit: usize,
    /// Connection acquisition slower than this is logged at warning level.
    pub slow_acquire_threshold: Duration,
}

impl ExecutorConfig {
    /// Create and validate executor config.
    pub fn new(default_limit: usize, slow_acquire_threshold: Duration) -> Result<Self> {
        if default_limit == 0 {
            return Err(ExecutorError::InvalidArgument(
                "default limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            default_limit,
            slow_acquire_threshold,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLSHIM_DEFAULT_LIMIT` - default row ceiling (default: 1000)
    /// - `SQLSHIM_SLOW_ACQUIRE_MS` - slow acquisition threshold in ms (default: 100)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup. Unparseable or invalid
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_limit = lookup("SQLSHIM_DEFAULT_LIMIT")
            .and_then(|v| v.trim().parse().ok())
            .filter(|limit: &usize| *limit > 0)
            .unwrap_or(DEFAULT_QUERY_LIMIT);
        let slow_acquire_threshold = lookup("SQLSHIM_SLOW_ACQUIRE_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(SLOW_ACQUIRE_THRESHOLD);

        Self {
            default_limit,
            slow_acquire_threshold,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_QUERY_LIMIT,
            slow_acquire_threshold: SLOW_ACQUIRE_THRESHOLD,
        }
    }
}

#[derive(Deserialize)]
struct RawExecutorConfig {
    #[serde(default = "default_limit")]
    default_limit: usize,
    #[serde(default = "default_slow_acquire_ms")]
    slow_acquire_threshold_ms: u64,
}

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn default_slow_acquire_ms() -> u64 {
    SLOW_ACQUIRE_THRESHOLD.as_millis() as u64
}

impl TryFrom<RawExecutorConfig> for ExecutorConfig {
    type Error = ExecutorError;

    fn try_from(raw: RawExecutorConfig) -> Result<Self> {
        Self::new(
            raw.default_limit,
            Duration::from_millis(raw.slow_acquire_threshold_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ExecutorConfig::default();
        assert_eq!(config.default_limit, 1000);
        assert_eq!(config.slow_acquire_threshold, Duration::from_millis(100));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let result = ExecutorConfig::new(0, SLOW_ACQUIRE_THRESHOLD);
        assert!(matches!(result, Err(ExecutorError::InvalidArgument(_))));
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = ExecutorConfig::from_lookup(|key| match key {
            "SQLSHIM_DEFAULT_LIMIT" => Some("250".to_string()),
            "SQLSHIM_SLOW_ACQUIRE_MS" => Some(" 40 ".to_string()),
            _ => None,
        });
        assert_eq!(config.default_limit, 250);
        assert_eq!(config.slow_acquire_threshold, Duration::from_millis(40));
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage() {
        let config = ExecutorConfig::from_lookup(|key| match key {
            "SQLSHIM_DEFAULT_LIMIT" => Some("0".to_string()),
            "SQLSHIM_SLOW_ACQUIRE_MS" => Some("fast".to_string()),
            _ => None,
        });
        assert_eq!(config, ExecutorConfig::default());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ExecutorConfig = serde_json::from_str(r#"{"default_limit": 5}"#).unwrap();
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.slow_acquire_threshold, SLOW_ACQUIRE_THRESHOLD);
    }

    #[test]
    fn test_deserialize_rejects_zero_limit() {
        let result: std::result::Result<ExecutorConfig, _> =
            serde_json::from_str(r#"{"default_limit": 0, "slow_acquire_threshold_ms": 10}"#);
        assert!(result.is_err());
    }
}
