//! # Runtime Configuration Module
//!
//! Environment-variable configuration for lookup behavior.
//!
//! ## Environment Variables
//!
//! ### `RADIXMUX_SLOW_MATCH_US`
//!
//! Lookups slower than this many microseconds are logged at `warn` level.
//! Default: `1000` (1 ms)
//!
//! ### `RADIXMUX_LOOKUP_CASE_FOLD`
//!
//! Enables the second, lowercased lookup pass that lets case-insensitive
//! routes match requests containing uppercase letters. Accepts
//! `true`/`false`/`1`/`0`. Default: `true`
//!
//! With the fold pass disabled, case-insensitive routes only match requests
//! whose literal segments are already lowercase.
//!
//! ## Usage
//!
//! ```rust
//! use radixmux::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("slow match threshold: {:?}", config.slow_match_threshold);
//! ```

use std::env;
use std::time::Duration;
use tracing::warn;

pub const SLOW_MATCH_ENV: &str = "RADIXMUX_SLOW_MATCH_US";
pub const CASE_FOLD_ENV: &str = "RADIXMUX_LOOKUP_CASE_FOLD";

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Lookups slower than this are logged as slow (default: 1 ms)
    pub slow_match_threshold: Duration,
    /// Run the lowercased second lookup pass (default: true)
    pub case_fold: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
            case_fold: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let slow_match_threshold = match lookup(SLOW_MATCH_ENV) {
            Some(val) => match val.trim().parse::<u64>() {
                Ok(us) => Duration::from_micros(us),
                Err(_) => {
                    warn!(key = SLOW_MATCH_ENV, value = %val, "Invalid value, using default");
                    defaults.slow_match_threshold
                }
            },
            None => defaults.slow_match_threshold,
        };

        let case_fold = match lookup(CASE_FOLD_ENV) {
            Some(val) => match parse_bool(&val) {
                Some(b) => b,
                None => {
                    warn!(key = CASE_FOLD_ENV, value = %val, "Invalid value, using default");
                    defaults.case_fold
                }
            },
            None => defaults.case_fold,
        };

        Self {
            slow_match_threshold,
            case_fold,
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), RuntimeConfig::default());
    }

    #[test]
    fn test_values_are_parsed() {
        let cfg = config_from(&[(SLOW_MATCH_ENV, "250"), (CASE_FOLD_ENV, "off")]);
        assert_eq!(cfg.slow_match_threshold, Duration::from_micros(250));
        assert!(!cfg.case_fold);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = config_from(&[(SLOW_MATCH_ENV, "fast"), (CASE_FOLD_ENV, "maybe")]);
        assert_eq!(cfg, RuntimeConfig::default());
    }
}
