//! Engine configuration
//!
//! Defaults, overridden by a TOML document and/or `ARENA_*` environment
//! variables. Durations are whole seconds / milliseconds in both sources.

use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Hard ceiling on the worker pool regardless of configuration.
pub const MAX_WORKERS_CEILING: usize = 256;

/// Runtime configuration for collection, comparison and notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on concurrently running algorithm invocations.
    pub max_workers: usize,
    /// Per-invocation time bound.
    pub algorithm_timeout: Duration,
    /// How long the orchestrator waits for notification before returning.
    pub notification_grace: Duration,
    /// Decimal places used in the comparison table.
    pub display_precision: u32,
    /// Prefix of the per-user push topic (`user_` gives `user_42`).
    pub topic_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            algorithm_timeout: Duration::from_secs(300),
            notification_grace: Duration::from_secs(2),
            display_precision: 4,
            topic_prefix: "user_".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    max_workers: Option<usize>,
    algorithm_timeout_secs: Option<u64>,
    notification_grace_ms: Option<u64>,
    display_precision: Option<u32>,
    topic_prefix: Option<String>,
}

impl EngineConfig {
    /// Parse a TOML document layered over the defaults.
    ///
    /// ```rust
    /// use model_arena::EngineConfig;
    ///
    /// let cfg = EngineConfig::from_toml_str("max_workers = 2\nalgorithm_timeout_secs = 30").unwrap();
    /// assert_eq!(cfg.max_workers, 2);
    /// assert_eq!(cfg.algorithm_timeout.as_secs(), 30);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Toml` on syntax errors or unknown keys, `Config` if the
    /// resulting values are invalid.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(source)?;
        let cfg = Self::default().merge(raw);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `ARENA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a variable is set but not parseable, or the
    /// resulting values are invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        fn parse<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
            value
                .map(|v| {
                    v.trim()
                        .parse::<T>()
                        .map_err(|_| Error::Config(format!("{key} is not a valid value: {v}")))
                })
                .transpose()
        }

        let raw = RawConfig {
            max_workers: parse("ARENA_MAX_WORKERS", lookup("ARENA_MAX_WORKERS"))?,
            algorithm_timeout_secs: parse(
                "ARENA_ALGORITHM_TIMEOUT_SECS",
                lookup("ARENA_ALGORITHM_TIMEOUT_SECS"),
            )?,
            notification_grace_ms: parse(
                "ARENA_NOTIFICATION_GRACE_MS",
                lookup("ARENA_NOTIFICATION_GRACE_MS"),
            )?,
            display_precision: parse("ARENA_DISPLAY_PRECISION", lookup("ARENA_DISPLAY_PRECISION"))?,
            topic_prefix: lookup("ARENA_TOPIC_PREFIX"),
        };
        let cfg = Self::default().merge(raw);
        cfg.validate()?;
        Ok(cfg)
    }

    fn merge(mut self, raw: RawConfig) -> Self {
        if let Some(v) = raw.max_workers {
            self.max_workers = v;
        }
        if let Some(v) = raw.algorithm_timeout_secs {
            self.algorithm_timeout = Duration::from_secs(v);
        }
        if let Some(v) = raw.notification_grace_ms {
            self.notification_grace = Duration::from_millis(v);
        }
        if let Some(v) = raw.display_precision {
            self.display_precision = v;
        }
        if let Some(v) = raw.topic_prefix {
            self.topic_prefix = v;
        }
        self
    }

    /// Set the worker cap.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the per-invocation time bound.
    #[must_use]
    pub const fn with_algorithm_timeout(mut self, timeout: Duration) -> Self {
        self.algorithm_timeout = timeout;
        self
    }

    /// Set the notification grace period.
    #[must_use]
    pub const fn with_notification_grace(mut self, grace: Duration) -> Self {
        self.notification_grace = grace;
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Config` for zero workers, a zero timeout or more than 12
    /// decimal places.
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS_CEILING {
            return Err(Error::Config(format!(
                "max_workers must be within 1..={MAX_WORKERS_CEILING}, got {}",
                self.max_workers
            )));
        }
        if self.algorithm_timeout.is_zero() {
            return Err(Error::Config("algorithm timeout must be > 0".to_string()));
        }
        if self.display_precision > 12 {
            return Err(Error::Config(format!(
                "display_precision must be <= 12, got {}",
                self.display_precision
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.display_precision, 4);
        assert_eq!(cfg.topic_prefix, "user_");
    }

    #[test]
    fn test_toml_overrides() {
        let cfg = EngineConfig::from_toml_str(
            "max_workers = 3\nnotification_grace_ms = 250\ntopic_prefix = \"u-\"",
        )
        .unwrap();
        assert_eq!(cfg.max_workers, 3);
        assert_eq!(cfg.notification_grace, Duration::from_millis(250));
        assert_eq!(cfg.topic_prefix, "u-");
        assert_eq!(cfg.algorithm_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(matches!(
            EngineConfig::from_toml_str("workers = 3"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_workers = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_lookup() {
        let vars: HashMap<&str, &str> = [
            ("ARENA_MAX_WORKERS", "4"),
            ("ARENA_ALGORITHM_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();
        let cfg = EngineConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(cfg.max_workers, 4);
        assert_eq!(cfg.algorithm_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_env_lookup_bad_number() {
        let result = EngineConfig::from_lookup(|k| {
            (k == "ARENA_MAX_WORKERS").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
