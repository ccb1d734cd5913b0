use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, TryFromFloatSecsError};

use crate::retry::{BackoffPolicy, RetryPolicy};

/// Invalid retry/backoff parameters, reported when a policy is built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("backoff base delay must be greater than zero")]
    ZeroBaseDelay,
    #[error("backoff base delay ({base:?}) cannot be greater than max delay ({max_delay:?})")]
    BaseExceedsMax { base: Duration, max_delay: Duration },
    #[error("invalid {field}")]
    InvalidDuration {
        field: &'static str,
        #[source]
        source: TryFromFloatSecsError,
    },
}

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts allowed after the first one.
    pub max_retries: u64,
    /// First Fibonacci backoff step in seconds (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Cap on every backoff step, in seconds.
    pub max_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 5.0,
        }
    }
}

impl RetryConfig {
    /// Validates the section into a usable policy.
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let base = secs("base_delay_secs", self.base_delay_secs)?;
        let max_delay = secs("max_delay_secs", self.max_delay_secs)?;
        Ok(RetryPolicy {
            max_retries: self.max_retries,
            backoff: BackoffPolicy::new(base, max_delay)?,
        })
    }
}

fn secs(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|source| ConfigError::InvalidDuration { field, source })
}

/// Global configuration loaded from `~/.config/errkit/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrkitConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    /// `tracing` filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub log_filter: Option<String>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("errkit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ErrkitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ErrkitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<ErrkitConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: ErrkitConfig = toml::from_str(&data)?;
    cfg.retry.to_policy()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = ErrkitConfig::default();
        assert_eq!(cfg.retry.max_retries, 3);
        assert!(cfg.log_filter.is_none());
        let policy = cfg.retry.to_policy().unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ErrkitConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ErrkitConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.retry.max_retries, cfg.retry.max_retries);
        assert!((parsed.retry.base_delay_secs - cfg.retry.base_delay_secs).abs() < 1e-9);
        assert!((parsed.retry.max_delay_secs - cfg.retry.max_delay_secs).abs() < 1e-9);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            log_filter = "warn"

            [retry]
            max_retries = 7
            base_delay_secs = 0.25
            max_delay_secs = 2
        "#;
        let cfg: ErrkitConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.log_filter.as_deref(), Some("warn"));
        let policy = cfg.retry.to_policy().unwrap();
        assert_eq!(policy.max_retries, 7);
        assert_eq!(policy.backoff.base(), Duration::from_millis(250));
        assert_eq!(policy.backoff.max_delay(), Duration::from_secs(2));
    }

    #[test]
    fn config_toml_partial_retry_section() {
        let toml = r#"
            [retry]
            max_retries = 1
        "#;
        let cfg: ErrkitConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry.max_retries, 1);
        assert!((cfg.retry.base_delay_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_delays_are_rejected() {
        let mut retry = RetryConfig::default();
        retry.base_delay_secs = -1.0;
        assert!(matches!(
            retry.to_policy(),
            Err(ConfigError::InvalidDuration { field: "base_delay_secs", .. })
        ));

        let mut retry = RetryConfig::default();
        retry.base_delay_secs = 10.0;
        assert!(matches!(
            retry.to_policy(),
            Err(ConfigError::BaseExceedsMax { .. })
        ));
    }

    #[test]
    fn load_from_path_validates() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[retry]\nbase_delay_secs = 0").unwrap();
        assert!(load_from_path(f.path()).is_err());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[retry]\nmax_retries = 4").unwrap();
        assert_eq!(load_from_path(f.path()).unwrap().retry.max_retries, 4);
    }
}
