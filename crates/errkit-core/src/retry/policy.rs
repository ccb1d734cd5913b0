use std::time::Duration;

use crate::config::ConfigError;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RETRIES: u64 = 3;

/// Fibonacci backoff: `base, base, 2*base, 3*base, 5*base, ...`, each step
/// capped at `max_delay`.
///
/// Parameters are validated once, when the policy is built; a policy value is
/// always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base: Duration, max_delay: Duration) -> Result<Self, ConfigError> {
        if base.is_zero() {
            return Err(ConfigError::ZeroBaseDelay);
        }
        if base > max_delay {
            return Err(ConfigError::BaseExceedsMax { base, max_delay });
        }
        Ok(Self { base, max_delay })
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delays to wait between attempts, at most `max_retries` of them.
    pub fn schedule(&self, max_retries: u64) -> Backoff {
        Backoff {
            previous: Duration::ZERO,
            current: self.base,
            max_delay: self.max_delay,
            remaining: max_retries,
        }
    }
}

/// Iterator over the delays of one retry loop.
#[derive(Debug, Clone)]
pub struct Backoff {
    previous: Duration,
    current: Duration,
    max_delay: Duration,
    remaining: u64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let delay = self.current.min(self.max_delay);
        let next = self.previous.saturating_add(self.current);
        self.previous = self.current;
        self.current = next;
        Some(delay)
    }
}

/// Attempt budget plus backoff shape for one retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u64,
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u64) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Total attempts, the first one included.
    pub fn max_attempts(&self) -> u64 {
        self.max_retries.saturating_add(1)
    }
}
