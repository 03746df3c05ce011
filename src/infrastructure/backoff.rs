use crate::types::constants::{
    DEFAULT_RECONNECT_BASE_DELAY, DEFAULT_RECONNECT_GROWTH_FACTOR, DEFAULT_RECONNECT_JITTER,
    DEFAULT_RECONNECT_MAX_ATTEMPTS, DEFAULT_RECONNECT_MAX_DELAY,
};
use crate::types::{LiveFeedError, Result};
use rand::Rng;
use std::time::Duration;

/// Longest accepted `max_delay` or `jitter`.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Exponential backoff settings for reconnect attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first attempt
    pub base_delay: Duration,
    /// Multiplier applied per attempt
    pub growth_factor: f64,
    /// Upper bound on the exponential part
    pub max_delay: Duration,
    /// Uniform random extra delay in `[0, jitter)`
    pub jitter: Duration,
    /// Attempts allowed before giving up
    pub max_attempts: u32,
}

impl ReconnectConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(LiveFeedError::Config(format!(
                "reconnect growth factor must be finite and >= 1, got {}",
                self.growth_factor
            )));
        }
        if self.max_delay > MAX_RECONNECT_DELAY || self.jitter > MAX_RECONNECT_DELAY {
            return Err(LiveFeedError::Config(format!(
                "reconnect max_delay and jitter must not exceed {:?}",
                MAX_RECONNECT_DELAY
            )));
        }
        if self.max_attempts == 0 {
            return Err(LiveFeedError::Config(
                "reconnect max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_RECONNECT_BASE_DELAY),
            growth_factor: DEFAULT_RECONNECT_GROWTH_FACTOR,
            max_delay: Duration::from_millis(DEFAULT_RECONNECT_MAX_DELAY),
            jitter: Duration::from_millis(DEFAULT_RECONNECT_JITTER),
            max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
        }
    }
}

/// Attempt counter plus delay computation for reconnects.
///
/// The counter only moves forward through [`next_delay`](Self::next_delay) and
/// only goes back to zero through [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    /// Consumes one attempt and returns how long to wait before making it,
    /// or `None` once the attempt budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts += 1;
        Some(
            self.backoff(self.attempts)
                .saturating_add(jitter(self.config.jitter)),
        )
    }

    /// Deterministic part of the delay for a 1-indexed attempt:
    /// `min(base * growth^(attempt - 1), max_delay)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.config.base_delay.as_secs_f64() * self.config.growth_factor.powi(exponent);
        let capped = scaled.min(self.config.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.config.max_delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

fn jitter(bound: Duration) -> Duration {
    let nanos = bound.as_nanos().min(u64::MAX as u128) as u64;
    if nanos == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rand::thread_rng().gen_range(0..nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(jitter_ms: u64) -> ReconnectConfig {
        ReconnectConfig {
            base_delay: Duration::from_millis(100),
            growth_factor: 2.0,
            max_delay: Duration::from_millis(1_000),
            jitter: Duration::from_millis(jitter_ms),
            max_attempts: 10,
        }
    }

    #[test]
    fn test_delay_grows_then_caps() {
        let policy = ReconnectPolicy::new(config(0));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(40), Duration::from_millis(1_000));
    }

    #[test]
    fn test_delay_stays_within_jitter_window() {
        let mut policy = ReconnectPolicy::new(config(50));
        for attempt in 1..=10 {
            let delay = policy.next_delay().expect("attempt within budget");
            let floor = policy.backoff(attempt);
            assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
            assert!(delay < floor + Duration::from_millis(50));
            assert!(delay < Duration::from_millis(1_050));
        }
    }

    #[test]
    fn test_attempts_increment_by_one_until_exhausted() {
        let mut policy = ReconnectPolicy::new(config(0));
        for expected in 1..=10 {
            assert!(policy.next_delay().is_some());
            assert_eq!(policy.attempts(), expected);
        }
        assert!(policy.is_exhausted());
        assert_eq!(policy.next_delay(), None);
        assert_eq!(policy.attempts(), 10);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut policy = ReconnectPolicy::new(config(0));
        policy.next_delay();
        policy.next_delay();
        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut bad = config(0);
        bad.growth_factor = 0.5;
        assert!(bad.validate().is_err());

        let mut bad = config(0);
        bad.max_attempts = 0;
        assert!(bad.validate().is_err());

        let mut bad = config(0);
        bad.max_delay = Duration::MAX;
        assert!(bad.validate().is_err());

        let mut bad = config(0);
        bad.jitter = MAX_RECONNECT_DELAY + Duration::from_secs(1);
        assert!(bad.validate().is_err());

        assert!(config(0).validate().is_ok());
    }

    #[test]
    fn test_unvalidated_huge_bounds_do_not_panic() {
        let mut huge = config(0);
        huge.max_delay = Duration::MAX;
        huge.jitter = Duration::MAX;
        let mut policy = ReconnectPolicy::new(huge);
        for _ in 0..10 {
            assert!(policy.next_delay().is_some());
        }
        assert_eq!(policy.backoff(200), Duration::MAX);
    }
}
