//! Exponential backoff for rate-limited requests

use crate::GeneratorConfig;
use std::time::Duration;

/// Attempt budget and backoff schedule for one documentation request.
///
/// Delay before retry `n` (0-based) is `base_delay * 2^n`, without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay to wait after attempt `attempt` failed, or `None` when the budget is spent.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 < self.max_attempts {
            Some(self.delay_for(attempt))
        } else {
            None
        }
    }

    /// Upper bound on time spent sleeping across one request.
    pub fn max_total_wait(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_stops_at_budget() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.backoff(0), Some(Duration::from_secs(1)));
        assert_eq!(policy.backoff(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.backoff(2), None);
    }

    #[test]
    fn test_max_total_wait() {
        assert_eq!(
            RetryPolicy::new(3, Duration::from_secs(1)).max_total_wait(),
            Duration::from_secs(3)
        );
        assert_eq!(
            RetryPolicy::new(5, Duration::from_secs(2)).max_total_wait(),
            Duration::from_secs(2 + 4 + 8 + 16)
        );
        assert_eq!(
            RetryPolicy::new(1, Duration::from_secs(2)).max_total_wait(),
            Duration::ZERO
        );
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff(0), None);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = RetryPolicy::new(10, Duration::from_secs(2));
        assert!(policy.delay_for(40) >= policy.delay_for(9));
    }
}
