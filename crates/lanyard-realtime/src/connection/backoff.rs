//! Reconnect delay policy.

use std::time::Duration;

use rand::Rng;

use lanyard_core::config::realtime::RealtimeConfig;

/// Exponential backoff with equal jitter.
///
/// The ceiling for attempt `n` is `initial * multiplier^n`, capped at `max`.
/// The returned delay is uniformly drawn from `[ceiling / 2, ceiling]`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    attempt: u32,
}

impl Backoff {
    /// Creates a policy.
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial,
            max: max.max(initial),
            multiplier: multiplier.max(1.0),
            attempt: 0,
        }
    }

    /// Creates a policy from the realtime settings.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.backoff_multiplier,
        )
    }

    /// Upper bound of the next delay.
    pub fn ceiling(&self) -> Duration {
        let exponent = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        if secs.is_finite() && secs < self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        }
    }

    /// Returns the delay before the next attempt and advances the policy.
    pub fn next_delay(&mut self) -> Duration {
        let ceiling = self.ceiling().as_millis() as u64;
        self.attempt = self.attempt.saturating_add(1);
        let floor = ceiling / 2;
        Duration::from_millis(rand::rng().random_range(floor..=ceiling))
    }

    /// Number of delays handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether a connection that stayed subscribed for `uptime` earns a
    /// reset: it must have outlived the longest delay.
    pub fn is_healthy(&self, uptime: Duration) -> bool {
        uptime >= self.max
    }

    /// Starts over after a healthy connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_grows_and_caps() {
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(30), 2.0);
        let mut ceilings = Vec::new();
        for _ in 0..10 {
            ceilings.push(backoff.ceiling().as_millis());
            backoff.next_delay();
        }
        assert_eq!(
            ceilings,
            vec![500, 1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000, 30000]
        );
    }

    #[test]
    fn test_delay_stays_within_jitter_window() {
        let mut backoff = Backoff::new(Duration::from_millis(1000), Duration::from_secs(30), 2.0);
        for _ in 0..50 {
            let ceiling = backoff.ceiling();
            let delay = backoff.next_delay();
            assert!(delay <= ceiling);
            assert!(delay >= ceiling / 2);
        }
    }

    #[test]
    fn test_reset() {
        let mut backoff = Backoff::from_config(&RealtimeConfig::default());
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempt(), 2);
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.ceiling(), Duration::from_millis(500));
    }

    #[test]
    fn test_short_sessions_are_not_healthy() {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(5), 2.0);
        assert!(!backoff.is_healthy(Duration::ZERO));
        assert!(!backoff.is_healthy(Duration::from_millis(4_999)));
        assert!(backoff.is_healthy(Duration::from_secs(5)));
    }

    #[test]
    fn test_huge_attempt_count_does_not_overflow() {
        let mut backoff = Backoff::new(Duration::from_millis(1), Duration::from_secs(5), 10.0);
        for _ in 0..2000 {
            backoff.next_delay();
        }
        assert_eq!(backoff.ceiling(), Duration::from_secs(5));
    }
}
