use crate::config::WorkerConfig;
use std::time::Duration;

/// Idle-wait interval for a worker polling an empty frontier
///
/// Counts in whole time units: starts at 1, doubles after every miss, and
/// stops at the cap (1, 2, 4, 8, 16, 30, 30, ... with the default cap of 30).
#[derive(Debug, Clone)]
pub struct Backoff {
    unit: Duration,
    current: u32,
    max: u32,
}

impl Backoff {
    pub const INITIAL: u32 = 1;
    pub const DEFAULT_MAX: u32 = 30;

    pub fn new(unit: Duration, max: u32) -> Self {
        let max = max.max(Self::INITIAL);
        Self {
            unit,
            current: Self::INITIAL,
            max,
        }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(config.backoff_unit(), config.max_backoff)
    }

    /// Current interval in time units
    pub fn current_units(&self) -> u32 {
        self.current
    }

    /// Current interval as a duration, saturating at [`Duration::MAX`]
    pub fn current(&self) -> Duration {
        self.unit
            .checked_mul(self.current)
            .unwrap_or(Duration::MAX)
    }

    /// Doubles the interval, up to the cap
    pub fn advance(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.max);
    }

    pub fn reset(&mut self) {
        self.current = Self::INITIAL;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Self::DEFAULT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_sequence_with_cap() {
        let mut backoff = Backoff::default();
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(backoff.current_units());
            backoff.advance();
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 16, 30, 30, 30]);
    }

    #[test]
    fn test_duration_uses_unit() {
        let mut backoff = Backoff::new(Duration::from_millis(100), 30);
        assert_eq!(backoff.current(), Duration::from_millis(100));
        backoff.advance();
        backoff.advance();
        assert_eq!(backoff.current(), Duration::from_millis(400));
    }

    #[test]
    fn test_reset() {
        let mut backoff = Backoff::default();
        backoff.advance();
        backoff.advance();
        backoff.reset();
        assert_eq!(backoff.current_units(), 1);
    }

    #[test]
    fn test_small_cap() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 3);
        backoff.advance();
        backoff.advance();
        backoff.advance();
        assert_eq!(backoff.current_units(), 3);

        let backoff = Backoff::new(Duration::from_secs(1), 0);
        assert_eq!(backoff.current_units(), 1);
    }

    #[test]
    fn test_overflowing_interval_saturates() {
        let mut backoff = Backoff::new(Duration::MAX, u32::MAX);
        assert_eq!(backoff.current(), Duration::MAX);
        backoff.advance();
        assert_eq!(backoff.current_units(), 2);
        assert_eq!(backoff.current(), Duration::MAX);
    }

    #[test]
    fn test_extreme_config_never_panics() {
        let config = crate::config::parse_config(
            r#"
[worker]
backoff-unit-ms = 9223372036854775807
max-backoff = 4294967295

[storage]
database-path = "crawl.db"
"#,
        )
        .unwrap();

        let mut backoff = Backoff::from_config(&config.worker);
        let mut previous = Duration::ZERO;
        for _ in 0..40 {
            let current = backoff.current();
            assert!(current >= previous);
            previous = current;
            backoff.advance();
        }
        assert_eq!(backoff.current(), Duration::MAX);
    }

    #[test]
    fn test_from_config() {
        let config = WorkerConfig {
            backoff_unit_ms: 250,
            max_backoff: 8,
            ..WorkerConfig::default()
        };
        let mut backoff = Backoff::from_config(&config);
        for _ in 0..10 {
            backoff.advance();
        }
        assert_eq!(backoff.current(), Duration::from_millis(2000));
    }
}
