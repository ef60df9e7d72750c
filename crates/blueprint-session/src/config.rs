//! Session configuration.

use blueprint_engine::MIN_COMMIT_LEN;
use std::time::Duration;

/// Tunables for one user session
///
/// The two delays are heuristics, not protocol guarantees; tests drive them
/// through tokio's paused clock.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiet period before a response edit is written out
    pub debounce: Duration,
    /// Pause between an auto-commit and the cursor move that follows it,
    /// so dependent state settles before navigation bounds are recomputed
    pub settle_delay: Duration,
    /// Minimum trimmed answer length for a commit
    pub min_commit_len: usize,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debounce quiet period
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// With settle delay
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// With committability threshold
    #[inline]
    #[must_use]
    pub fn with_min_commit_len(mut self, min_commit_len: usize) -> Self {
        self.min_commit_len = min_commit_len;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            settle_delay: Duration::from_millis(100),
            min_commit_len: MIN_COMMIT_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.min_commit_len, 10);
    }

    #[test]
    fn config_builder() {
        let config = SessionConfig::new()
            .with_debounce(Duration::from_millis(50))
            .with_min_commit_len(3);
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.min_commit_len, 3);
    }
}
