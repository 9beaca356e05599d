use std::time::Duration;

/// Exponential backoff configuration for controller reconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Base delay, doubled per attempt. Default: 1s.
    pub initial_delay: Duration,
    /// Upper bound on a single delay. Default: 30s.
    pub max_delay: Duration,
    /// Attempts before giving up. Default: 5.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

/// Retry schedule of one session.
///
/// `delay = min(initial * 2^attempt, max)` where the attempt counter is
/// bumped before the delay is computed, so the first retry waits twice the
/// initial delay.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self { config, attempt: 0 }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.config.max_attempts
    }

    /// Delay before the next attempt, or `None` once the cap is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        self.attempt += 1;
        Some(delay_for(self.attempt, &self.config))
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

pub fn delay_for(attempt: u32, config: &ReconnectConfig) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);

    config
        .initial_delay
        .saturating_mul(factor)
        .min(config.max_delay)
}
