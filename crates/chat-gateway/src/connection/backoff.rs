//! Reconnect backoff
//!
//! Delay doubles per failed attempt up to a cap. With jitter on, each delay
//! is drawn from `[delay / 2, delay]` so shards restarting together spread out.

use std::time::Duration;

use chat_common::ReconnectSettings;
use rand::Rng;

/// Lower bound of the pause before re-identifying after a rejected session
const INVALID_SESSION_MIN: Duration = Duration::from_secs(1);
/// Upper bound of the same pause
const INVALID_SESSION_MAX: Duration = Duration::from_secs(5);

/// Exponential backoff with a cap
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    jitter: bool,
    attempt: u32,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            jitter: false,
            attempt: 0,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay the next call to [`next_delay`](Self::next_delay) is centred on
    pub fn ceiling(&self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Delay before the next attempt; counts the attempt
    pub fn next_delay(&mut self) -> Duration {
        let ceiling = self.ceiling();
        self.attempt = self.attempt.saturating_add(1);
        if self.jitter {
            rand::thread_rng().gen_range(ceiling / 2..=ceiling)
        } else {
            ceiling
        }
    }

    /// Pause before identifying again after a non-resumable invalid session
    ///
    /// Random within 1..=5 s, or the base delay when jitter is off.
    pub fn invalid_session_delay(&self) -> Duration {
        if self.jitter {
            rand::thread_rng().gen_range(INVALID_SESSION_MIN..=INVALID_SESSION_MAX)
        } else {
            self.base
        }
    }

    /// Forget past failures after a healthy session
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Failed attempts since the last reset
    pub const fn attempts(&self) -> u32 {
        self.attempt
    }
}

impl From<&ReconnectSettings> for ExponentialBackoff {
    fn from(settings: &ReconnectSettings) -> Self {
        Self::new(settings.base_delay, settings.max_delay).with_jitter(settings.jitter)
    }
}
