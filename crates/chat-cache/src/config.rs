//! Cache tuning

use chat_common::CacheSettings;

/// Capacity of the change notification channel
const DEFAULT_NOTIFY_CAPACITY: usize = 1024;

/// Cache merge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Member count at or above which a guild without an explicit flag is large
    pub large_threshold: u64,
    /// Messages kept in the bounded message cache (0 disables it)
    pub max_messages: usize,
    /// Buffered change notifications per subscriber
    pub notify_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            large_threshold: settings.large_threshold,
            max_messages: settings.max_messages,
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn with_large_threshold(mut self, threshold: u64) -> Self {
        self.large_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }
}
