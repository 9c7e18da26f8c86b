//! Error categories
//!
//! Each crate keeps its own error enum and maps every variant onto one of
//! these categories. The category decides what the connection does next.

use std::fmt;

/// How a failure is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network or socket failure; retried with backoff
    Transport,
    /// Credential rejected; surfaced to the caller without retry
    Auth,
    /// One malformed frame; skipped and logged
    Decode,
    /// Event referenced an aggregate that is not cached; dropped quietly
    MergeInconsistency,
    /// Server refused to resume; full re-identify and cache rebuild
    SessionInvalidated,
    /// Outbound call throttled; wait at least as long as instructed
    RateLimited,
    /// Bad configuration; fails at startup
    Config,
    /// Anything else, including requests the server refused
    Other,
}

impl ErrorCategory {
    /// Check if this failure should stop the client
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Auth | Self::Config)
    }

    /// Check if trying again later can succeed
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Transport | Self::SessionInvalidated | Self::RateLimited
        )
    }

    /// Get the name of this category
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Auth => "auth",
            Self::Decode => "decode",
            Self::MergeInconsistency => "merge_inconsistency",
            Self::SessionInvalidated => "session_invalidated",
            Self::RateLimited => "rate_limited",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
