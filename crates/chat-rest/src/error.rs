//! REST error types

use std::time::Duration;

use chat_common::ErrorCategory;
use chat_core::DomainError;
use thiserror::Error;

/// Failure reported by a dispatch gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The caller must wait at least `retry_after` before sending again
    #[error("Rate limited{}, retry after {retry_after:?}", .global.then_some(" globally").unwrap_or_default())]
    RateLimited { retry_after: Duration, global: bool },

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Request failed with {status}: {message}")]
    Other { status: u16, message: String },

    /// No response arrived at all
    #[error("Transport error: {0}")]
    Transport(String),
}

impl GateError {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::ServerError { .. } | Self::Transport(_) => ErrorCategory::Transport,
            Self::Forbidden { .. } | Self::NotFound { .. } | Self::Other { .. } => {
                ErrorCategory::Other
            }
        }
    }

    pub const fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

/// Outbound operation error
#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Rejected before anything was sent
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body parsed but describes something other than what was asked for
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl RestError {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Gate(e) => e.category(),
            Self::Domain(_) => ErrorCategory::Other,
            Self::Decode(_) | Self::Unexpected(_) => ErrorCategory::Decode,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::InvalidArgument(message.into()))
    }
}

pub type RestResult<T> = Result<T, RestError>;
