//! Domain errors - argument validation and lookups against the cache

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Unknown guild: {0}")]
    UnknownGuild(Snowflake),

    #[error("Unknown channel: {0}")]
    UnknownChannel(Snowflake),

    #[error("Unknown role: {0}")]
    UnknownRole(Snowflake),

    #[error("Unknown member {user_id} in guild {guild_id}")]
    UnknownMember {
        guild_id: Snowflake,
        user_id: Snowflake,
    },

    #[error("Unknown message: {0}")]
    UnknownMessage(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DomainError {
    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownGuild(_) => "UNKNOWN_GUILD",
            Self::UnknownChannel(_) => "UNKNOWN_CHANNEL",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::UnknownMember { .. } => "UNKNOWN_MEMBER",
            Self::UnknownMessage(_) => "UNKNOWN_MESSAGE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::UnknownGuild(Snowflake::new(1)).code(), "UNKNOWN_GUILD");
        assert_eq!(
            DomainError::InvalidArgument("size".into()).code(),
            "INVALID_ARGUMENT"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::UnknownRole(Snowflake::new(1)).is_not_found());
        assert!(!DomainError::InvalidArgument("x".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::UnknownMember {
            guild_id: Snowflake::new(1),
            user_id: Snowflake::new(2),
        };
        assert_eq!(err.to_string(), "Unknown member 2 in guild 1");
    }
}
