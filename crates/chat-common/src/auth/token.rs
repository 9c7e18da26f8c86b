//! Bot token
//!
//! Wraps the credential so it never ends up in logs through `Debug`.

use std::fmt;

/// Bot credential sent on identify and on every HTTP request
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token, stripping surrounding whitespace and a `Bot ` prefix
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix("Bot ").unwrap_or(trimmed);
        Self(bare.to_string())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw token, for the identify payload
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value of the HTTP `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("Bot {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}
