//! Voice state entity - a user's connection to a guild voice channel

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Voice connection state, keyed by user ID inside a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    pub user_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// `None` means the user left voice
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub self_stream: bool,
    #[serde(default)]
    pub suppress: bool,
}

impl VoiceState {
    /// State of a user with no voice connection
    ///
    /// Used as the "before" side of a diff when nothing was cached.
    pub fn empty(user_id: Snowflake, guild_id: Option<Snowflake>) -> Self {
        Self {
            user_id,
            guild_id,
            channel_id: None,
            session_id: String::new(),
            deaf: false,
            mute: false,
            self_deaf: false,
            self_mute: false,
            self_stream: false,
            suppress: false,
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.channel_id.is_some()
    }

    /// Check if the user was moved between two connected channels
    pub fn moved_from(&self, before: &VoiceState) -> bool {
        before.channel_id.is_some() && self.channel_id.is_some() && before.channel_id != self.channel_id
    }
}
