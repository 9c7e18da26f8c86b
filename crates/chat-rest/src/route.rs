//! Route table
//!
//! Every REST endpoint the client calls, as a verb plus a path relative to
//! the API base.

use std::fmt;

use chat_core::Snowflake;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One endpoint with its path parameters filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Route {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub fn create_role(guild_id: Snowflake) -> Self {
        Self::new(Verb::Post, format!("/guilds/{guild_id}/roles"))
    }

    pub fn edit_role(guild_id: Snowflake, role_id: Snowflake) -> Self {
        Self::new(Verb::Patch, format!("/guilds/{guild_id}/roles/{role_id}"))
    }

    pub fn delete_role(guild_id: Snowflake, role_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/guilds/{guild_id}/roles/{role_id}"))
    }

    // =========================================================================
    // Members and bans
    // =========================================================================

    pub fn kick(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/guilds/{guild_id}/members/{user_id}"))
    }

    pub fn ban(guild_id: Snowflake, user_id: Snowflake, delete_message_days: u8) -> Self {
        Self::new(Verb::Put, format!("/guilds/{guild_id}/bans/{user_id}"))
            .with_query("delete-message-days", delete_message_days)
    }

    pub fn unban(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/guilds/{guild_id}/bans/{user_id}"))
    }

    pub fn get_bans(guild_id: Snowflake) -> Self {
        Self::new(Verb::Get, format!("/guilds/{guild_id}/bans"))
    }

    pub fn get_ban(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self::new(Verb::Get, format!("/guilds/{guild_id}/bans/{user_id}"))
    }

    /// Remove members inactive for `days`
    pub fn prune(guild_id: Snowflake, days: u32) -> Self {
        Self::new(Verb::Post, format!("/guilds/{guild_id}/prune")).with_query("days", days)
    }

    /// Count members a prune would remove without removing them
    pub fn estimate_prune(guild_id: Snowflake, days: u32) -> Self {
        Self::new(Verb::Get, format!("/guilds/{guild_id}/prune")).with_query("days", days)
    }

    // =========================================================================
    // Channels and messages
    // =========================================================================

    pub fn create_channel(guild_id: Snowflake) -> Self {
        Self::new(Verb::Post, format!("/guilds/{guild_id}/channels"))
    }

    pub fn delete_channel(channel_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/channels/{channel_id}"))
    }

    pub fn create_message(channel_id: Snowflake) -> Self {
        Self::new(Verb::Post, format!("/channels/{channel_id}/messages"))
    }

    // =========================================================================
    // Guild
    // =========================================================================

    pub fn edit_guild(guild_id: Snowflake) -> Self {
        Self::new(Verb::Patch, format!("/guilds/{guild_id}"))
    }

    pub fn leave_guild(guild_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/users/@me/guilds/{guild_id}"))
    }

    /// Owner only
    pub fn delete_guild(guild_id: Snowflake) -> Self {
        Self::new(Verb::Delete, format!("/guilds/{guild_id}"))
    }

    pub fn create_emoji(guild_id: Snowflake) -> Self {
        Self::new(Verb::Post, format!("/guilds/{guild_id}/emojis"))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}
