//! Request bodies for guild operations

use chat_core::entities::VerificationLevel;
use chat_core::{ChannelKind, Patch, PermissionOverwrite, Permissions, Snowflake, User};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RestError, RestResult};
use crate::image;

/// Fields of a role to create or change; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
}

impl RoleParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn hoist(mut self, hoist: bool) -> Self {
        self.hoist = Some(hoist);
        self
    }

    #[must_use]
    pub fn mentionable(mut self, mentionable: bool) -> Self {
        self.mentionable = Some(mentionable);
        self
    }
}

/// A new guild channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nsfw: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id: None,
            topic: None,
            bitrate: None,
            user_limit: None,
            nsfw: false,
            permission_overwrites: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ChannelKind::Text)
    }

    pub fn voice(name: impl Into<String>) -> Self {
        Self::new(name, ChannelKind::Voice)
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self::new(name, ChannelKind::Category)
    }

    /// Nest under a category
    #[must_use]
    pub fn parent(mut self, parent_id: Snowflake) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    #[must_use]
    pub fn user_limit(mut self, user_limit: u32) -> Self {
        self.user_limit = Some(user_limit);
        self
    }

    /// Add a role or member overwrite; one per target
    #[must_use]
    pub fn overwrite(mut self, overwrite: PermissionOverwrite) -> Self {
        self.permission_overwrites.push(overwrite);
        self
    }

    pub(crate) fn validate(&self) -> RestResult<()> {
        for (i, overwrite) in self.permission_overwrites.iter().enumerate() {
            if self.permission_overwrites[..i].iter().any(|o| o.id == overwrite.id) {
                return Err(RestError::invalid(format!("Duplicate overwrite for {}", overwrite.id)));
            }
        }
        match self.kind {
            ChannelKind::Text | ChannelKind::News => {
                if self.bitrate.is_some() || self.user_limit.is_some() {
                    return Err(RestError::invalid("Text channels take no bitrate or user limit"));
                }
            }
            ChannelKind::Voice => {
                if self.topic.is_some() {
                    return Err(RestError::invalid("Voice channels have no topic"));
                }
            }
            ChannelKind::Category => {
                if self.parent_id.is_some() {
                    return Err(RestError::invalid("Categories cannot be nested"));
                }
            }
            other => {
                return Err(RestError::invalid(format!(
                    "Cannot create a {} channel in a guild",
                    other.name()
                )))
            }
        }
        if self.name.is_empty() || self.name.chars().count() > 100 {
            return Err(RestError::invalid("Channel name must be 1-100 characters"));
        }
        Ok(())
    }
}

/// Guild fields to change
///
/// `Patch::Null` clears a nullable field; `Patch::Absent` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditGuild {
    pub name: Option<String>,
    pub region: Option<String>,
    /// Raw PNG, JPEG or GIF bytes
    pub icon: Patch<Vec<u8>>,
    pub afk_channel_id: Patch<Snowflake>,
    pub afk_timeout: Option<u32>,
    pub verification_level: Option<VerificationLevel>,
    pub owner_id: Option<Snowflake>,
}

impl EditGuild {
    pub(crate) fn to_payload(&self) -> RestResult<Value> {
        let mut body = Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), Value::from(name.as_str()));
        }
        if let Some(region) = &self.region {
            body.insert("region".into(), Value::from(region.as_str()));
        }
        match &self.icon {
            Patch::Absent => {}
            Patch::Null => {
                body.insert("icon".into(), Value::Null);
            }
            Patch::Value(bytes) => {
                body.insert("icon".into(), Value::from(image::data_uri(bytes)?));
            }
        }
        match self.afk_channel_id {
            Patch::Absent => {}
            Patch::Null => {
                body.insert("afk_channel_id".into(), Value::Null);
            }
            Patch::Value(id) => {
                body.insert("afk_channel_id".into(), serde_json::to_value(id)?);
            }
        }
        if let Some(timeout) = self.afk_timeout {
            body.insert("afk_timeout".into(), Value::from(timeout));
        }
        if let Some(level) = self.verification_level {
            body.insert("verification_level".into(), serde_json::to_value(level)?);
        }
        if let Some(owner) = self.owner_id {
            body.insert("owner_id".into(), serde_json::to_value(owner)?);
        }
        if body.is_empty() {
            return Err(RestError::invalid("Nothing to edit"));
        }
        Ok(Value::Object(body))
    }
}

/// One entry of a guild's ban list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BanEntry {
    pub user: User,
    #[serde(default)]
    pub reason: Option<String>,
}
