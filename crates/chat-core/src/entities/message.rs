//! Message entity and rich embeds
//!
//! Every optional embed part is an explicit `Option`; an embed with nothing
//! set is simply [`Embed::default`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{MessagePayload, MessageUpdatePayload};
use crate::value_objects::Snowflake;

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub author_id: Snowflake,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub tts: bool,
    pub mention_everyone: bool,
    pub pinned: bool,
    pub embeds: Vec<Embed>,
}

impl Message {
    /// Build from a wire object; the caller stores the embedded author separately
    pub fn from_payload(payload: &MessagePayload) -> Self {
        Self {
            id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            author_id: payload.author.id,
            content: payload.content.clone(),
            timestamp: payload.timestamp,
            edited_timestamp: payload.edited_timestamp,
            tts: payload.tts,
            mention_everyone: payload.mention_everyone,
            pinned: payload.pinned,
            embeds: payload.embeds.clone(),
        }
    }

    /// Merge a partial edit; fields absent from the edit are kept
    pub fn apply_update(&mut self, update: MessageUpdatePayload) {
        if let Some(content) = update.content {
            self.content = content;
        }
        update.edited_timestamp.apply_to(&mut self.edited_timestamp);
        if let Some(pinned) = update.pinned {
            self.pinned = pinned;
        }
        if let Some(embeds) = update.embeds {
            self.embeds = embeds;
        }
    }

    /// Jump link as rendered by clients
    pub fn jump_url(&self) -> String {
        let guild = self.guild_id.map_or_else(|| "@me".to_string(), |g| g.to_string());
        format!("https://discordapp.com/channels/{guild}/{}/{}", self.channel_id, self.id)
    }
}

/// Rich embed attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url: None,
        });
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Check if nothing is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
