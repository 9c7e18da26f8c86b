//! Guild entity - the aggregate root of the cache
//!
//! A guild owns its roles, channels, members and voice states. Everything
//! inside is keyed by snowflake; cross references (a member's roles, a
//! channel's parent) are IDs resolved through these maps.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::entities::{
    CategoryChannel, GuildChannel, Member, Role, TextChannel, VoiceChannel, VoiceState,
};
use crate::error::DomainError;
use crate::value_objects::{Permissions, Snowflake};

/// Image formats accepted by the CDN for guild icons
pub const VALID_ICON_FORMATS: [&str; 4] = ["webp", "jpeg", "jpg", "png"];

/// Required verification before members can talk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum VerificationLevel {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    VeryHigh = 4,
}

impl TryFrom<u8> for VerificationLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::VeryHigh),
            other => Err(format!("unknown verification level: {other}")),
        }
    }
}

impl From<VerificationLevel> for u8 {
    fn from(level: VerificationLevel) -> Self {
        level as u8
    }
}

/// Guild (server) aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub splash: Option<String>,
    pub owner_id: Snowflake,
    pub region: String,
    pub afk_channel_id: Option<Snowflake>,
    pub afk_timeout: u32,
    pub verification_level: VerificationLevel,
    pub mfa_level: u8,
    pub features: Vec<String>,
    /// Outage flag; an unavailable guild holds only its ID
    pub unavailable: bool,
    /// Server-reported total, when known
    pub member_count: Option<u64>,
    /// `None` until the server says so or the member count is known
    pub large: Option<bool>,
    pub roles: HashMap<Snowflake, Role>,
    pub channels: HashMap<Snowflake, GuildChannel>,
    pub members: HashMap<Snowflake, Member>,
    voice_states: HashMap<Snowflake, VoiceState>,
    voice_index: HashMap<Snowflake, BTreeSet<Snowflake>>,
}

impl Guild {
    /// Create an empty, available guild
    pub fn new(id: Snowflake, name: impl Into<String>, owner_id: Snowflake) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            splash: None,
            owner_id,
            region: String::new(),
            afk_channel_id: None,
            afk_timeout: 0,
            verification_level: VerificationLevel::None,
            mfa_level: 0,
            features: Vec::new(),
            unavailable: false,
            member_count: None,
            large: None,
            roles: HashMap::new(),
            channels: HashMap::new(),
            members: HashMap::new(),
            voice_states: HashMap::new(),
            voice_index: HashMap::new(),
        }
    }

    /// Placeholder for a guild known only by ID
    pub fn unavailable(id: Snowflake) -> Self {
        let mut guild = Self::new(id, String::new(), Snowflake::default());
        guild.unavailable = true;
        guild
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Owner's member entry, if cached
    pub fn owner(&self) -> Option<&Member> {
        self.members.get(&self.owner_id)
    }

    pub fn role(&self, id: Snowflake) -> Option<&Role> {
        self.roles.get(&id)
    }

    pub fn channel(&self, id: Snowflake) -> Option<&GuildChannel> {
        self.channels.get(&id)
    }

    pub fn member(&self, user_id: Snowflake) -> Option<&Member> {
        self.members.get(&user_id)
    }

    /// The `@everyone` role, whose ID is the guild ID
    pub fn default_role(&self) -> Option<&Role> {
        self.roles.get(&self.id)
    }

    /// Roles in hierarchy order, lowest first
    pub fn roles_sorted(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| a.hierarchy_cmp(b));
        roles
    }

    /// All channels in display order
    pub fn channels_sorted(&self) -> Vec<&GuildChannel> {
        let mut channels: Vec<&GuildChannel> = self.channels.values().collect();
        channels.sort_by(|a, b| a.display_cmp(b));
        channels
    }

    pub fn text_channels(&self) -> Vec<&TextChannel> {
        self.channels_sorted()
            .into_iter()
            .filter_map(GuildChannel::as_text)
            .collect()
    }

    pub fn voice_channels(&self) -> Vec<&VoiceChannel> {
        self.channels_sorted()
            .into_iter()
            .filter_map(GuildChannel::as_voice)
            .collect()
    }

    pub fn categories(&self) -> Vec<&CategoryChannel> {
        self.channels_sorted()
            .into_iter()
            .filter_map(GuildChannel::as_category)
            .collect()
    }

    /// Channels grouped under their category
    ///
    /// The uncategorised group comes first, then categories in display
    /// order. Within a group text channels precede voice channels, each in
    /// display order. A channel whose parent is not cached is uncategorised.
    pub fn by_category(&self) -> Vec<(Option<&CategoryChannel>, Vec<&GuildChannel>)> {
        fn sort_group(mut channels: Vec<&GuildChannel>) -> Vec<&GuildChannel> {
            let bucket = |c: &GuildChannel| u8::from(matches!(c, GuildChannel::Voice(_)));
            channels.sort_by(|a, b| bucket(a).cmp(&bucket(b)).then_with(|| a.display_cmp(b)));
            channels
        }

        let mut groups: HashMap<Option<Snowflake>, Vec<&GuildChannel>> = HashMap::new();
        for channel in self.channels.values() {
            if matches!(channel, GuildChannel::Category(_)) {
                continue;
            }
            let parent = channel
                .parent_id()
                .filter(|id| matches!(self.channels.get(id), Some(GuildChannel::Category(_))));
            groups.entry(parent).or_default().push(channel);
        }

        let mut result = Vec::new();
        let uncategorised = groups.remove(&None).unwrap_or_default();
        if !uncategorised.is_empty() {
            result.push((None, sort_group(uncategorised)));
        }
        for category in self.categories() {
            let channels = groups.remove(&Some(category.id)).unwrap_or_default();
            result.push((Some(category), sort_group(channels)));
        }
        result
    }

    /// Local members equal the server-reported total
    pub fn chunked(&self) -> bool {
        self.member_count
            .is_some_and(|count| count == self.members.len() as u64)
    }

    /// Resolve the large flag against a threshold
    ///
    /// An explicit flag wins, then the reported member count, then the
    /// number of cached members.
    pub fn is_large(&self, threshold: u64) -> bool {
        self.large.unwrap_or_else(|| {
            self.member_count.unwrap_or(self.members.len() as u64) >= threshold
        })
    }

    /// Shard that receives this guild's events
    #[inline]
    pub fn shard_id(&self, shard_count: u32) -> u32 {
        self.id.shard_id(shard_count)
    }

    /// CDN URL of the icon in a given format and size
    ///
    /// Returns `Ok(None)` when the guild has no icon.
    pub fn icon_url_as(&self, format: &str, size: u32) -> Result<Option<String>, DomainError> {
        if !VALID_ICON_FORMATS.contains(&format) {
            return Err(DomainError::InvalidArgument(format!(
                "format must be one of {VALID_ICON_FORMATS:?}"
            )));
        }
        if !size.is_power_of_two() || !(16..=2048).contains(&size) {
            return Err(DomainError::InvalidArgument(
                "size must be a power of 2 between 16 and 2048".to_string(),
            ));
        }
        Ok(self.icon.as_ref().map(|icon| {
            format!(
                "https://cdn.discordapp.com/icons/{}/{icon}.{format}?size={size}",
                self.id
            )
        }))
    }

    /// Effective guild-level permissions of a member
    ///
    /// The owner holds everything; an administrator role grants everything.
    pub fn member_permissions(&self, user_id: Snowflake) -> Permissions {
        if self.is_owner(user_id) {
            return Permissions::all();
        }
        let base = self.default_role().map(|r| r.permissions).unwrap_or_default();
        let Some(member) = self.members.get(&user_id) else {
            return base;
        };
        let granted = Permissions::combine(
            member
                .roles
                .iter()
                .filter_map(|id| self.roles.get(id))
                .map(|r| r.permissions),
        ) | base;
        if granted.contains(Permissions::ADMINISTRATOR) {
            Permissions::all()
        } else {
            granted
        }
    }

    pub fn voice_state(&self, user_id: Snowflake) -> Option<&VoiceState> {
        self.voice_states.get(&user_id)
    }

    pub fn voice_states(&self) -> impl Iterator<Item = &VoiceState> {
        self.voice_states.values()
    }

    /// Users connected to a voice channel, in ID order
    pub fn voice_members(&self, channel_id: Snowflake) -> Vec<Snowflake> {
        self.voice_index
            .get(&channel_id)
            .map(|users| users.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Store a connected voice state, moving it in the channel index
    ///
    /// A state without a channel is treated as a removal.
    pub fn insert_voice_state(&mut self, state: VoiceState) -> Option<VoiceState> {
        let Some(channel_id) = state.channel_id else {
            return self.remove_voice_state(state.user_id);
        };
        let user_id = state.user_id;
        let previous = self.voice_states.insert(user_id, state);
        if let Some(old_channel) = previous.as_ref().and_then(|p| p.channel_id) {
            self.unindex_voice(old_channel, user_id);
        }
        self.voice_index.entry(channel_id).or_default().insert(user_id);
        previous
    }

    /// Evict a voice state and its channel index entry
    pub fn remove_voice_state(&mut self, user_id: Snowflake) -> Option<VoiceState> {
        let previous = self.voice_states.remove(&user_id)?;
        if let Some(channel_id) = previous.channel_id {
            self.unindex_voice(channel_id, user_id);
        }
        Some(previous)
    }

    /// Drop every voice state pointing at a channel
    pub fn clear_voice_channel(&mut self, channel_id: Snowflake) -> usize {
        let users = self.voice_index.remove(&channel_id).unwrap_or_default();
        for user_id in &users {
            self.voice_states.remove(user_id);
        }
        users.len()
    }

    fn unindex_voice(&mut self, channel_id: Snowflake, user_id: Snowflake) {
        if let Some(users) = self.voice_index.get_mut(&channel_id) {
            users.remove(&user_id);
            if users.is_empty() {
                self.voice_index.remove(&channel_id);
            }
        }
    }
}
