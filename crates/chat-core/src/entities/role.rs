//! Role entity - a guild role with permissions and a hierarchy position

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::value_objects::{Permissions, Snowflake};

/// Guild role
///
/// `guild_id` is not part of the wire object; it is filled in by whoever
/// stores the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, guild_id: Snowflake, name: impl Into<String>, position: i32) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            color: 0,
            hoist: false,
            position,
            permissions: Permissions::empty(),
            managed: false,
            mentionable: false,
        }
    }

    /// Create the default (`@everyone`) role, which shares the guild's ID
    pub fn everyone(guild_id: Snowflake) -> Self {
        let mut role = Self::new(guild_id, guild_id, "@everyone", 0);
        role.permissions = Permissions::DEFAULT;
        role
    }

    /// The default role is the one whose ID equals its guild's ID
    #[inline]
    pub fn is_default(&self) -> bool {
        self.id == self.guild_id
    }

    /// Compare role positions for hierarchy (higher position = more authority)
    #[inline]
    pub fn is_higher_than(&self, other: &Role) -> bool {
        self.hierarchy_cmp(other) == Ordering::Greater
    }

    /// Total hierarchy order: position, then ID
    pub fn hierarchy_cmp(&self, other: &Role) -> Ordering {
        (self.position, self.id).cmp(&(other.position, other.id))
    }

    /// Get the color as a hex string (without #)
    pub fn color_hex(&self) -> String {
        format!("{:06x}", self.color)
    }

    /// Overwrite the role's attributes, keeping the guild binding and the
    /// cached hierarchy position
    ///
    /// Positions are owned by the cache's create/delete bookkeeping; callers
    /// that accept a server reorder assign `position` themselves.
    pub fn update_from(&mut self, other: Role) {
        let guild_id = self.guild_id;
        let position = self.position;
        *self = other;
        self.guild_id = guild_id;
        self.position = position;
    }
}
