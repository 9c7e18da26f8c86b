//! Permission bitflags as sent by the platform
//!
//! Roles carry a permission integer; a member's effective guild permissions
//! are the union of the default role and every role they hold.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Guild-level permission flags
    ///
    /// Serialized as a decimal string in JSON, accepted as string or number.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS          = 1 << 1;
        const BAN_MEMBERS           = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR         = 1 << 3;
        const MANAGE_CHANNELS       = 1 << 4;
        const MANAGE_GUILD          = 1 << 5;
        const ADD_REACTIONS         = 1 << 6;
        const VIEW_AUDIT_LOG        = 1 << 7;
        const PRIORITY_SPEAKER      = 1 << 8;
        const STREAM                = 1 << 9;
        const VIEW_CHANNEL          = 1 << 10;
        const SEND_MESSAGES         = 1 << 11;
        const SEND_TTS_MESSAGES     = 1 << 12;
        const MANAGE_MESSAGES       = 1 << 13;
        const EMBED_LINKS           = 1 << 14;
        const ATTACH_FILES          = 1 << 15;
        const READ_MESSAGE_HISTORY  = 1 << 16;
        const MENTION_EVERYONE      = 1 << 17;
        const USE_EXTERNAL_EMOJIS   = 1 << 18;
        const CONNECT               = 1 << 20;
        const SPEAK                 = 1 << 21;
        const MUTE_MEMBERS          = 1 << 22;
        const DEAFEN_MEMBERS        = 1 << 23;
        const MOVE_MEMBERS          = 1 << 24;
        const USE_VAD               = 1 << 25;
        const CHANGE_NICKNAME       = 1 << 26;
        const MANAGE_NICKNAMES      = 1 << 27;
        const MANAGE_ROLES          = 1 << 28;
        const MANAGE_WEBHOOKS       = 1 << 29;
        const MANAGE_EMOJIS         = 1 << 30;

        /// What the platform grants the default role of a new guild
        const DEFAULT = Self::CREATE_INSTANT_INVITE.bits()
            | Self::ADD_REACTIONS.bits()
            | Self::STREAM.bits()
            | Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::SEND_TTS_MESSAGES.bits()
            | Self::EMBED_LINKS.bits()
            | Self::ATTACH_FILES.bits()
            | Self::READ_MESSAGE_HISTORY.bits()
            | Self::MENTION_EVERYONE.bits()
            | Self::USE_EXTERNAL_EMOJIS.bits()
            | Self::CONNECT.bits()
            | Self::SPEAK.bits()
            | Self::USE_VAD.bits()
            | Self::CHANGE_NICKNAME.bits();

        /// Everything that can be granted or denied per channel
        const ALL_CHANNEL = Self::CREATE_INSTANT_INVITE.bits()
            | Self::MANAGE_CHANNELS.bits()
            | Self::ADD_REACTIONS.bits()
            | Self::PRIORITY_SPEAKER.bits()
            | Self::STREAM.bits()
            | Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::SEND_TTS_MESSAGES.bits()
            | Self::MANAGE_MESSAGES.bits()
            | Self::EMBED_LINKS.bits()
            | Self::ATTACH_FILES.bits()
            | Self::READ_MESSAGE_HISTORY.bits()
            | Self::MENTION_EVERYONE.bits()
            | Self::USE_EXTERNAL_EMOJIS.bits()
            | Self::CONNECT.bits()
            | Self::SPEAK.bits()
            | Self::MUTE_MEMBERS.bits()
            | Self::DEAFEN_MEMBERS.bits()
            | Self::MOVE_MEMBERS.bits()
            | Self::USE_VAD.bits()
            | Self::MANAGE_ROLES.bits()
            | Self::MANAGE_WEBHOOKS.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        self.contains(Permissions::ADMINISTRATOR) || self.contains(permission)
    }

    /// Combine permissions from multiple roles
    pub fn combine<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        roles.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// Mask with a channel overwrite: clear `deny`, then set `allow`
    #[inline]
    #[must_use]
    pub fn with_overwrite(self, allow: Permissions, deny: Permissions) -> Self {
        (self - deny) | allow
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value as u64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions() {
        let default = Permissions::DEFAULT;
        assert!(default.contains(Permissions::VIEW_CHANNEL));
        assert!(default.contains(Permissions::SEND_MESSAGES));
        assert!(!default.contains(Permissions::ADMINISTRATOR));
        assert!(!default.contains(Permissions::MANAGE_GUILD));
    }

    #[test]
    fn test_administrator_bypass() {
        let admin = Permissions::ADMINISTRATOR;
        assert!(admin.has(Permissions::MANAGE_GUILD));
        assert!(admin.has(Permissions::BAN_MEMBERS));
    }

    #[test]
    fn test_has_permission() {
        let perms = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
        assert!(perms.has(Permissions::VIEW_CHANNEL));
        assert!(!perms.has(Permissions::MANAGE_GUILD));
    }

    #[test]
    fn test_combine_permissions() {
        let combined = Permissions::combine([Permissions::KICK_MEMBERS, Permissions::MANAGE_ROLES]);
        assert!(combined.contains(Permissions::KICK_MEMBERS | Permissions::MANAGE_ROLES));
        assert_eq!(Permissions::combine([]), Permissions::empty());
    }

    #[test]
    fn test_overwrite_denies_before_allowing() {
        let base = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
        let masked = base.with_overwrite(Permissions::SEND_MESSAGES, Permissions::SEND_MESSAGES | Permissions::VIEW_CHANNEL);
        assert_eq!(masked, Permissions::SEND_MESSAGES);
        assert!(!Permissions::ALL_CHANNEL.contains(Permissions::BAN_MEMBERS));
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(Permissions::ADMINISTRATOR.bits(), 8);
        assert_eq!(Permissions::MANAGE_ROLES.bits(), 0x1000_0000);
        assert_eq!(Permissions::DEFAULT.bits(), 104_324_673);
    }

    #[test]
    fn test_serde() {
        let perms = Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS;
        assert_eq!(serde_json::to_string(&perms).unwrap(), "\"6\"");

        let from_str: Permissions = serde_json::from_str("\"6\"").unwrap();
        let from_num: Permissions = serde_json::from_str("6").unwrap();
        assert_eq!(from_str, perms);
        assert_eq!(from_num, perms);
    }
}
