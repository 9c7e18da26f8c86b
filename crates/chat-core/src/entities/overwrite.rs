//! Channel permission overwrites
//!
//! An overwrite targets either a role or a single member and masks the
//! guild-level permissions inside one channel: `deny` bits are cleared
//! first, then `allow` bits are set.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// What an overwrite's `id` refers to
///
/// Gateway v6 names the kind (`"role"`, `"member"`); later versions send
/// `0` / `1`. Both are accepted, the name is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "OverwriteKindRepr")]
pub enum OverwriteKind {
    Role,
    Member,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverwriteKindRepr {
    Name(String),
    Code(u8),
}

impl TryFrom<OverwriteKindRepr> for OverwriteKind {
    type Error = String;

    fn try_from(repr: OverwriteKindRepr) -> Result<Self, Self::Error> {
        match repr {
            OverwriteKindRepr::Name(name) if name == "role" => Ok(Self::Role),
            OverwriteKindRepr::Name(name) if name == "member" => Ok(Self::Member),
            OverwriteKindRepr::Code(0) => Ok(Self::Role),
            OverwriteKindRepr::Code(1) => Ok(Self::Member),
            OverwriteKindRepr::Name(other) => Err(format!("unknown overwrite type: {other}")),
            OverwriteKindRepr::Code(other) => Err(format!("unknown overwrite type: {other}")),
        }
    }
}

/// Per-channel allow/deny pair for a role or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    #[serde(default)]
    pub allow: Permissions,
    #[serde(default)]
    pub deny: Permissions,
}

impl PermissionOverwrite {
    #[must_use]
    pub fn role(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Role,
            allow,
            deny,
        }
    }

    #[must_use]
    pub fn member(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Member,
            allow,
            deny,
        }
    }

    #[inline]
    pub fn is_role(&self) -> bool {
        self.kind == OverwriteKind::Role
    }

    #[inline]
    pub fn is_member(&self) -> bool {
        self.kind == OverwriteKind::Member
    }
}
