//! Value objects - immutable types shared by every entity

mod patch;
mod permissions;
mod snowflake;

pub use patch::Patch;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
