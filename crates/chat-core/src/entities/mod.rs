//! Cached entities - the object graph the merge engine maintains

mod channel;
mod emoji;
mod guild;
mod member;
mod message;
mod overwrite;
mod role;
mod user;
mod voice_state;

pub use channel::{CategoryChannel, ChannelKind, GuildChannel, TextChannel, VoiceChannel};
pub use emoji::Emoji;
pub use guild::{Guild, VerificationLevel, VALID_ICON_FORMATS};
pub use member::{Activity, ActivityKind, Member, Status};
pub use message::{Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia, Message};
pub use overwrite::{OverwriteKind, PermissionOverwrite};
pub use role::Role;
pub use user::{User, UserRef};
pub use voice_state::VoiceState;
