//! Gateway payloads for scripted sessions

use serde_json::{json, Value};

/// Long enough that no heartbeat fires during a test
pub const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

pub const BOT_ID: u64 = 1;

pub fn user(id: u64, username: &str) -> Value {
    json!({"id": id.to_string(), "username": username, "discriminator": "0001", "bot": id == BOT_ID})
}

pub fn ready(session_id: &str, guild_ids: &[u64]) -> Value {
    let guilds: Vec<Value> = guild_ids
        .iter()
        .map(|id| json!({"id": id.to_string(), "unavailable": true}))
        .collect();
    json!({
        "v": 6,
        "user": user(BOT_ID, "bot"),
        "guilds": guilds,
        "session_id": session_id
    })
}

/// Guild with `@everyone`, one text channel `id + 1` and the bot as member
pub fn guild(id: u64, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "owner_id": BOT_ID.to_string(),
        "member_count": 1,
        "roles": [{"id": id.to_string(), "name": "@everyone", "position": 0, "permissions": "0"}],
        "channels": [{"id": (id + 1).to_string(), "type": 0, "name": "general", "position": 0}],
        "members": [{"user": user(BOT_ID, "bot"), "roles": []}]
    })
}

pub fn member_add(guild_id: u64, user_id: u64, username: &str) -> Value {
    json!({
        "guild_id": guild_id.to_string(),
        "user": user(user_id, username),
        "roles": []
    })
}
