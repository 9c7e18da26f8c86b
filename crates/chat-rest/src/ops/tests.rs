use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chat_cache::{Cache, CacheConfig};
use chat_core::events::GuildPayload;
use chat_core::{ChannelKind, Patch};
use parking_lot::Mutex;

use super::*;
use crate::error::GateError;
use crate::route::Verb;

const GUILD: Snowflake = Snowflake::new(100);
const ADMIN: Snowflake = Snowflake::new(101);
const GENERAL: Snowflake = Snowflake::new(200);

/// Gate that records requests and answers from a script
#[derive(Default)]
struct RecordingGate {
    requests: Mutex<Vec<Request>>,
    responses: Mutex<VecDeque<Result<Value, GateError>>>,
}

impl RecordingGate {
    fn answering(responses: impl IntoIterator<Item = Result<Value, GateError>>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().collect()),
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DispatchGate for RecordingGate {
    async fn dispatch(&self, request: Request) -> Result<Value, GateError> {
        self.requests.lock().push(request);
        self.responses.lock().pop_front().unwrap_or(Ok(Value::Null))
    }
}

fn role(id: u64, name: &str, position: i32) -> Value {
    json!({"id": id.to_string(), "name": name, "position": position, "permissions": "0"})
}

fn ops(gate: &Arc<RecordingGate>) -> GuildOps {
    let cache = Cache::shared(CacheConfig::default());
    let guild: GuildPayload = serde_json::from_value(json!({
        "id": GUILD.to_string(),
        "name": "Rust",
        "owner_id": "1",
        "member_count": 1,
        "roles": [role(100, "@everyone", 0), role(101, "Admin", 1)],
        "channels": [{"id": "200", "type": 0, "name": "general", "position": 0}],
        "members": [{"user": {"id": "1", "username": "owner", "discriminator": "0001"}, "roles": ["101"]}]
    }))
    .unwrap();
    cache.apply(DispatchEvent::GuildCreate(Box::new(guild)));
    GuildOps::new(Arc::clone(gate) as Arc<dyn DispatchGate>, cache)
}

#[tokio::test]
async fn test_create_role_reconciles_into_cache() {
    let gate = RecordingGate::answering([Ok(role(103, "Helper", 9))]);
    let ops = ops(&gate);

    let params = RoleParams::named("Helper").mentionable(true);
    let created = ops.create_role(GUILD, &params, Some("new staff")).await.unwrap();

    assert_eq!(created.id, Snowflake::new(103));
    assert_eq!(created.guild_id, GUILD);
    assert_eq!(created.position, 1);
    assert_eq!(ops.cache().role(GUILD, ADMIN).unwrap().position, 2);

    let sent = gate.requests();
    assert_eq!(sent[0].route, Route::create_role(GUILD));
    assert_eq!(sent[0].payload, Some(json!({"name": "Helper", "mentionable": true})));
    assert_eq!(sent[0].reason.as_deref(), Some("new staff"));

    // The gateway echo of the same create changes nothing
    let echo = serde_json::from_value(role(103, "Helper", 1)).unwrap();
    ops.cache().apply(DispatchEvent::RoleCreate(RoleEvent {
        guild_id: GUILD,
        role: echo,
    }));
    assert_eq!(ops.cache().guild(GUILD).unwrap().roles.len(), 3);
    assert_eq!(ops.cache().role(GUILD, ADMIN).unwrap().position, 2);
}

#[tokio::test]
async fn test_delete_role_removes_it() {
    let gate = RecordingGate::answering([Ok(Value::Null)]);
    let ops = ops(&gate);

    ops.delete_role(GUILD, ADMIN, None).await.unwrap();

    assert!(ops.cache().role(GUILD, ADMIN).is_none());
    assert_eq!(gate.requests()[0].route.verb, Verb::Delete);
}

#[tokio::test]
async fn test_everyone_role_cannot_be_deleted() {
    let gate = RecordingGate::answering([]);
    let ops = ops(&gate);

    let err = ops.delete_role(GUILD, GUILD, None).await.unwrap_err();
    assert!(matches!(err, RestError::Domain(_)));
    assert!(gate.requests().is_empty());
}

#[tokio::test]
async fn test_failed_request_leaves_cache_alone() {
    let gate = RecordingGate::answering([Err(GateError::RateLimited {
        retry_after: Duration::from_secs(3),
        global: false,
    })]);
    let ops = ops(&gate);

    let err = ops.delete_role(GUILD, ADMIN, None).await.unwrap_err();

    assert!(matches!(
        err,
        RestError::Gate(GateError::RateLimited { retry_after, .. }) if retry_after == Duration::from_secs(3)
    ));
    assert!(ops.cache().role(GUILD, ADMIN).is_some());
    assert_eq!(gate.requests().len(), 1);
}

#[tokio::test]
async fn test_ban_validates_days() {
    let gate = RecordingGate::answering([Ok(Value::Null)]);
    let ops = ops(&gate);
    let user = Snowflake::new(2);

    assert!(ops.ban(GUILD, user, 8, None).await.is_err());
    assert!(gate.requests().is_empty());

    ops.ban(GUILD, user, 7, Some("spam")).await.unwrap();
    assert_eq!(gate.requests()[0].route, Route::ban(GUILD, user, 7));
}

#[tokio::test]
async fn test_bans_decode() {
    let gate = RecordingGate::answering([Ok(json!([
        {"user": {"id": "2", "username": "spammer", "discriminator": "6666"}, "reason": "ads"},
        {"user": {"id": "3", "username": "troll", "discriminator": "1234"}, "reason": null}
    ]))]);
    let ops = ops(&gate);

    let bans = ops.bans(GUILD).await.unwrap();
    assert_eq!(bans.len(), 2);
    assert_eq!(bans[0].reason.as_deref(), Some("ads"));
    assert_eq!(bans[1].user.username, "troll");
    assert!(bans[1].reason.is_none());
}

#[tokio::test]
async fn test_ban_entry_for_one_user() {
    let gate = RecordingGate::answering([
        Ok(json!({"user": {"id": "2", "username": "spammer", "discriminator": "6666"}, "reason": "ads"})),
        Err(GateError::NotFound {
            message: "Unknown Ban".into(),
        }),
    ]);
    let ops = ops(&gate);

    let entry = ops.ban_entry(GUILD, Snowflake::new(2)).await.unwrap();
    assert_eq!(entry.user.id, Snowflake::new(2));
    assert_eq!(entry.reason.as_deref(), Some("ads"));
    assert_eq!(gate.requests()[0].route, Route::get_ban(GUILD, Snowflake::new(2)));

    let missing = ops.ban_entry(GUILD, Snowflake::new(3)).await.unwrap_err();
    assert!(matches!(missing, RestError::Gate(GateError::NotFound { .. })));
}

#[tokio::test]
async fn test_prune_counts() {
    let gate = RecordingGate::answering([Ok(json!({"pruned": 4})), Ok(json!({"pruned": 2}))]);
    let ops = ops(&gate);

    assert_eq!(ops.estimate_pruned_members(GUILD, 30).await.unwrap(), 4);
    assert_eq!(ops.prune_members(GUILD, 30, None).await.unwrap(), 2);
    assert!(ops.prune_members(GUILD, 0, None).await.is_err());

    let sent = gate.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].route.verb, Verb::Get);
    assert_eq!(sent[1].route.verb, Verb::Post);
}

#[tokio::test]
async fn test_create_and_delete_channel() {
    let created = json!({"id": "300", "type": 2, "guild_id": "100", "name": "Lounge", "position": 1, "bitrate": 64000});
    let gate = RecordingGate::answering([Ok(created.clone()), Ok(created)]);
    let ops = ops(&gate);

    let channel = ops
        .create_channel(GUILD, &CreateChannel::voice("Lounge").bitrate(64000), None)
        .await
        .unwrap();
    assert_eq!(channel.kind(), ChannelKind::Voice);
    assert_eq!(ops.cache().channel(Snowflake::new(300)).unwrap().name(), "Lounge");

    ops.delete_channel(Snowflake::new(300), None).await.unwrap();
    assert!(ops.cache().channel(Snowflake::new(300)).is_none());
}

#[tokio::test]
async fn test_invalid_channel_is_not_sent() {
    let gate = RecordingGate::answering([]);
    let ops = ops(&gate);

    let err = ops
        .create_channel(GUILD, &CreateChannel::voice("Lounge").topic("chat"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Domain(_)));
    assert!(gate.requests().is_empty());
}

#[tokio::test]
async fn test_edit_guild_updates_cache() {
    let gate = RecordingGate::answering([Ok(json!({
        "id": "100",
        "name": "Rustaceans",
        "owner_id": "1",
        "icon": null,
        "roles": [],
        "features": []
    }))]);
    let ops = ops(&gate);

    let edit = EditGuild {
        name: Some("Rustaceans".into()),
        icon: Patch::Null,
        ..EditGuild::default()
    };
    let guild = ops.edit_guild(GUILD, &edit, None).await.unwrap().unwrap();

    assert_eq!(guild.name, "Rustaceans");
    assert_eq!(gate.requests()[0].payload, Some(json!({"name": "Rustaceans", "icon": null})));
}

#[tokio::test]
async fn test_leave_guild_drops_it() {
    let gate = RecordingGate::answering([Ok(Value::Null)]);
    let ops = ops(&gate);

    ops.leave_guild(GUILD).await.unwrap();

    assert!(ops.cache().guild(GUILD).is_none());
    assert!(ops.cache().channel(GENERAL).is_none());
}

#[tokio::test]
async fn test_delete_guild_drops_it() {
    let gate = RecordingGate::answering([Ok(Value::Null)]);
    let ops = ops(&gate);

    ops.delete_guild(GUILD).await.unwrap();

    assert!(ops.cache().guild(GUILD).is_none());
    assert_eq!(gate.requests()[0].route, Route::delete_guild(GUILD));
}

#[tokio::test]
async fn test_create_custom_emoji() {
    let gate = RecordingGate::answering([
        Ok(json!({"id": "700", "name": "ferris", "roles": ["101"]})),
        Ok(json!({"id": "701", "name": "crab"})),
    ]);
    let ops = ops(&gate);
    let png = b"\x89PNG\r\n\x1a\nrest";

    let emoji = ops
        .create_custom_emoji(GUILD, "ferris", png, &[ADMIN], Some("mascot"))
        .await
        .unwrap();
    assert_eq!(emoji.guild_id, GUILD);
    assert_eq!(ops.cache().emoji(Snowflake::new(700)).map(|e| e.roles), Some(vec![ADMIN]));

    let sent = &gate.requests()[0];
    assert_eq!(sent.route, Route::create_emoji(GUILD));
    let payload = sent.payload.as_ref().unwrap();
    assert_eq!(payload["name"], "ferris");
    assert_eq!(payload["roles"], json!(["101"]));
    assert!(payload["image"].as_str().unwrap().starts_with("data:image/png;base64,"));

    // A second upload keeps the first in the cache
    ops.create_custom_emoji(GUILD, "crab", png, &[], None).await.unwrap();
    assert_eq!(ops.cache().guild_emojis(GUILD).len(), 2);
    assert!(gate.requests()[1].payload.as_ref().unwrap().get("roles").is_none());

    assert!(ops.create_custom_emoji(GUILD, "x", png, &[], None).await.is_err());
    assert!(ops.create_custom_emoji(GUILD, "text", b"plain", &[], None).await.is_err());
    assert_eq!(gate.requests().len(), 2);
}

#[tokio::test]
async fn test_send_message_with_attachment() {
    let gate = RecordingGate::answering([Ok(json!({
        "id": "500",
        "channel_id": "200",
        "guild_id": "100",
        "author": {"id": "1", "username": "owner", "discriminator": "0001"},
        "content": "see attached",
        "timestamp": "2020-01-01T00:00:00+00:00"
    }))]);
    let ops = ops(&gate);

    let message = ops
        .send_message(GENERAL, "see attached", Some(File::new("log.txt", "boom")))
        .await
        .unwrap();

    assert_eq!(message.id, Snowflake::new(500));
    assert!(ops.cache().message(Snowflake::new(500)).is_some());

    let sent = gate.requests();
    assert_eq!(sent[0].file.as_ref().map(|f| f.filename.as_str()), Some("log.txt"));
    assert_eq!(sent[0].payload, Some(json!({"content": "see attached"})));

    assert!(ops.send_message(GENERAL, "", None).await.is_err());
    let too_long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
    assert!(ops.send_message(GENERAL, &too_long, None).await.is_err());
}
