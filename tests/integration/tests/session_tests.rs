//! Shard sessions against a fake gateway over a real WebSocket
//!
//! Run with: cargo test -p integration-tests --test session_tests

use chat_core::Snowflake;
use chat_gateway::protocol::GatewayMessage;
use chat_gateway::{GatewayError, SessionState};
use integration_tests::{
    eventually, fixtures::*, FakeGateway, GatewayPeer, TestShard, TEST_TOKEN,
};

const GUILD: u64 = 100;

fn guild_id() -> Snowflake {
    Snowflake::new(GUILD)
}

/// Connect, identify, and load one guild
async fn ready_shard(gateway: &mut FakeGateway) -> (TestShard, GatewayPeer) {
    let shard = TestShard::spawn(gateway.url());
    let mut peer = gateway.accept().await.unwrap();

    peer.open_session("session-1", &[GUILD]).await.unwrap();
    peer.dispatch("GUILD_CREATE", 2, guild(GUILD, "Rust")).await.unwrap();

    let cache = shard.cache.clone();
    eventually(|| cache.guild(guild_id()).is_some_and(|g| !g.unavailable))
        .await
        .unwrap();
    (shard, peer)
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_ready_and_guild_create() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let shard = TestShard::spawn(gateway.url());
    let mut peer = gateway.accept().await.unwrap();

    let identify = peer.open_session("session-1", &[GUILD]).await.unwrap();
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert_eq!(identify["d"]["shard"], serde_json::json!([0, 1]));

    shard.handle.wait_until_ready().await.unwrap();
    assert_eq!(shard.handle.status().state, SessionState::Ready);
    assert_eq!(shard.cache.current_user().unwrap().id, Snowflake::new(BOT_ID));

    peer.dispatch("GUILD_CREATE", 2, guild(GUILD, "Rust")).await.unwrap();
    let cache = shard.cache.clone();
    eventually(|| cache.guild(guild_id()).is_some_and(|g| g.name == "Rust"))
        .await
        .unwrap();
    assert!(shard.cache.channel(Snowflake::new(GUILD + 1)).is_some());

    let stopped = shard.stop().await.unwrap();
    assert!(stopped.is_ok());
    assert_eq!(peer.expect_close().await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_heartbeat_request_is_answered_with_last_seq() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (shard, mut peer) = ready_shard(&mut gateway).await;

    // A server-side heartbeat request is op 1 with no sequence
    peer.send(&GatewayMessage::heartbeat(None)).await.unwrap();
    let beat = peer.expect_op(1).await.unwrap();
    assert_eq!(beat["d"], 2);

    shard.stop().await.unwrap().unwrap();
}

// ============================================================================
// Recovery
// ============================================================================

#[tokio::test]
async fn test_dropped_connection_resumes_and_keeps_cache() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (shard, peer) = ready_shard(&mut gateway).await;
    drop(peer);

    let mut peer = gateway.accept().await.unwrap();
    peer.send(&GatewayMessage::hello(HEARTBEAT_INTERVAL_MS)).await.unwrap();
    let resume = peer.expect_op(6).await.unwrap();
    assert_eq!(resume["d"]["session_id"], "session-1");
    assert_eq!(resume["d"]["seq"], 2);
    assert_eq!(resume["d"]["token"], TEST_TOKEN);

    // Cached state survives the drop
    assert!(shard.cache.guild(guild_id()).is_some_and(|g| !g.unavailable));

    peer.dispatch("RESUMED", 3, serde_json::json!({})).await.unwrap();
    peer.dispatch("GUILD_MEMBER_ADD", 4, member_add(GUILD, 2, "ferris"))
        .await
        .unwrap();

    let cache = shard.cache.clone();
    eventually(|| cache.member(guild_id(), Snowflake::new(2)).is_some())
        .await
        .unwrap();
    assert_eq!(shard.handle.status().state, SessionState::Ready);

    shard.stop().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_invalid_session_reidentifies_and_purges() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (shard, mut peer) = ready_shard(&mut gateway).await;

    peer.send(&GatewayMessage::invalid_session(false)).await.unwrap();
    let identify = peer.expect_op(2).await.unwrap();
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert!(shard.cache.guild(guild_id()).is_none());

    peer.dispatch("READY", 1, ready("session-2", &[GUILD])).await.unwrap();
    peer.dispatch("GUILD_CREATE", 2, guild(GUILD, "Rust again")).await.unwrap();

    let cache = shard.cache.clone();
    eventually(|| cache.guild(guild_id()).is_some_and(|g| g.name == "Rust again"))
        .await
        .unwrap();

    shard.stop().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_reconnect_request_resumes() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let (shard, mut peer) = ready_shard(&mut gateway).await;

    peer.send(&GatewayMessage::reconnect()).await.unwrap();
    assert_eq!(peer.expect_close().await.unwrap(), Some(4000));

    let mut peer = gateway.accept().await.unwrap();
    peer.send(&GatewayMessage::hello(HEARTBEAT_INTERVAL_MS)).await.unwrap();
    let resume = peer.expect_op(6).await.unwrap();
    assert_eq!(resume["d"]["session_id"], "session-1");

    shard.stop().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_authentication_failure_is_fatal() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let shard = TestShard::spawn(gateway.url());
    let mut peer = gateway.accept().await.unwrap();

    peer.send(&GatewayMessage::hello(HEARTBEAT_INTERVAL_MS)).await.unwrap();
    peer.expect_op(2).await.unwrap();
    peer.close(4004).await.unwrap();

    let result = tokio::time::timeout(integration_tests::STEP_TIMEOUT, shard.task)
        .await
        .unwrap()
        .unwrap();
    let err = result.unwrap_err();
    assert!(matches!(err, GatewayError::FatalClose(_)));
    assert!(err.is_fatal());
}
