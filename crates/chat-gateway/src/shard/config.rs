//! Per-shard settings

use chat_common::{ClientConfig, OutboundPolicy, ReconnectSettings, Token};

use crate::protocol::PresenceUpdatePayload;

/// Everything one shard needs to connect and identify
#[derive(Debug, Clone)]
pub struct ShardConfig {
    pub shard_id: u32,
    pub shard_count: u32,
    pub url: String,
    pub token: Token,
    /// Sent on identify; the gateway omits offline members above it
    pub large_threshold: u64,
    pub reconnect: ReconnectSettings,
    pub outbound: OutboundPolicy,
    /// Presence set on identify
    pub presence: Option<PresenceUpdatePayload>,
}

impl ShardConfig {
    /// Single-shard configuration with default policies
    pub fn new(url: impl Into<String>, token: Token) -> Self {
        let mut config = Self::from_client(&ClientConfig::new(token), 0);
        config.url = url.into();
        config
    }

    /// Settings for one shard of a client configuration
    pub fn from_client(config: &ClientConfig, shard_id: u32) -> Self {
        Self {
            shard_id,
            shard_count: config.gateway.shard.count,
            url: config.gateway.url.clone(),
            token: config.token.clone(),
            large_threshold: config.cache.large_threshold,
            reconnect: config.gateway.reconnect,
            outbound: config.gateway.outbound,
            presence: None,
        }
    }

    #[must_use]
    pub fn with_shard(mut self, shard_id: u32, shard_count: u32) -> Self {
        self.shard_id = shard_id;
        self.shard_count = shard_count;
        self
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectSettings) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn with_outbound(mut self, outbound: OutboundPolicy) -> Self {
        self.outbound = outbound;
        self
    }

    #[must_use]
    pub fn with_presence(mut self, presence: PresenceUpdatePayload) -> Self {
        self.presence = Some(presence);
        self
    }
}
