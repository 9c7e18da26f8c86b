//! Configuration structs

mod client_config;

pub use client_config::{
    CacheSettings, ClientConfig, ConfigError, GatewaySettings, LogFormat, OutboundPolicy,
    ReconnectSettings, RestSettings, ShardSettings,
};
