//! # chat-common
//!
//! Shared utilities: client configuration, the bot credential, the error
//! taxonomy every crate maps onto, and telemetry setup.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::Token;
pub use config::{
    CacheSettings, ClientConfig, ConfigError, GatewaySettings, LogFormat, OutboundPolicy,
    ReconnectSettings, RestSettings, ShardSettings,
};
pub use error::ErrorCategory;
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
