//! Client logging
//!
//! Libraries only emit `tracing` events; the binary picks the subscriber
//! from [`crate::LogFormat`].

mod tracing_setup;

pub use tracing_setup::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
