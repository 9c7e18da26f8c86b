//! Integration test utilities
//!
//! A fake gateway served over a real WebSocket on localhost, plus the
//! payloads a scripted session needs.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
