//! # chat-rest
//!
//! Outbound half of the client. Requests go through a [`DispatchGate`],
//! which owns throttling and transport; [`GuildOps`] builds the requests and
//! folds successful responses back into the cache.

pub mod error;
pub mod gate;
pub mod http;
pub mod image;
pub mod ops;
pub mod request;
pub mod route;

pub use error::{GateError, RestError, RestResult};
pub use gate::DispatchGate;
pub use http::HttpGate;
pub use ops::{BanEntry, CreateChannel, EditGuild, GuildOps, RoleParams};
pub use request::{File, Request};
pub use route::{Route, Verb};
