//! Dispatch gate contract
//!
//! A gate takes one request, waits out whatever throttling the route needs,
//! and hands back the parsed body or a typed failure. Callers never retry on
//! their own; a `RateLimited` answer carries the wait the server asked for.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GateError;
use crate::request::Request;

#[async_trait]
pub trait DispatchGate: Send + Sync {
    /// Send the request and return the response body
    ///
    /// Empty bodies come back as `Value::Null`.
    async fn dispatch(&self, request: Request) -> Result<Value, GateError>;
}
