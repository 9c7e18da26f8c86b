//! HTTP dispatch gate
//!
//! Sends requests with reqwest and maps status codes onto [`GateError`].
//! This gate never retries: a 429 is returned with the wait the server
//! asked for and the caller decides what to do with it.

use std::time::Duration;

use async_trait::async_trait;
use chat_common::{ClientConfig, RestSettings, Token};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use crate::error::GateError;
use crate::gate::DispatchGate;
use crate::request::Request;
use crate::route::{Route, Verb};

const USER_AGENT: &str = concat!("chat-rest/", env!("CARGO_PKG_VERSION"));
const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

/// Fallback wait when a 429 carries no usable hint
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Gate that talks to the REST API directly
#[derive(Debug, Clone)]
pub struct HttpGate {
    client: Client,
    api_base: String,
    token: Token,
}

impl HttpGate {
    pub fn new(settings: &RestSettings, token: Token) -> Result<Self, GateError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GateError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, GateError> {
        Self::new(&config.rest, config.token.clone())
    }

    fn url(&self, route: &Route) -> String {
        format!("{}{}", self.api_base, route.path)
    }

    fn build(&self, request: Request) -> RequestBuilder {
        let method = match request.route.verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url(&request.route))
            .header(AUTHORIZATION, self.token.authorization_header());

        if !request.route.query.is_empty() {
            builder = builder.query(&request.route.query);
        }
        if let Some(reason) = request.reason.as_deref() {
            builder = builder.header(AUDIT_LOG_REASON, encode_reason(reason));
        }

        match (request.file, request.payload) {
            (Some(file), payload) => {
                let mut form =
                    Form::new().part("file", Part::bytes(file.data).file_name(file.filename));
                if let Some(payload) = payload {
                    form = form.text("payload_json", payload.to_string());
                }
                builder.multipart(form)
            }
            (None, Some(payload)) => builder.json(&payload),
            (None, None) => builder,
        }
    }
}

#[async_trait]
impl DispatchGate for HttpGate {
    async fn dispatch(&self, request: Request) -> Result<Value, GateError> {
        let route = request.route.to_string();
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| GateError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response
            .text()
            .await
            .map_err(|e| GateError::Transport(e.to_string()))?;

        let result = classify(status, retry_after.as_deref(), &body);
        match &result {
            Ok(_) => tracing::debug!(route = %route, status, "Request completed"),
            Err(e) => tracing::warn!(
                route = %route,
                status,
                category = %e.category(),
                error = %e,
                "Request failed"
            ),
        }
        result
    }
}

/// Map a finished response onto the gate contract
///
/// A 429 body states `retry_after` in milliseconds; the `Retry-After`
/// header, used when the body has none, is in seconds.
pub fn classify(status: u16, retry_after: Option<&str>, body: &str) -> Result<Value, GateError> {
    if (200..300).contains(&status) {
        if status == 204 || body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(body).map_err(|e| GateError::Other {
            status,
            message: format!("Invalid JSON body: {e}"),
        });
    }

    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| parsed.as_ref().and_then(|v| v.get(name));
    let message = field("message")
        .and_then(Value::as_str)
        .map_or_else(|| body.to_string(), String::from);

    Err(match status {
        403 => GateError::Forbidden { message },
        404 => GateError::NotFound { message },
        429 => {
            let from_body = field("retry_after")
                .and_then(Value::as_f64)
                .and_then(millis);
            let from_header = retry_after
                .and_then(|secs| secs.trim().parse::<f64>().ok())
                .and_then(|secs| millis(secs * 1000.0));
            GateError::RateLimited {
                retry_after: from_body.or(from_header).unwrap_or(DEFAULT_RETRY_AFTER),
                global: field("global").and_then(Value::as_bool).unwrap_or(false),
            }
        }
        500..=599 => GateError::ServerError { status, message },
        _ => GateError::Other { status, message },
    })
}

fn millis(ms: f64) -> Option<Duration> {
    (ms.is_finite() && ms >= 0.0).then(|| Duration::from_millis(ms.round() as u64))
}

/// Percent-encode an audit log reason so it fits in a header value
fn encode_reason(reason: &str) -> String {
    let mut encoded = String::with_capacity(reason.len());
    for byte in reason.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
