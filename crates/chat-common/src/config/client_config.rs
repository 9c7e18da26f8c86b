//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Everything except the token has a default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::Token;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: Token,
    pub gateway: GatewaySettings,
    pub rest: RestSettings,
    pub cache: CacheSettings,
    pub log_format: LogFormat,
}

/// Gateway connection settings
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub url: String,
    pub shard: ShardSettings,
    pub reconnect: ReconnectSettings,
    pub outbound: OutboundPolicy,
}

/// Which shards this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSettings {
    /// Run only this shard; `None` runs every shard in `0..count`
    pub id: Option<u32>,
    pub count: u32,
}

impl ShardSettings {
    /// Shard IDs to start
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        match self.id {
            Some(id) => vec![id],
            None => (0..self.count).collect(),
        }
    }
}

/// Backoff applied between connection attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectSettings {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Randomise each delay within `[delay / 2, delay]`
    pub jitter: bool,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(default_reconnect_base_ms()),
            max_delay: Duration::from_millis(default_reconnect_max_ms()),
            jitter: true,
        }
    }
}

/// What an outbound gateway command does while the shard is reconnecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundPolicy {
    /// Block until the session is ready again, up to a timeout
    WaitForReconnect { timeout: Duration },
    /// Fail once the shard has burned this many reconnect attempts
    FailAfter { attempts: u32 },
}

impl Default for OutboundPolicy {
    fn default() -> Self {
        Self::WaitForReconnect {
            timeout: Duration::from_secs(default_outbound_wait_secs()),
        }
    }
}

impl FromStr for OutboundPolicy {
    type Err = String;

    /// `wait`, `wait:<seconds>` or `fail:<attempts>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.trim().split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s.trim(), None),
        };
        match (kind.to_lowercase().as_str(), arg) {
            ("wait", None) => Ok(Self::default()),
            ("wait", Some(secs)) => secs
                .parse()
                .map(|secs| Self::WaitForReconnect {
                    timeout: Duration::from_secs(secs),
                })
                .map_err(|_| format!("invalid wait timeout: {secs}")),
            ("fail", Some(attempts)) => attempts
                .parse()
                .map(|attempts| Self::FailAfter { attempts })
                .map_err(|_| format!("invalid attempt budget: {attempts}")),
            _ => Err(format!("expected wait, wait:<secs> or fail:<attempts>, got {s}")),
        }
    }
}

/// HTTP settings
#[derive(Debug, Clone)]
pub struct RestSettings {
    pub api_base: String,
    pub timeout: Duration,
}

/// Cache policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Member count at which a guild counts as large
    pub large_threshold: u64,
    /// Messages kept in memory; zero disables the message cache
    pub max_messages: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            large_threshold: default_large_threshold(),
            max_messages: default_max_messages(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

// Default value functions
fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=6&encoding=json".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v6".to_string()
}

fn default_large_threshold() -> u64 {
    250
}

fn default_max_messages() -> usize {
    1000
}

fn default_reconnect_base_ms() -> u64 {
    1000
}

fn default_reconnect_max_ms() -> u64 {
    32_000
}

fn default_outbound_wait_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Configuration with defaults for everything but the token
    pub fn new(token: Token) -> Self {
        Self {
            token,
            gateway: GatewaySettings {
                url: default_gateway_url(),
                shard: ShardSettings { id: None, count: 1 },
                reconnect: ReconnectSettings::default(),
                outbound: OutboundPolicy::default(),
            },
            rest: RestSettings {
                api_base: default_api_base(),
                timeout: Duration::from_secs(default_request_timeout_secs()),
            },
            cache: CacheSettings::default(),
            log_format: LogFormat::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if the token is missing or any value fails to parse
    /// or validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("CHAT_TOKEN")
            .map(Token::new)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingVar("CHAT_TOKEN"))?;

        let config = Self {
            token,
            gateway: GatewaySettings {
                url: lookup("CHAT_GATEWAY_URL").unwrap_or_else(default_gateway_url),
                shard: ShardSettings {
                    id: parse_opt(&lookup, "CHAT_SHARD_ID")?,
                    count: parse_or(&lookup, "CHAT_SHARD_COUNT", 1)?,
                },
                reconnect: ReconnectSettings {
                    base_delay: Duration::from_millis(parse_or(
                        &lookup,
                        "CHAT_RECONNECT_BASE_MS",
                        default_reconnect_base_ms(),
                    )?),
                    max_delay: Duration::from_millis(parse_or(
                        &lookup,
                        "CHAT_RECONNECT_MAX_MS",
                        default_reconnect_max_ms(),
                    )?),
                    jitter: parse_or(&lookup, "CHAT_RECONNECT_JITTER", true)?,
                },
                outbound: parse_or(&lookup, "CHAT_OUTBOUND_POLICY", OutboundPolicy::default())?,
            },
            rest: RestSettings {
                api_base: lookup("CHAT_API_BASE").unwrap_or_else(default_api_base),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "CHAT_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs(),
                )?),
            },
            cache: CacheSettings {
                large_threshold: parse_or(
                    &lookup,
                    "CHAT_LARGE_THRESHOLD",
                    default_large_threshold(),
                )?,
                max_messages: parse_or(&lookup, "CHAT_MAX_MESSAGES", default_max_messages())?,
            },
            log_format: parse_or(&lookup, "CHAT_LOG_FORMAT", LogFormat::default())?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::MissingVar("CHAT_TOKEN"));
        }
        let shard = self.gateway.shard;
        if shard.count == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_SHARD_COUNT",
                "must be at least 1".to_string(),
            ));
        }
        if let Some(id) = shard.id {
            if id >= shard.count {
                return Err(ConfigError::InvalidValue(
                    "CHAT_SHARD_ID",
                    format!("{id} is not below shard count {}", shard.count),
                ));
            }
        }
        let reconnect = self.gateway.reconnect;
        if reconnect.base_delay.is_zero() || reconnect.max_delay < reconnect.base_delay {
            return Err(ConfigError::InvalidValue(
                "CHAT_RECONNECT_MAX_MS",
                "must be at least the non-zero base delay".to_string(),
            ));
        }
        if self.cache.large_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_LARGE_THRESHOLD",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_opt<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
        })
        .transpose()
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
