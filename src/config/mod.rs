//! Environment-backed configuration.
//!
//! Server settings have defaults and are overridden with `BATTLEGROUND_*`
//! environment variables. Chat backends come from `CHAT_BACKEND_*` variables and
//! have no defaults (see [`BackendProfiles`]).

pub mod backends;
pub mod error;


pub use backends::BackendProfiles;
pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_MIN_RELEVANCE_SCORE, DEFAULT_QUEUE_CAPACITY, DEFAULT_RETRIEVAL_TOP_K};
use crate::provider::types::OPENROUTER_BASE_URL;
use crate::vectordb::DEFAULT_COLLECTION_NAME;
use backends::optional;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BATTLEGROUND_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Minimum relevance score a retrieved chunk needs. Default: `0.35`.
    pub min_relevance_score: f32,

    /// Chunks requested from the vector store per question. Default: `5`.
    pub retrieval_top_k: u64,

    /// Bound on buffered, undelivered comparison events. Default: `64`.
    pub queue_capacity: usize,

    /// Per-side limit on silence between fragments. Default: none.
    pub side_idle_timeout: Option<Duration>,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding document chunks. Default: `documents`.
    pub collection: String,

    /// Embedding model used for retrieval queries.
    pub embed_model: String,

    /// Embedding API key. Retrieval is disabled when unset.
    pub embed_api_key: Option<String>,

    /// OpenAI-compatible embeddings base URL. Default: OpenRouter.
    pub embed_base_url: String,
}

/// Default Qdrant URL used when `BATTLEGROUND_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

pub const DEFAULT_EMBED_MODEL: &str = "openai/text-embedding-3-small";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            min_relevance_score: DEFAULT_MIN_RELEVANCE_SCORE,
            retrieval_top_k: DEFAULT_RETRIEVAL_TOP_K,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            side_idle_timeout: None,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            embed_api_key: None,
            embed_base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "BATTLEGROUND_PORT";
    const ENV_BIND_ADDR: &'static str = "BATTLEGROUND_BIND_ADDR";
    const ENV_MIN_RELEVANCE_SCORE: &'static str = "BATTLEGROUND_MIN_RELEVANCE_SCORE";
    const ENV_RETRIEVAL_TOP_K: &'static str = "BATTLEGROUND_RETRIEVAL_TOP_K";
    const ENV_QUEUE_CAPACITY: &'static str = "BATTLEGROUND_QUEUE_CAPACITY";
    const ENV_SIDE_IDLE_TIMEOUT_SECS: &'static str = "BATTLEGROUND_SIDE_IDLE_TIMEOUT_SECS";
    const ENV_QDRANT_URL: &'static str = "BATTLEGROUND_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "BATTLEGROUND_COLLECTION";
    const ENV_EMBED_MODEL: &'static str = "BATTLEGROUND_EMBED_MODEL";
    const ENV_EMBED_API_KEY: &'static str = "BATTLEGROUND_EMBED_API_KEY";
    const ENV_EMBED_BASE_URL: &'static str = "BATTLEGROUND_EMBED_BASE_URL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = Self::parse_port(&lookup, defaults.port)?;
        let bind_addr = Self::parse_bind_addr(&lookup, defaults.bind_addr)?;
        let min_relevance_score = Self::parse_number(
            &lookup,
            Self::ENV_MIN_RELEVANCE_SCORE,
            defaults.min_relevance_score,
        )?;
        let retrieval_top_k =
            Self::parse_number(&lookup, Self::ENV_RETRIEVAL_TOP_K, defaults.retrieval_top_k)?;
        let queue_capacity =
            Self::parse_number(&lookup, Self::ENV_QUEUE_CAPACITY, defaults.queue_capacity)?;
        let side_idle_timeout = optional(&lookup, Self::ENV_SIDE_IDLE_TIMEOUT_SECS)
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber {
                        name: Self::ENV_SIDE_IDLE_TIMEOUT_SECS.to_string(),
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            port,
            bind_addr,
            min_relevance_score,
            retrieval_top_k,
            queue_capacity,
            side_idle_timeout,
            qdrant_url: optional(&lookup, Self::ENV_QDRANT_URL).unwrap_or(defaults.qdrant_url),
            collection: optional(&lookup, Self::ENV_COLLECTION).unwrap_or(defaults.collection),
            embed_model: optional(&lookup, Self::ENV_EMBED_MODEL).unwrap_or(defaults.embed_model),
            embed_api_key: optional(&lookup, Self::ENV_EMBED_API_KEY),
            embed_base_url: optional(&lookup, Self::ENV_EMBED_BASE_URL)
                .unwrap_or(defaults.embed_base_url),
        })
    }

    /// Checks value ranges that parsing alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort {
                value: self.port.to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.min_relevance_score) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MIN_RELEVANCE_SCORE,
                value: self.min_relevance_score.to_string(),
                expected: "between 0 and 1",
            });
        }

        if self.retrieval_top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RETRIEVAL_TOP_K,
                value: "0".to_string(),
                expected: "at least 1",
            });
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_QUEUE_CAPACITY,
                value: "0".to_string(),
                expected: "at least 1",
            });
        }

        if self.side_idle_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SIDE_IDLE_TIMEOUT_SECS,
                value: "0".to_string(),
                expected: "at least 1 when set",
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Whether an embedding key is configured, enabling document retrieval.
    pub fn retrieval_enabled(&self) -> bool {
        self.embed_api_key.is_some()
    }

    fn parse_port<F>(lookup: &F, default: u16) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match optional(lookup, Self::ENV_PORT) {
            Some(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            None => Ok(default),
        }
    }

    fn parse_bind_addr<F>(lookup: &F, default: IpAddr) -> Result<IpAddr, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match optional(lookup, Self::ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            None => Ok(default),
        }
    }

    fn parse_number<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
    {
        match optional(lookup, name) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}
