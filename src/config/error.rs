//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A required environment variable was not set (or was blank).
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: String },

    /// A numeric variable could not be parsed.
    #[error("invalid number for environment variable {name}: {value}")]
    InvalidNumber { name: String, value: String },

    /// A value parsed but falls outside its allowed range.
    #[error("{name} must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A comma-separated list contained an empty entry.
    #[error("{name} contains empty value")]
    EmptyListValue { name: String },

    /// A comma-separated list repeated an entry.
    #[error("{name} must not contain duplicate {label}: {values}")]
    DuplicateValues {
        name: String,
        label: &'static str,
        values: String,
    },

    /// Backend ids are limited to ASCII letters, digits and underscores.
    #[error("CHAT_BACKEND_IDS contains invalid backend id: {backend_id}")]
    InvalidBackendId { backend_id: String },

    #[error("{name} must be one of: openrouter, openai, azure_openai (got '{value}')")]
    UnsupportedProvider { name: String, value: String },

    /// Azure deployment entries must be `model=deployment`.
    #[error("{name} must use model=deployment mapping entries: '{entry}'")]
    InvalidDeploymentEntry { name: String, entry: String },

    #[error("{name} missing model mappings for: {models}")]
    MissingDeployments { name: String, models: String },
}
