use thiserror::Error;

/// Top-level error type for the advisor.
///
/// Covers the concerns shared by every crate: configuration, file I/O and
/// serialization. Chat-turn failures live in `advisor_chat::ChatError`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AdvisorError {
    fn from(err: toml::de::Error) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AdvisorError {
    fn from(err: toml::ser::Error) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
