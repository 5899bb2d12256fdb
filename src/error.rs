use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Construction Errors
    #[error("Price service requires at least one configured source")]
    NoSources,

    #[error("Invalid undercut factor: {0} (must be finite and > 0)")]
    InvalidFactor(f64),

    #[error("Unknown price source: {0}")]
    UnknownSource(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Source Errors
    #[error("Price source {source_name} failed: {message}")]
    SourceFailed {
        source_name: String,
        message: String,
    },

    // Persistence Errors
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
