//! Error types for finroute

use thiserror::Error;

/// Result type alias using FinRouteError
pub type Result<T> = std::result::Result<T, FinRouteError>;

/// Error type alias for convenience
pub type Error = FinRouteError;

/// Process exit codes reported by the CLI
pub mod exit_codes {
    pub const GENERAL_ERROR: u8 = 1;
    pub const NOT_FOUND: u8 = 2;
    pub const INVALID_INPUT: u8 = 3;
}

/// Main error type for finroute
#[derive(Debug, Error)]
pub enum FinRouteError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl FinRouteError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CollectionNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            FinRouteError::InvalidInput("empty".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            FinRouteError::CollectionNotFound("posts".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            FinRouteError::Llm("boom".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
