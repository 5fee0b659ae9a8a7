use thiserror::Error;

/// Error type that captures configuration and ingestion failures.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
