use thiserror::Error;

/// Main error type for kgeval
#[derive(Error, Debug)]
pub enum KgevalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// results.json and mapping file errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary factory/store persistence errors
    #[error("Binary encoding error: {0}")]
    Persist(#[from] bincode::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed triple files or mappings
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Entity label not present in the factory mapping
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Relation label not present in the factory mapping
    #[error("Relation not found: {0}")]
    RelationNotFound(String),

    /// Model name that is not one of the supported scoring models
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Metric name that is not one of the supported aggregate metrics
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Embedding matrix dimension mismatches
    #[error("Shape mismatch: {0}")]
    Shape(String),
}

/// Convenient Result type using KgevalError
pub type Result<T> = std::result::Result<T, KgevalError>;
