use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
    #[error("distribution error: {0}")]
    Distribution(String),
    #[error("generated dataset is inconsistent: {0}")]
    Dataset(#[from] lakehouse_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
