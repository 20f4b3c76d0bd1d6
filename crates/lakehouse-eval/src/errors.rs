use thiserror::Error;

/// Errors emitted by the quality gate.
#[derive(Debug, Error)]
pub enum QualityError {
    /// The check query itself could not be executed. This is not a FAIL.
    #[error("quality check '{check}' could not be evaluated: {source}")]
    Check {
        check: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
