use std::path::PathBuf;

use thiserror::Error;

use crate::transform::TransformStage;

/// Errors emitted by the warehouse layer.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("failed to open warehouse at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
    /// A raw file is missing or malformed; nothing of the table was loaded.
    #[error("failed to load {table}: {message}")]
    Load { table: String, message: String },
    #[error("failed to resolve {stage} scripts: {message}")]
    Discovery {
        stage: TransformStage,
        message: String,
    },
    /// A transformation script failed; later scripts were not run.
    #[error("{stage} script '{unit}' failed: {source}")]
    ScriptExecution {
        stage: TransformStage,
        unit: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("export failed: {0}")]
    Export(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl WarehouseError {
    pub(crate) fn load(table: &str, message: impl Into<String>) -> Self {
        WarehouseError::Load {
            table: table.to_string(),
            message: message.into(),
        }
    }
}
