use std::path::PathBuf;

use lakehouse_eval::QualityError;
use lakehouse_generate::GenerationError;
use lakehouse_warehouse::WarehouseError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::stage::PipelineStage;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),
    #[error("quality error: {0}")]
    Quality(#[from] QualityError),
    /// Raised only when the run halts on failed checks.
    #[error("quality checks failed: {}", .failed_checks.join(", "))]
    QualityGate { failed_checks: Vec<String> },
    #[error("warehouse not found at {}", .0.display())]
    MissingWarehouse(PathBuf),
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn at(stage: PipelineStage, source: impl Into<PipelineError>) -> Self {
        PipelineError::Stage {
            stage,
            source: Box::new(source.into()),
        }
    }

    /// State in which the run aborted, if known.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error without its stage tag.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
