//! Configuration and the linear run orchestrator:
//! generate, connect, load, staging, marts, quality gate, export.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod stage;

pub use config::{ConfigError, PathSettings, PipelineConfig, PipelineSettings};
pub use error::PipelineError;
pub use orchestrator::{Pipeline, PipelineOutcome, StageTiming};
pub use stage::PipelineStage;
