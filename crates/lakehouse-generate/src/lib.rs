//! Deterministic synthetic data generation for the lakehouse pipeline.
//!
//! A single seed drives four isolated random streams (users, events,
//! payments, tickets) that produce referentially consistent, time-ordered
//! tables, written to the raw store as CSV.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{GenerationReport, GeneratorConfig, TableReport};
