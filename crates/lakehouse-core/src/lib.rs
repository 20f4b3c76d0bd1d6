//! Core contracts shared across the lakehouse crates.
//!
//! This crate defines the generated entity rows, the raw table layouts used by
//! the raw store and the warehouse loader, and dataset invariant checks.

pub mod entities;
pub mod error;
pub mod schema;
pub mod validation;

pub use entities::{
    AcquisitionChannel, CompanySize, Country, Dataset, Event, EventType, ExperimentExposure,
    ExperimentVariant, Feature, InvoiceType, Payment, PaymentStatus, PlanTier, Severity, Ticket,
    User,
};
pub use error::{Error, Result};
pub use schema::{ColumnKind, ColumnSpec, RAW_TABLES, RawTableSpec};
pub use validation::validate_dataset;

/// Text layout for every timestamp written to raw files and the warehouse.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
