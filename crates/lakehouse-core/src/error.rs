use thiserror::Error;

/// Core error type shared across lakehouse crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A dataset breaks one of the entity invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    /// A label does not belong to the expected categorical domain.
    #[error("unknown {domain} label: {value}")]
    UnknownLabel { domain: &'static str, value: String },
}

/// Convenience alias for results returned by lakehouse crates.
pub type Result<T> = std::result::Result<T, Error>;
