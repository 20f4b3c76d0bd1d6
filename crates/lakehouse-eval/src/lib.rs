//! Data quality gate: named checks evaluated against the warehouse, plus
//! JSON and Markdown reporting.

pub mod checks;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;

pub use checks::{QUALITY_CHECKS, QualityCheck};
pub use engine::QualityGate;
pub use errors::QualityError;
pub use model::{CheckResult, CheckStatus, QualityReport};
pub use report::{
    QUALITY_REPORT_JSON, QUALITY_REPORT_MD, QualityReportFiles, render_markdown,
    write_quality_report,
};
