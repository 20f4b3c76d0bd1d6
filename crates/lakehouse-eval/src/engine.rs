use std::time::Instant;

use sqlx::sqlite::SqliteConnection;
use tracing::{info, warn};

use crate::checks::{QUALITY_CHECKS, QualityCheck};
use crate::errors::QualityError;
use crate::model::{CheckResult, CheckStatus, QualityReport};

/// Evaluates an ordered list of checks against the warehouse.
#[derive(Debug, Clone)]
pub struct QualityGate {
    checks: Vec<QualityCheck>,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(QUALITY_CHECKS.to_vec())
    }
}

impl QualityGate {
    pub fn new(checks: Vec<QualityCheck>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[QualityCheck] {
        &self.checks
    }

    /// Run every check in order. A FAIL never stops the remaining checks;
    /// a query that cannot be executed does.
    pub async fn evaluate(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<QualityReport, QualityError> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let fail_count = sqlx::query_scalar::<_, i64>(check.query)
                .fetch_one(&mut *conn)
                .await
                .map_err(|source| QualityError::Check {
                    check: check.name.to_string(),
                    source,
                })?;
            let status = CheckStatus::from_count(fail_count, check.max_fail_count);
            match status {
                CheckStatus::Pass => info!(
                    event = "quality_check",
                    check = check.name,
                    fail_count,
                    threshold = check.max_fail_count,
                    status = %status
                ),
                CheckStatus::Fail => warn!(
                    event = "quality_check",
                    check = check.name,
                    fail_count,
                    threshold = check.max_fail_count,
                    status = %status
                ),
            }
            results.push(CheckResult {
                check: check.name.to_string(),
                fail_count,
                threshold: check.max_fail_count,
                status,
            });
        }

        let report = QualityReport::new(results);
        info!(
            event = "quality_gate_finished",
            checks = report.results().len(),
            failed = report.failed_checks().len(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(report)
    }
}
