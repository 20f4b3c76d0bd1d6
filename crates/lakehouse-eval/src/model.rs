use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    /// PASS iff `fail_count <= threshold`.
    pub fn from_count(fail_count: i64, threshold: i64) -> Self {
        if fail_count <= threshold {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: String,
    pub fail_count: i64,
    pub threshold: i64,
    pub status: CheckStatus,
}

/// Results of every check, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityReport {
    results: Vec<CheckResult>,
}

impl QualityReport {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn result(&self, check: &str) -> Option<&CheckResult> {
        self.results.iter().find(|result| result.check == check)
    }

    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|result| result.status == CheckStatus::Pass)
    }

    pub fn failed_checks(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|result| result.status == CheckStatus::Fail)
            .map(|result| result.check.as_str())
            .collect()
    }
}
