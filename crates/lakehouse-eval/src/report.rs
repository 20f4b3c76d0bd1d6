use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::QualityError;
use crate::model::QualityReport;

pub const QUALITY_REPORT_JSON: &str = "quality_report.json";
pub const QUALITY_REPORT_MD: &str = "quality_report.md";

#[derive(Debug, Clone)]
pub struct QualityReportFiles {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Render the report as a Markdown table, one row per check.
pub fn render_markdown(report: &QualityReport) -> String {
    let mut lines = vec![
        "# Quality Report".to_string(),
        String::new(),
        "| Check | Fail Count | Threshold | Status |".to_string(),
        "|---|---:|---:|---|".to_string(),
    ];
    for result in report.results() {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            result.check, result.fail_count, result.threshold, result.status
        ));
    }
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Write `quality_report.json` and `quality_report.md` into `dir`.
pub fn write_quality_report(
    dir: &Path,
    report: &QualityReport,
) -> Result<QualityReportFiles, QualityError> {
    std::fs::create_dir_all(dir)?;
    let json_path = dir.join(QUALITY_REPORT_JSON);
    let markdown_path = dir.join(QUALITY_REPORT_MD);

    std::fs::write(&json_path, serde_json::to_string_pretty(report)?)?;
    std::fs::write(&markdown_path, render_markdown(report))?;

    info!(
        event = "quality_report_written",
        json = %json_path.display(),
        markdown = %markdown_path.display()
    );
    Ok(QualityReportFiles {
        json_path,
        markdown_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckResult, CheckStatus};

    #[test]
    fn markdown_has_one_row_per_check() {
        let report = QualityReport::new(vec![
            CheckResult {
                check: "duplicate_user_ids".to_string(),
                fail_count: 0,
                threshold: 0,
                status: CheckStatus::Pass,
            },
            CheckResult {
                check: "daily_kpi_not_empty".to_string(),
                fail_count: 1,
                threshold: 0,
                status: CheckStatus::Fail,
            },
        ]);

        let rendered = render_markdown(&report);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "# Quality Report");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[4], "| duplicate_user_ids | 0 | 0 | PASS |");
        assert_eq!(lines[5], "| daily_kpi_not_empty | 1 | 0 | FAIL |");
    }

    #[test]
    fn empty_report_renders_header_only() {
        let rendered = render_markdown(&QualityReport::default());
        assert_eq!(rendered.lines().count(), 4);
    }
}
