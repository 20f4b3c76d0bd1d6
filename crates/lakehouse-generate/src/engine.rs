use std::path::{Path, PathBuf};
use std::time::Instant;

use lakehouse_core::{Dataset, validate_dataset};
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::generators::{build_events, build_payments, build_tickets, build_users};
use crate::model::{GenerationReport, GeneratorConfig};
use crate::output::write_raw_tables;

/// File name of the report written next to the raw tables.
pub const GENERATION_REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub raw_dir: PathBuf,
    pub report_path: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for generating the synthetic dataset.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    config: GeneratorConfig,
}

impl GenerationEngine {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the four tables in memory and check their invariants.
    pub fn generate(&self) -> Result<Dataset, GenerationError> {
        self.config.validate()?;

        let users = build_users(&self.config)?;
        let events = build_events(&users, &self.config)?;
        let payments = build_payments(&users, &self.config)?;
        let tickets = build_tickets(&users, &self.config)?;

        let dataset = Dataset {
            users,
            events,
            payments,
            tickets,
        };
        validate_dataset(&dataset)?;
        Ok(dataset)
    }

    /// Generate the dataset and overwrite the raw files in `raw_dir`.
    pub fn run(&self, raw_dir: &Path) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(
            run_id = %run_id,
            seed = self.config.seed,
            n_users = self.config.n_users,
            days_back = self.config.days_back,
            "generation started"
        );

        let dataset = match self.generate() {
            Ok(dataset) => dataset,
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                return Err(err);
            }
        };

        let mut report = GenerationReport::new(run_id.clone(), &self.config);
        report.tables = write_raw_tables(raw_dir, &dataset)?;
        report.bytes_written = report.tables.iter().map(|table| table.bytes_written).sum();
        report.duration_ms = start.elapsed().as_millis() as u64;

        let report_path = raw_dir.join(GENERATION_REPORT_FILE);
        std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;

        info!(
            run_id = %run_id,
            users = dataset.users.len(),
            events = dataset.events.len(),
            payments = dataset.payments.len(),
            tickets = dataset.tickets.len(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            raw_dir: raw_dir.to_path_buf(),
            report_path,
            report,
        })
    }
}
