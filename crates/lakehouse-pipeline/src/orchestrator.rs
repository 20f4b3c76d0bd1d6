use std::path::Path;
use std::time::Instant;

use lakehouse_eval::{QualityGate, QualityReport, QualityReportFiles, write_quality_report};
use lakehouse_generate::{GenerationEngine, GenerationReport, GenerationResult};
use lakehouse_warehouse::{
    BatchReport, ExportedTable, LoadReport, TransformBatch, TransformStage, Warehouse,
    export_marts, load_raw_tables,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stage::PipelineStage;

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub duration_ms: u64,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: String,
    pub generation: GenerationReport,
    pub loads: Vec<LoadReport>,
    pub batches: Vec<BatchReport>,
    pub quality: QualityReport,
    pub quality_files: QualityReportFiles,
    pub exported: Vec<ExportedTable>,
    pub timings: Vec<StageTiming>,
}

/// Runs the fixed state sequence for one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every state in order. The first error aborts the run and is
    /// returned tagged with the state it happened in.
    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut tracker = StageTracker::new(run_id.clone());
        info!(
            event = "pipeline_started",
            run_id = %run_id,
            data_dir = %self.config.paths.data_dir.display(),
            sql_dir = %self.config.paths.sql_dir.display(),
            halt_on_quality_failure = self.config.pipeline.halt_on_quality_failure
        );

        let staging = TransformBatch::discover(TransformStage::Staging, &self.config.staging_dir())
            .map_err(|err| tracker.fail_at(PipelineStage::Staging, err))?;
        let marts = TransformBatch::discover(TransformStage::Marts, &self.config.marts_dir())
            .map_err(|err| tracker.fail_at(PipelineStage::Marts, err))?;

        tracker.enter(PipelineStage::Generate);
        let generation = self
            .config
            .generator_config()
            .map_err(PipelineError::from)
            .and_then(|config| {
                GenerationEngine::new(config)
                    .run(&self.config.raw_dir())
                    .map_err(PipelineError::from)
            })
            .map_err(|err| tracker.fail(err))?;
        tracker.finish();

        tracker.enter(PipelineStage::Connect);
        let mut warehouse = Warehouse::open(
            &self.config.warehouse_path(),
            self.config.pipeline.reset_database,
        )
        .await
        .map_err(|err| tracker.fail(err))?;
        tracker.finish();

        let result = self
            .run_in_warehouse(&mut warehouse, &mut tracker, &staging, &marts)
            .await;
        let closed = warehouse.close().await;

        let stages = match (result, closed) {
            (Ok(parts), Ok(())) => parts,
            (Ok(_), Err(err)) => return Err(tracker.fail(err)),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(event = "warehouse_close_failed", error = %close_err);
                }
                return Err(err);
            }
        };
        tracker.finish();

        info!(
            event = "pipeline_finished",
            run_id = %run_id,
            status = "success",
            quality_passed = stages.quality.passed(),
            "{}",
            PipelineStage::Done.description()
        );

        Ok(PipelineOutcome {
            run_id,
            generation: generation.report,
            loads: stages.loads,
            batches: stages.batches,
            quality: stages.quality,
            quality_files: stages.quality_files,
            exported: stages.exported,
            timings: tracker.timings,
        })
    }

    /// Load through Export; the caller owns opening and closing.
    async fn run_in_warehouse(
        &self,
        warehouse: &mut Warehouse,
        tracker: &mut StageTracker,
        staging: &TransformBatch,
        marts: &TransformBatch,
    ) -> Result<WarehouseStages, PipelineError> {
        tracker.enter(PipelineStage::Load);
        let loads = load_raw_tables(warehouse.connection(), &self.config.raw_dir())
            .await
            .map_err(|err| tracker.fail(err))?;
        tracker.finish();

        let mut batches = Vec::with_capacity(2);
        for (stage, batch) in [(PipelineStage::Staging, staging), (PipelineStage::Marts, marts)] {
            tracker.enter(stage);
            batches.push(
                batch
                    .execute(warehouse.connection())
                    .await
                    .map_err(|err| tracker.fail(err))?,
            );
            tracker.finish();
        }

        tracker.enter(PipelineStage::QualityGate);
        let quality = QualityGate::default()
            .evaluate(warehouse.connection())
            .await
            .map_err(|err| tracker.fail(err))?;
        if !quality.passed() {
            let failed_checks: Vec<String> = quality
                .failed_checks()
                .into_iter()
                .map(str::to_string)
                .collect();
            if self.config.pipeline.halt_on_quality_failure {
                return Err(tracker.fail(PipelineError::QualityGate { failed_checks }));
            }
            warn!(
                event = "quality_checks_failed",
                failed = %failed_checks.join(","),
                "continuing to export"
            );
        }
        tracker.finish();

        tracker.enter(PipelineStage::Export);
        let export_dir = self.config.export_dir();
        let quality_files =
            write_quality_report(&export_dir, &quality).map_err(|err| tracker.fail(err))?;
        let exported = export_marts(warehouse.connection(), &export_dir)
            .await
            .map_err(|err| tracker.fail(err))?;

        Ok(WarehouseStages {
            loads,
            batches,
            quality,
            quality_files,
            exported,
        })
    }

    /// Generate and write the raw tables only, into `out_dir` or the
    /// configured raw directory.
    pub fn generate(&self, out_dir: Option<&Path>) -> Result<GenerationResult, PipelineError> {
        let raw_dir = out_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.raw_dir());
        let engine = GenerationEngine::new(self.config.generator_config()?);
        Ok(engine.run(&raw_dir)?)
    }

    /// Evaluate the quality checks against the existing warehouse.
    pub async fn check(&self) -> Result<QualityReport, PipelineError> {
        let path = self.config.warehouse_path();
        if !path.is_file() {
            return Err(PipelineError::MissingWarehouse(path));
        }
        let mut warehouse = Warehouse::open(&path, false).await?;
        let result = QualityGate::default()
            .evaluate(warehouse.connection())
            .await;
        warehouse.close().await?;
        Ok(result?)
    }
}

struct WarehouseStages {
    loads: Vec<LoadReport>,
    batches: Vec<BatchReport>,
    quality: QualityReport,
    quality_files: QualityReportFiles,
    exported: Vec<ExportedTable>,
}

struct StageTracker {
    run_id: String,
    current: PipelineStage,
    started: Instant,
    timings: Vec<StageTiming>,
}

impl StageTracker {
    fn new(run_id: String) -> Self {
        Self {
            run_id,
            current: PipelineStage::Generate,
            started: Instant::now(),
            timings: Vec::with_capacity(PipelineStage::STEPS.len()),
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.current = stage;
        self.started = Instant::now();
        let step = stage.step().unwrap_or(PipelineStage::STEPS.len());
        info!(
            event = "stage_started",
            run_id = %self.run_id,
            stage = %stage,
            "[{step}/{}] {}",
            PipelineStage::STEPS.len(),
            stage.description()
        );
    }

    fn finish(&mut self) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        info!(
            event = "stage_finished",
            run_id = %self.run_id,
            stage = %self.current,
            duration_ms
        );
        self.timings.push(StageTiming {
            stage: self.current,
            duration_ms,
        });
    }

    fn fail(&self, err: impl Into<PipelineError>) -> PipelineError {
        self.fail_at(self.current, err)
    }

    fn fail_at(&self, stage: PipelineStage, err: impl Into<PipelineError>) -> PipelineError {
        let err = err.into();
        error!(
            event = "pipeline_aborted",
            run_id = %self.run_id,
            stage = %stage,
            error = %err
        );
        PipelineError::at(stage, err)
    }
}
