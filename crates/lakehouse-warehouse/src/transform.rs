use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use tracing::{info, warn};

use crate::error::WarehouseError;

/// Ordered transformation batch of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStage {
    /// Raw tables to cleaned staging tables.
    Staging,
    /// Staging tables to aggregated mart tables.
    Marts,
}

impl TransformStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformStage::Staging => "staging",
            TransformStage::Marts => "marts",
        }
    }
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named script; all of its statements run as a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformUnit {
    pub name: String,
    pub path: Option<PathBuf>,
    pub sql: String,
}

impl TransformUnit {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            sql: sql.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stage: TransformStage,
    pub units: Vec<UnitReport>,
    pub duration_ms: u64,
}

/// Scripts of one stage, resolved once in execution order.
#[derive(Debug, Clone)]
pub struct TransformBatch {
    stage: TransformStage,
    units: Vec<TransformUnit>,
}

impl TransformBatch {
    pub fn new(stage: TransformStage, units: Vec<TransformUnit>) -> Self {
        Self { stage, units }
    }

    /// Resolve the `*.sql` files of `dir` in lexical file name order.
    pub fn discover(stage: TransformStage, dir: &Path) -> Result<Self, WarehouseError> {
        let discovery_error = |message: String| WarehouseError::Discovery { stage, message };

        let entries = std::fs::read_dir(dir)
            .map_err(|err| discovery_error(format!("{}: {err}", dir.display())))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| discovery_error(format!("{}: {err}", dir.display())))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
                paths.push(path);
            }
        }
        paths.sort_by(|left, right| left.file_name().cmp(&right.file_name()));

        let mut units = Vec::with_capacity(paths.len());
        for path in paths {
            let sql = std::fs::read_to_string(&path)
                .map_err(|err| discovery_error(format!("{}: {err}", path.display())))?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            units.push(TransformUnit {
                name,
                path: Some(path),
                sql,
            });
        }

        if units.is_empty() {
            warn!(event = "transform_batch_empty", stage = %stage, dir = %dir.display());
        }
        Ok(Self { stage, units })
    }

    pub fn stage(&self) -> TransformStage {
        self.stage
    }

    pub fn units(&self) -> &[TransformUnit] {
        &self.units
    }

    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|unit| unit.name.as_str()).collect()
    }

    /// Run every unit in order, committing each before the next starts.
    ///
    /// The first failing unit aborts the batch; units committed before it
    /// stay in place.
    pub async fn execute(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<BatchReport, WarehouseError> {
        let batch_start = Instant::now();
        let mut reports = Vec::with_capacity(self.units.len());

        for unit in &self.units {
            let start = Instant::now();
            let script_error = |source: sqlx::Error| WarehouseError::ScriptExecution {
                stage: self.stage,
                unit: unit.name.clone(),
                source,
            };

            let mut tx = conn.begin().await.map_err(script_error)?;
            sqlx::raw_sql(&unit.sql)
                .execute(&mut *tx)
                .await
                .map_err(script_error)?;
            tx.commit().await.map_err(script_error)?;

            let duration_ms = start.elapsed().as_millis() as u64;
            info!(
                event = "transform_unit_finished",
                stage = %self.stage,
                unit = %unit.name,
                duration_ms
            );
            reports.push(UnitReport {
                name: unit.name.clone(),
                duration_ms,
            });
        }

        Ok(BatchReport {
            stage: self.stage,
            units: reports,
            duration_ms: batch_start.elapsed().as_millis() as u64,
        })
    }
}
