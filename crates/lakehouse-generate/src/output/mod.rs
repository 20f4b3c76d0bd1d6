//! Raw store writer: the generator's only I/O.

pub mod csv;

use std::path::Path;

use lakehouse_core::Dataset;
use lakehouse_core::schema::{RAW_EVENTS, RAW_PAYMENTS, RAW_SUPPORT_TICKETS, RAW_USERS};
use tracing::info;

use crate::errors::GenerationError;
use crate::model::TableReport;
use self::csv::{CsvRow, write_table_csv};

/// Write the four raw tables of a dataset into `raw_dir`, overwriting
/// previous files.
pub fn write_raw_tables(
    raw_dir: &Path,
    dataset: &Dataset,
) -> Result<Vec<TableReport>, GenerationError> {
    std::fs::create_dir_all(raw_dir)?;

    Ok(vec![
        write_one(raw_dir, &RAW_USERS, &dataset.users)?,
        write_one(raw_dir, &RAW_EVENTS, &dataset.events)?,
        write_one(raw_dir, &RAW_PAYMENTS, &dataset.payments)?,
        write_one(raw_dir, &RAW_SUPPORT_TICKETS, &dataset.tickets)?,
    ])
}

fn write_one<R: CsvRow>(
    raw_dir: &Path,
    spec: &lakehouse_core::RawTableSpec,
    rows: &[R],
) -> Result<TableReport, GenerationError> {
    let path = raw_dir.join(spec.file_name);
    let bytes_written = write_table_csv(&path, spec, rows)?;
    info!(
        table = spec.table,
        file = %path.display(),
        rows = rows.len(),
        bytes_written,
        "raw table written"
    );
    Ok(TableReport {
        table: spec.table.to_string(),
        file: spec.file_name.to_string(),
        rows: rows.len() as u64,
        bytes_written,
    })
}
