use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::error::WarehouseError;
use crate::quote_ident;

/// A mart table and the file stem it is exported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MartTable {
    pub table: &'static str,
    pub export_name: &'static str,
}

impl MartTable {
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.export_name)
    }
}

/// Marts exported at the end of every run.
pub const MART_TABLES: [MartTable; 4] = [
    MartTable {
        table: "marts_daily_kpis",
        export_name: "daily_kpis",
    },
    MartTable {
        table: "marts_channel_performance",
        export_name: "channel_performance",
    },
    MartTable {
        table: "marts_customer_health",
        export_name: "customer_health",
    },
    MartTable {
        table: "marts_experiment_performance",
        export_name: "experiment_performance",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct ExportedTable {
    pub table: String,
    pub path: PathBuf,
    pub rows: u64,
}

/// Write every mart table to `<export_dir>/<name>.csv`.
pub async fn export_marts(
    conn: &mut SqliteConnection,
    export_dir: &Path,
) -> Result<Vec<ExportedTable>, WarehouseError> {
    std::fs::create_dir_all(export_dir)?;
    let mut exported = Vec::with_capacity(MART_TABLES.len());
    for mart in &MART_TABLES {
        let path = export_dir.join(mart.file_name());
        let rows = export_table(conn, mart.table, &path).await?;
        exported.push(ExportedTable {
            table: mart.table.to_string(),
            path,
            rows,
        });
    }
    Ok(exported)
}

/// Write one table as CSV: a header row, then all rows in insertion order.
///
/// NULL values become empty fields. Returns the number of data rows.
pub async fn export_table(
    conn: &mut SqliteConnection,
    table: &str,
    path: &Path,
) -> Result<u64, WarehouseError> {
    let columns: Vec<String> =
        sqlx::query_scalar("select name from pragma_table_info(?1) order by cid")
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;
    if columns.is_empty() {
        return Err(WarehouseError::Export(format!("table {table} does not exist")));
    }

    let select_list: Vec<String> = columns
        .iter()
        .map(|column| {
            let column = quote_ident(column);
            format!("cast({column} as text) as {column}")
        })
        .collect();
    let sql = format!(
        "select {} from {} order by rowid",
        select_list.join(", "),
        quote_ident(table)
    );
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in &rows {
        let mut record = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            let value: Option<String> = row.try_get(index)?;
            record.push(value.unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        event = "table_exported",
        table,
        path = %path.display(),
        rows = rows.len()
    );
    Ok(rows.len() as u64)
}
