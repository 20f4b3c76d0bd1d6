use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;
use lakehouse_core::{ColumnKind, RAW_TABLES, RawTableSpec, TIMESTAMP_FORMAT};
use serde::Serialize;
use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::error::WarehouseError;
use crate::quote_ident;

/// Outcome of loading one raw table.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub rows: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Load every raw table from `raw_dir`, replacing existing tables.
pub async fn load_raw_tables(
    conn: &mut SqliteConnection,
    raw_dir: &Path,
) -> Result<Vec<LoadReport>, WarehouseError> {
    let mut reports = Vec::with_capacity(RAW_TABLES.len());
    for spec in &RAW_TABLES {
        reports.push(load_table(conn, spec, &raw_dir.join(spec.file_name)).await?);
    }
    Ok(reports)
}

/// Load one raw file into its table.
///
/// The whole file is parsed before the warehouse is touched, and the table
/// is dropped, recreated and filled in one transaction.
pub async fn load_table(
    conn: &mut SqliteConnection,
    spec: &RawTableSpec,
    path: &Path,
) -> Result<LoadReport, WarehouseError> {
    let start = Instant::now();
    let rows = read_rows(spec, path)?;

    let table = quote_ident(spec.table);
    let column_defs: Vec<String> = spec
        .columns
        .iter()
        .map(|column| {
            let not_null = if column.nullable { "" } else { " NOT NULL" };
            format!(
                "{} {}{}",
                quote_ident(column.name),
                column.kind.sql_type(),
                not_null
            )
        })
        .collect();
    let column_names: Vec<String> = spec
        .columns
        .iter()
        .map(|column| quote_ident(column.name))
        .collect();
    let placeholders = vec!["?"; spec.columns.len()].join(", ");
    let insert_sql = format!(
        "insert into {table} ({}) values ({placeholders})",
        column_names.join(", ")
    );

    let mut tx = conn.begin().await?;
    sqlx::query(&format!("drop table if exists {table}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("create table {table} ({})", column_defs.join(", ")))
        .execute(&mut *tx)
        .await?;
    for row in &rows {
        let mut query = sqlx::query(&insert_sql);
        for value in row {
            query = match value {
                RawValue::Null => query.bind(None::<String>),
                RawValue::Integer(value) => query.bind(*value),
                RawValue::Real(value) => query.bind(*value),
                RawValue::Text(value) => query.bind(value.as_str()),
            };
        }
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    let report = LoadReport {
        table: spec.table.to_string(),
        rows: rows.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        event = "raw_table_loaded",
        table = spec.table,
        rows = report.rows,
        duration_ms = report.duration_ms
    );
    Ok(report)
}

fn read_rows(spec: &RawTableSpec, path: &Path) -> Result<Vec<Vec<RawValue>>, WarehouseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| WarehouseError::load(spec.table, format!("{}: {err}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|err| WarehouseError::load(spec.table, err.to_string()))?
        .clone();
    let expected = spec.header();
    if !headers.iter().eq(expected.iter().copied()) {
        return Err(WarehouseError::load(
            spec.table,
            format!(
                "header mismatch: expected [{}], found [{}]",
                expected.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = record
            .map_err(|err| WarehouseError::load(spec.table, format!("line {line}: {err}")))?;
        if record.len() != spec.columns.len() {
            return Err(WarehouseError::load(
                spec.table,
                format!(
                    "line {line}: expected {} fields, found {}",
                    spec.columns.len(),
                    record.len()
                ),
            ));
        }

        let mut values = Vec::with_capacity(spec.columns.len());
        for (column, field) in spec.columns.iter().zip(record.iter()) {
            let value = parse_field(column.kind, field).map_err(|message| {
                WarehouseError::load(
                    spec.table,
                    format!("line {line}, column {}: {message}", column.name),
                )
            })?;
            if value == RawValue::Null && !column.nullable {
                return Err(WarehouseError::load(
                    spec.table,
                    format!("line {line}, column {}: missing value", column.name),
                ));
            }
            values.push(value);
        }
        rows.push(values);
    }
    Ok(rows)
}

fn parse_field(kind: ColumnKind, field: &str) -> Result<RawValue, String> {
    if field.is_empty() {
        return Ok(RawValue::Null);
    }
    match kind {
        ColumnKind::Integer => field
            .parse::<i64>()
            .map(RawValue::Integer)
            .map_err(|_| format!("invalid integer '{field}'")),
        ColumnKind::Real => field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(RawValue::Real)
            .ok_or_else(|| format!("invalid number '{field}'")),
        ColumnKind::Text => Ok(RawValue::Text(field.to_string())),
        ColumnKind::Timestamp => NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT)
            .map(|_| RawValue::Text(field.to_string()))
            .map_err(|_| format!("invalid timestamp '{field}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_is_null() {
        assert_eq!(parse_field(ColumnKind::Integer, ""), Ok(RawValue::Null));
    }

    #[test]
    fn parses_typed_fields() {
        assert_eq!(parse_field(ColumnKind::Integer, "42"), Ok(RawValue::Integer(42)));
        assert_eq!(parse_field(ColumnKind::Real, "49.90"), Ok(RawValue::Real(49.9)));
        assert_eq!(
            parse_field(ColumnKind::Timestamp, "2024-01-02 03:04:05"),
            Ok(RawValue::Text("2024-01-02 03:04:05".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(parse_field(ColumnKind::Integer, "4.5").is_err());
        assert!(parse_field(ColumnKind::Real, "NaN").is_err());
        assert!(parse_field(ColumnKind::Timestamp, "yesterday").is_err());
    }
}
