//! Embedded SQLite warehouse: raw loading, staged SQL transforms and mart
//! export.

pub mod connection;
pub mod error;
pub mod export;
pub mod loader;
pub mod transform;

pub use connection::Warehouse;
pub use error::WarehouseError;
pub use export::{ExportedTable, MART_TABLES, MartTable, export_marts, export_table};
pub use loader::{LoadReport, load_raw_tables, load_table};
pub use transform::{BatchReport, TransformBatch, TransformStage, TransformUnit, UnitReport};

/// Quote an SQL identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
