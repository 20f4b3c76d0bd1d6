use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::Connection;
use tracing::info;

use crate::error::WarehouseError;
use crate::quote_ident;

/// Files SQLite may keep next to the database file.
const COMPANION_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// A single open connection to the warehouse file.
///
/// Acquired once per run; [`Warehouse::close`] releases it. Dropping the
/// value also closes the connection.
#[derive(Debug)]
pub struct Warehouse {
    path: PathBuf,
    conn: SqliteConnection,
}

impl Warehouse {
    /// Open (creating if needed) the warehouse at `path`.
    ///
    /// With `reset`, the store file is deleted first so every table is
    /// rebuilt from scratch.
    pub async fn open(path: &Path, reset: bool) -> Result<Self, WarehouseError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        if reset {
            remove_store(path)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|source| WarehouseError::Connect {
                path: path.to_path_buf(),
                source,
            })?;

        info!(event = "warehouse_opened", path = %path.display(), reset);
        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub async fn table_exists(&mut self, table: &str) -> Result<bool, WarehouseError> {
        let count = sqlx::query_scalar::<_, i64>(
            "select count(*) from sqlite_master where type = 'table' and name = ?1",
        )
        .bind(table)
        .fetch_one(&mut self.conn)
        .await?;
        Ok(count > 0)
    }

    pub async fn row_count(&mut self, table: &str) -> Result<i64, WarehouseError> {
        let sql = format!("select count(*) from {}", quote_ident(table));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    /// Release the connection.
    pub async fn close(self) -> Result<(), WarehouseError> {
        self.conn.close().await?;
        info!(event = "warehouse_closed", path = %self.path.display());
        Ok(())
    }
}

fn remove_store(path: &Path) -> Result<(), WarehouseError> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in COMPANION_SUFFIXES {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        targets.push(PathBuf::from(name));
    }

    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => info!(event = "warehouse_reset", path = %target.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
