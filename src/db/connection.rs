use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::errors::ExploitDbError;
use crate::utils::logging::SQL_LOG_TARGET;

pub const SQLITE_BACKEND: &str = "sqlite3";

/// Relational exploit store backed by SQLite.
pub struct RdbStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
    target: String,
}

impl RdbStore {
    pub fn open(path: &str) -> Result<Self, ExploitDbError> {
        if path.is_empty() {
            return Err(ExploitDbError::Config("SQLite database path must not be empty".into()));
        }
        if path == ":memory:" {
            return Self::in_memory();
        }

        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| sqlite_error(path, "Failed to open database", e))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| sqlite_error(path, "Failed to set pragmas", e))?;

        let store = Self { conn: Arc::new(Mutex::new(conn)), target: path.to_string() };
        store.initialize()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, ExploitDbError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| sqlite_error(":memory:", "Failed to open in-memory db", e))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| sqlite_error(":memory:", "Failed to set pragmas", e))?;
        let store = Self { conn: Arc::new(Mutex::new(conn)), target: ":memory:".to_string() };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), ExploitDbError> {
        let conn = self.lock()?;
        conn.execute_batch(super::schema::CREATE_TABLES)
            .map_err(|e| sqlite_error(&self.target, "Failed to create tables", e))?;
        Ok(())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Log every statement this connection runs.
    pub fn set_sql_trace(&self, enabled: bool) -> Result<(), ExploitDbError> {
        let mut conn = self.lock()?;
        conn.trace(if enabled { Some(log_sql as fn(&str)) } else { None });
        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, ExploitDbError> {
        self.conn
            .lock()
            .map_err(|_| ExploitDbError::Internal("SQLite connection lock poisoned".into()))
    }
}

fn log_sql(sql: &str) {
    info!(target: SQL_LOG_TARGET, sql, "SQL");
}

impl Clone for RdbStore {
    fn clone(&self) -> Self {
        Self { conn: self.conn.clone(), target: self.target.clone() }
    }
}

/// Busy/locked databases are transient; everything else is a data error.
pub(crate) fn sqlite_error(target: &str, context: &str, e: rusqlite::Error) -> ExploitDbError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => ExploitDbError::connection(
            SQLITE_BACKEND,
            target,
            format!("{} (database is locked, close other connections first): {}", context, e),
        ),
        Some(ErrorCode::CannotOpen) => {
            ExploitDbError::connection(SQLITE_BACKEND, target, format!("{}: {}", context, e))
        }
        _ => ExploitDbError::Database(format!("{}: {}", context, e)),
    }
}
