use serde::{Deserialize, Serialize};

use crate::db::BackendKind;
use crate::errors::ExploitDbError;

pub const DEFAULT_DBTYPE: &str = "sqlite3";
pub const DEFAULT_DBPATH: &str = "./exploitdb.sqlite3";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1326;

/// Values read from the optional YAML configuration file. Every key is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub dbtype: Option<String>,
    pub dbpath: Option<String>,
    pub http_proxy: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub debug_sql: Option<bool>,
}

/// Settings shared by every command, after file and command-line merging.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonConfig {
    pub dbtype: String,
    pub dbpath: String,
    pub http_proxy: Option<String>,
    /// Log every SQL statement the relational backend runs.
    pub debug_sql: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            dbtype: DEFAULT_DBTYPE.to_string(),
            dbpath: DEFAULT_DBPATH.to_string(),
            http_proxy: None,
            debug_sql: false,
        }
    }
}

impl CommonConfig {
    /// Check the backend selection before anything is opened.
    pub fn validate(&self) -> Result<BackendKind, ExploitDbError> {
        let kind: BackendKind = self.dbtype.parse()?;
        if self.dbpath.trim().is_empty() {
            return Err(ExploitDbError::Config(format!("dbpath must be set for the {} backend", kind)));
        }
        if kind == BackendKind::RelationalSqlite && self.dbpath.contains('\0') {
            return Err(ExploitDbError::Config(format!("SQLite path is not a valid file path: {:?}", self.dbpath)));
        }
        if kind.is_relational() && kind != BackendKind::RelationalSqlite && !self.dbpath.contains("://") {
            return Err(ExploitDbError::Config(format!(
                "{} expects a connection URL, got {}",
                kind, self.dbpath
            )));
        }
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string(), port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
