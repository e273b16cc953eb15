use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::CommonConfig;
use crate::errors::ExploitDbError;
use super::connection::RdbStore;
use super::hash_store::{MemoryHashStore, RedisHashStore, MEMORY_SCHEME, REDIS_BACKEND};
use super::kv::KvStore;
use super::store::ExploitStore;

/// The closed set of storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    RelationalSqlite,
    RelationalMysql,
    RelationalPostgres,
    KeyValue,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::RelationalSqlite => "relational-sqlite",
            BackendKind::RelationalMysql => "relational-mysql",
            BackendKind::RelationalPostgres => "relational-postgres",
            BackendKind::KeyValue => "keyvalue",
        }
    }

    pub fn is_relational(&self) -> bool {
        !matches!(self, BackendKind::KeyValue)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ExploitDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relational-sqlite" | "sqlite3" | "sqlite" => Ok(BackendKind::RelationalSqlite),
            "relational-mysql" | "mysql" => Ok(BackendKind::RelationalMysql),
            "relational-postgres" | "postgres" => Ok(BackendKind::RelationalPostgres),
            "keyvalue" | "redis" => Ok(BackendKind::KeyValue),
            other => Err(ExploitDbError::Config(format!("Invalid database dialect, {}", other))),
        }
    }
}

/// Construct and migrate the backend named by `kind`, connected to `target`.
pub async fn open_store(kind: BackendKind, target: &str) -> Result<Arc<dyn ExploitStore>, ExploitDbError> {
    info!(db = %kind, "Opening Database.");
    match kind {
        BackendKind::RelationalSqlite => Ok(Arc::new(RdbStore::open(target)?)),
        BackendKind::RelationalMysql | BackendKind::RelationalPostgres => Err(ExploitDbError::Config(format!(
            "{} is not available in this build; use relational-sqlite or keyvalue",
            kind
        ))),
        BackendKind::KeyValue => {
            if target.starts_with(MEMORY_SCHEME) {
                return Ok(Arc::new(KvStore::new(REDIS_BACKEND, MemoryHashStore::new(target))));
            }
            let hashes = RedisHashStore::connect(target).await?;
            Ok(Arc::new(KvStore::new(REDIS_BACKEND, hashes)))
        }
    }
}

/// Validate `config` and open its backend, turning on SQL tracing when asked.
pub async fn open_configured(config: &CommonConfig) -> Result<Arc<dyn ExploitStore>, ExploitDbError> {
    let kind = config.validate()?;
    if kind != BackendKind::RelationalSqlite {
        if config.debug_sql {
            debug!(db = %kind, "SQL tracing only applies to the relational backend");
        }
        return open_store(kind, &config.dbpath).await;
    }

    info!(db = %kind, "Opening Database.");
    let store = RdbStore::open(&config.dbpath)?;
    store.set_sql_trace(config.debug_sql)?;
    Ok(Arc::new(store))
}

/// Parse a configuration string and open the matching backend.
pub async fn new_store(dbtype: &str, dbpath: &str) -> Result<Arc<dyn ExploitStore>, ExploitDbError> {
    let kind: BackendKind = dbtype.parse()?;
    open_store(kind, dbpath).await
}
