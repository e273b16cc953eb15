use std::path::Path;

use tracing::info;

use crate::errors::ExploitDbError;
use super::types::{CommonConfig, FileConfig, ServerConfig};

pub async fn parse_config(path: &Path) -> Result<FileConfig, ExploitDbError> {
    if !path.exists() {
        return Err(ExploitDbError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(ExploitDbError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    info!(path = %path.display(), "Using config file");
    Ok(config)
}

pub fn parse_config_str(content: &str) -> Result<FileConfig, ExploitDbError> {
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(content)
        .map_err(|e| ExploitDbError::Config(format!("Invalid config file: {}", e)))
}

/// Command-line values win over the file, which wins over defaults.
pub fn resolve_common(
    file: &FileConfig,
    dbtype: Option<&str>,
    dbpath: Option<&str>,
    http_proxy: Option<&str>,
    debug_sql: bool,
) -> CommonConfig {
    let defaults = CommonConfig::default();
    CommonConfig {
        dbtype: dbtype
            .map(str::to_string)
            .or_else(|| file.dbtype.clone())
            .unwrap_or(defaults.dbtype),
        dbpath: dbpath
            .map(str::to_string)
            .or_else(|| file.dbpath.clone())
            .unwrap_or(defaults.dbpath),
        http_proxy: http_proxy
            .map(str::to_string)
            .or_else(|| file.http_proxy.clone())
            .filter(|p| !p.is_empty()),
        debug_sql: debug_sql || file.debug_sql.unwrap_or(defaults.debug_sql),
    }
}

pub fn resolve_server(file: &FileConfig, bind: Option<&str>, port: Option<u16>) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        bind: bind
            .map(str::to_string)
            .or_else(|| file.bind.clone())
            .unwrap_or(defaults.bind),
        port: port.or(file.port).unwrap_or(defaults.port),
    }
}
