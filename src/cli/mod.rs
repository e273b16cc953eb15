pub mod commands;
pub mod fetch;
pub mod search;
pub mod serve;

pub use commands::{Cli, Commands, GlobalArgs};

use std::path::Path;

use crate::config::{parse_config, resolve_common, CommonConfig, FileConfig};
use crate::errors::ExploitDbError;

/// Read the optional config file named by `--config`.
pub async fn load_file_config(globals: &GlobalArgs) -> Result<FileConfig, ExploitDbError> {
    match &globals.config {
        Some(path) => parse_config(Path::new(path)).await,
        None => Ok(FileConfig::default()),
    }
}

pub fn common_config(file: &FileConfig, globals: &GlobalArgs) -> CommonConfig {
    resolve_common(
        file,
        globals.dbtype.as_deref(),
        globals.dbpath.as_deref(),
        globals.http_proxy.as_deref(),
        globals.debug_sql,
    )
}
