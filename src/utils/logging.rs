//! Subscriber setup: console output plus optional log files.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::errors::ExploitDbError;

pub const APP_LOG_FILE: &str = "exploitdb.log";
pub const ACCESS_LOG_FILE: &str = "access.log";
/// Target of per-request server events. Only the access log receives them.
pub const ACCESS_LOG_TARGET: &str = "exploitdb::access";
/// Target of statement traces from the relational backend.
pub const SQL_LOG_TARGET: &str = "exploitdb::sql";

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: u8,
    pub quiet: bool,
    pub log_json: bool,
    pub no_color: bool,
    pub log_dir: Option<PathBuf>,
}

/// `--quiet` wins over `RUST_LOG`, which wins over the `-v` count.
pub fn filter_directive(quiet: bool, verbose: u8, rust_log: Option<&str>) -> String {
    if quiet {
        return "error".to_string();
    }
    if let Some(directive) = rust_log.filter(|d| !d.trim().is_empty()) {
        return directive.to_string();
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Filter for everything except the access log.
pub fn build_filter(directive: &str) -> EnvFilter {
    let with_access_off = format!("{},{}=off", directive, ACCESS_LOG_TARGET);
    EnvFilter::try_new(&with_access_off)
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}=off", ACCESS_LOG_TARGET)))
}

fn open_append(path: &Path) -> Result<File, ExploitDbError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExploitDbError::Config(format!("Failed to open log file {}: {}", path.display(), e)))
}

/// `exploitdb.log` gets what `filter` lets through; `access.log` gets request events only.
pub fn file_layers(dir: &Path, filter: EnvFilter) -> Result<Vec<BoxedLayer>, ExploitDbError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ExploitDbError::Config(format!("Failed to create log directory {}: {}", dir.display(), e)))?;

    let app = fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(open_append(&dir.join(APP_LOG_FILE))?))
        .with_filter(filter)
        .boxed();
    let access = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(open_append(&dir.join(ACCESS_LOG_FILE))?))
        .with_filter(Targets::new().with_target(ACCESS_LOG_TARGET, Level::INFO))
        .boxed();
    Ok(vec![app, access])
}

/// Install the global subscriber. Quiet mode silences the console only; log
/// files keep the regular level.
pub fn init_logging(opts: &LogOptions) -> Result<(), ExploitDbError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let console_filter = build_filter(&filter_directive(opts.quiet, opts.verbose, rust_log.as_deref()));

    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let console: BoxedLayer = if opts.log_json {
        console.json().with_filter(console_filter).boxed()
    } else {
        console.with_ansi(!opts.no_color).with_filter(console_filter).boxed()
    };

    let mut layers = vec![console];
    if let Some(dir) = &opts.log_dir {
        let file_filter = build_filter(&filter_directive(false, opts.verbose, rust_log.as_deref()));
        layers.extend(file_layers(dir, file_filter)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| ExploitDbError::Internal(format!("Failed to install logger: {}", e)))
}
