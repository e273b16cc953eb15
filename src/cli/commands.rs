use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "exploitdb",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIMESTAMP"), ")"),
    about = "Collect exploit metadata and look it up by CVE identifier"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub globals: GlobalArgs,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Storage backend: sqlite3, mysql, postgres, redis (or relational-*/keyvalue)
    #[arg(long, global = true)]
    pub dbtype: Option<String>,

    /// SQLite file path or connection URL
    #[arg(long, global = true)]
    pub dbpath: Option<String>,

    /// Proxy for outbound HTTP requests
    #[arg(long, global = true)]
    pub http_proxy: Option<String>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write logs to exploitdb.log (and the server's access.log) in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log every SQL statement run against the relational backend
    #[arg(long, global = true)]
    pub debug_sql: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch exploits from a source and replace the stored set
    Fetch(FetchArgs),
    /// Look up stored exploits
    Search(SearchArgs),
    /// Start the HTTP lookup server
    Server(ServerArgs),
}

#[derive(Args, Clone, Debug)]
pub struct FetchArgs {
    #[command(subcommand)]
    pub source: FetchSource,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchSource {
    /// The awesome-cve-poc README
    AwesomePoc,
    /// GitHub repositories named after a CVE
    GithubRepos,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::AwesomePoc => "awesome-poc",
            FetchSource::GithubRepos => "github-repos",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    #[value(name = "CVE")]
    Cve,
    #[value(name = "ID")]
    Id,
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// What --param identifies
    #[arg(long = "type", value_enum, default_value = "CVE")]
    pub search_type: SearchType,

    /// CVE identifier or exploit unique id
    #[arg(long)]
    pub param: String,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ServerArgs {
    /// Listen address
    #[arg(long)]
    pub bind: Option<String>,

    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_globals() {
        let cli = Cli::try_parse_from([
            "exploitdb", "--dbtype", "redis", "--dbpath", "redis://localhost/0", "fetch", "awesome-poc", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.globals.dbtype.as_deref(), Some("redis"));
        assert_eq!(cli.globals.verbose, 2);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.source, FetchSource::AwesomePoc),
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_logging_globals() {
        let cli = Cli::try_parse_from([
            "exploitdb", "server", "--log-dir", "/var/log/exploitdb", "--debug-sql", "-q",
        ])
        .unwrap();
        assert_eq!(cli.globals.log_dir, Some(PathBuf::from("/var/log/exploitdb")));
        assert!(cli.globals.debug_sql);
        assert!(cli.globals.quiet);
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["exploitdb", "search", "--type", "ID", "--param", "AwesomePoc-x", "--json"]).unwrap();
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.search_type, SearchType::Id);
                assert_eq!(args.param, "AwesomePoc-x");
                assert!(args.json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_server_defaults_unset() {
        let cli = Cli::try_parse_from(["exploitdb", "server"]).unwrap();
        match cli.command {
            Commands::Server(args) => {
                assert!(args.bind.is_none());
                assert!(args.port.is_none());
            }
            _ => panic!("expected server"),
        }
    }

    #[test]
    fn test_rejects_unknown_search_type() {
        assert!(Cli::try_parse_from(["exploitdb", "search", "--type", "EDB", "--param", "1"]).is_err());
    }
}
