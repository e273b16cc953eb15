use clap::Parser;
use exploitdb::cli::{self, Cli};
use exploitdb::errors::ExploitDbError;
use exploitdb::utils::logging::{init_logging, LogOptions};
use exploitdb::utils::progress::set_progress_hidden;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            ExploitDbError::Config(_) => 2,
            ExploitDbError::Connection { .. } => 3,
            ExploitDbError::Unsupported { .. } => 4,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> Result<(), ExploitDbError> {
    let globals = &cli.globals;
    init_logging(&LogOptions {
        verbose: globals.verbose,
        quiet: globals.quiet,
        log_json: globals.log_json,
        no_color: globals.no_color,
        log_dir: globals.log_dir.clone(),
    })?;
    set_progress_hidden(globals.quiet);

    match cli.command {
        cli::Commands::Fetch(args) => cli::fetch::handle_fetch(args, globals).await,
        cli::Commands::Search(args) => cli::search::handle_search(args, globals).await,
        cli::Commands::Server(args) => cli::serve::handle_serve(args, globals).await,
    }
}
