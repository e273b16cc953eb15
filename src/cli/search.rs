use std::sync::LazyLock;

use regex::Regex;

use crate::cli::commands::{SearchArgs, SearchType};
use crate::cli::{common_config, load_file_config, GlobalArgs};
use crate::db::open_configured;
use crate::errors::ExploitDbError;
use crate::utils::formatting::format_exploits;

static CVE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-[0-9]+-[0-9]+$").expect("CVE param pattern must compile"));

/// Reject malformed CVE parameters before touching storage.
pub fn validate_search(args: &SearchArgs) -> Result<(), ExploitDbError> {
    if args.param.is_empty() {
        return Err(ExploitDbError::Config("--param is required".into()));
    }
    if args.search_type == SearchType::Cve && !CVE_PARAM.is_match(&args.param) {
        return Err(ExploitDbError::Config(format!("Invalid CVE Param: {}", args.param)));
    }
    Ok(())
}

pub async fn handle_search(args: SearchArgs, globals: &GlobalArgs) -> Result<(), ExploitDbError> {
    validate_search(&args)?;

    let file = load_file_config(globals).await?;
    let common = common_config(&file, globals);
    let store = open_configured(&common).await?;

    let exploits = match args.search_type {
        SearchType::Cve => store.get_exploit_by_cve_id(&args.param).await?,
        SearchType::Id => store.get_exploit_by_id(&args.param).await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&exploits)?);
    } else {
        print!("{}", format_exploits(&exploits));
    }
    Ok(())
}
