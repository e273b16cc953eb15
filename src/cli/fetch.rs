use tracing::info;

use crate::cli::commands::{FetchArgs, FetchSource};
use crate::cli::{common_config, load_file_config, GlobalArgs};
use crate::db::open_configured;
use crate::errors::{ExploitDbError, RetryConfig};
use crate::fetcher::{fetch_awesome_poc, fetch_github_repos, FetchClient};

pub async fn handle_fetch(args: FetchArgs, globals: &GlobalArgs) -> Result<(), ExploitDbError> {
    let file = load_file_config(globals).await?;
    let common = common_config(&file, globals);
    let store = open_configured(&common).await?;

    let client = FetchClient::new(common.http_proxy.as_deref())?;
    let retry = RetryConfig::default();

    info!(source = args.source.as_str(), "Fetching exploits");
    let exploits = match args.source {
        FetchSource::AwesomePoc => fetch_awesome_poc(&client, &retry).await?,
        FetchSource::GithubRepos => fetch_github_repos(&client, &retry).await?,
    };

    info!(db = store.name(), count = exploits.len(), "Inserting exploits");
    let summary = store.insert_exploits(&exploits).await?;
    info!(
        source = args.source.as_str(),
        total = summary.total(),
        with_cve_id = summary.with_cve_id,
        without_cve_id = summary.without_cve_id,
        "Fetch complete"
    );
    Ok(())
}
