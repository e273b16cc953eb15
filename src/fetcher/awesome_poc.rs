use tracing::info;

use crate::errors::{with_retry, ExploitDbError, RetryConfig};
use crate::extractor::parse_awesome_poc;
use crate::models::Exploit;
use super::http::FetchClient;

pub const AWESOME_POC_README_URL: &str =
    "https://raw.githubusercontent.com/qazbnm456/awesome-cve-poc/master/README.md";

/// Turn the README body into one record per distinct entry.
pub fn records_from_readme(readme: &[u8]) -> Vec<Exploit> {
    let markdown = String::from_utf8_lossy(readme);
    parse_awesome_poc(&markdown)
        .into_iter()
        .map(|poc| Exploit::awesome_poc(&poc.cve_id, &poc.description, &poc.url))
        .collect()
}

pub async fn fetch_awesome_poc(client: &FetchClient, retry: &RetryConfig) -> Result<Vec<Exploit>, ExploitDbError> {
    let readme = with_retry("fetch awesome-cve-poc", retry, || client.fetch(AWESOME_POC_README_URL)).await?;
    let exploits = records_from_readme(&readme);
    info!(count = exploits.len(), "Awesome Poc Exploit");
    Ok(exploits)
}
