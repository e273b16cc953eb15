use chrono::Datelike;
use tracing::{info, warn};

use crate::errors::{with_retry, ExploitDbError, RetryConfig};
use crate::extractor::extract_cve_ids;
use crate::models::{Exploit, GitHubSearchPage};
use super::http::FetchClient;

pub const FIRST_CVE_YEAR: i32 = 1999;
pub const PER_PAGE: u64 = 100;
/// GitHub search exposes at most 1000 results per query.
pub const MAX_PAGES: u64 = 10;

pub fn search_url(year: i32, page: u64) -> String {
    format!(
        "https://api.github.com/search/repositories?q=CVE%20{}+in:name&page={}&per_page={}",
        year, page, PER_PAGE
    )
}

/// Number of pages worth requesting for a query with `total_count` hits.
pub fn page_count(total_count: u64) -> u64 {
    (total_count / PER_PAGE + 1).min(MAX_PAGES)
}

/// Parse one search page. Repositories whose name carries no CVE id are
/// skipped; a name with several ids yields one record per id.
pub fn records_from_search_page(body: &[u8]) -> Result<(Vec<Exploit>, u64), ExploitDbError> {
    let page: GitHubSearchPage = serde_json::from_slice(body)
        .map_err(|e| ExploitDbError::Serialization(format!("Failed to parse GitHub search result: {}", e)))?;

    let mut exploits = Vec::new();
    for repo in &page.items {
        let description = repo.description.clone().unwrap_or_default();
        for cve_id in extract_cve_ids(repo.full_name.as_bytes()) {
            exploits.push(Exploit::github_repository(
                &cve_id,
                &description,
                &repo.html_url,
                repo.stargazers_count,
                repo.forks_count,
            ));
        }
    }
    Ok((exploits, page.total_count))
}

pub async fn fetch_github_repos(client: &FetchClient, retry: &RetryConfig) -> Result<Vec<Exploit>, ExploitDbError> {
    let mut exploits = Vec::new();
    for year in FIRST_CVE_YEAR..=chrono::Utc::now().year() {
        info!(year, "Fetching GitHub Repository");
        let mut max_page = MAX_PAGES;
        let mut page = 1;
        while page <= max_page {
            let url = search_url(year, page);
            let body = with_retry("fetch github search", retry, || client.fetch(&url)).await?;
            let (found, total_count) = records_from_search_page(&body)?;
            exploits.extend(found);

            if page == 1 {
                if total_count > PER_PAGE * MAX_PAGES {
                    warn!(year, total_count, "More than 1000 results can not be acquired due to GitHub search limits");
                }
                max_page = page_count(total_count);
            }
            page += 1;
        }
    }
    info!(count = exploits.len(), "GitHub Repos Exploit");
    Ok(exploits)
}
