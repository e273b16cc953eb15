use serde::Deserialize;

/// One page of the GitHub repository search API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubRepoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepoItem {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
}
