pub mod awesome_poc;
pub mod github_repos;
pub mod http;

pub use awesome_poc::fetch_awesome_poc;
pub use github_repos::fetch_github_repos;
pub use http::FetchClient;
