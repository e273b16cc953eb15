pub mod exploit;
pub mod github;

pub use exploit::{Document, Exploit, ExploitType, GitHubRepository, InsertSummary, OffensiveSecurity, ShellCode};
pub use github::{GitHubRepoItem, GitHubSearchPage};
