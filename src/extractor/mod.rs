pub mod awesome_poc;
pub mod cve_id;

pub use awesome_poc::{parse_awesome_poc, AwesomePocEntry, AwesomePocWalker, Node, WalkerState};
pub use cve_id::{extract_cve_ids, is_cve_id};
