use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MultiCveRequest {
    pub cve_ids: Vec<String>,
}
