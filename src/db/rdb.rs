use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ExploitDbError;
use crate::models::{Exploit, InsertSummary};
use super::connection::{RdbStore, SQLITE_BACKEND};
use super::store::ExploitStore;

#[async_trait]
impl ExploitStore for RdbStore {
    fn name(&self) -> &str {
        SQLITE_BACKEND
    }

    async fn insert_exploits(&self, exploits: &[Exploit]) -> Result<InsertSummary, ExploitDbError> {
        self.replace_exploits(exploits)
    }

    async fn get_exploit_by_id(&self, exploit_unique_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        self.find_by_unique_id(exploit_unique_id)
    }

    async fn get_exploit_by_cve_id(&self, cve_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        self.find_by_cve_id(cve_id)
    }

    async fn get_exploit_multi_by_cve_id(
        &self,
        cve_ids: &[String],
    ) -> Result<HashMap<String, Vec<Exploit>>, ExploitDbError> {
        self.find_by_cve_ids(cve_ids)
    }

    async fn get_exploit_all(&self) -> Result<Vec<Exploit>, ExploitDbError> {
        self.find_all()
    }
}
