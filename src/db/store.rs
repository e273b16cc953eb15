use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ExploitDbError;
use crate::models::{Exploit, InsertSummary};

/// Capability contract shared by every storage backend.
///
/// Lookups never treat absence as an error: a missing id yields an empty
/// vector. Only connectivity and data failures surface as `Err`.
#[async_trait]
pub trait ExploitStore: Send + Sync {
    /// Backend name, used in logs and error context.
    fn name(&self) -> &str;

    /// Bulk replace: the given exploits become the complete stored state.
    async fn insert_exploits(&self, exploits: &[Exploit]) -> Result<InsertSummary, ExploitDbError>;

    async fn get_exploit_by_id(&self, exploit_unique_id: &str) -> Result<Vec<Exploit>, ExploitDbError>;

    async fn get_exploit_by_cve_id(&self, cve_id: &str) -> Result<Vec<Exploit>, ExploitDbError>;

    /// Batched lookup. Every requested id is present in the result, mapped to
    /// an empty vector when nothing matches.
    async fn get_exploit_multi_by_cve_id(
        &self,
        cve_ids: &[String],
    ) -> Result<HashMap<String, Vec<Exploit>>, ExploitDbError>;

    /// Full dump. Backends without an enumerable root return `Unsupported`.
    async fn get_exploit_all(&self) -> Result<Vec<Exploit>, ExploitDbError>;
}
