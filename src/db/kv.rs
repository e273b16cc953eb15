//! Key-value exploit store.
//!
//! # Layout
//!
//! | hash              | field               | value        | purpose                    |
//! |-------------------|---------------------|--------------|----------------------------|
//! | `E#<unique id>`   | `<cve id>` / `NONE` | exploit JSON | lookup by unique id        |
//! | `C#<cve id>`      | `<unique id>`       | exploit JSON | lookup by CVE id           |
//!
//! Both hashes are written for every exploit that has a CVE id. There is no
//! transaction across them and no removal of keys from earlier runs: records
//! dropped from a new snapshot stay readable until overwritten.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::ExploitDbError;
use crate::models::{Exploit, InsertSummary};
use crate::utils::progress::insert_progress;
use super::hash_store::{FieldWrite, HashStore};
use super::store::ExploitStore;

pub const EXPLOIT_ID_PREFIX: &str = "E#";
pub const CVE_ID_PREFIX: &str = "C#";
/// Field used under `E#` for exploits without a CVE id.
pub const NO_CVE_ID_FIELD: &str = "NONE";

pub struct KvStore<H> {
    name: String,
    hashes: H,
}

impl<H: HashStore> KvStore<H> {
    pub fn new(name: &str, hashes: H) -> Self {
        Self { name: name.to_string(), hashes }
    }

    pub fn hashes(&self) -> &H {
        &self.hashes
    }

    /// Only the detail matching the record's type is stored.
    fn index_writes(exploit: &Exploit) -> Result<Vec<FieldWrite>, ExploitDbError> {
        let stored = exploit.clone().without_mismatched_detail();
        let json = serde_json::to_string(&stored).map_err(|e| {
            ExploitDbError::Serialization(format!(
                "Failed to marshal exploit {}: {}",
                exploit.exploit_unique_id, e
            ))
        })?;

        let mut writes = Vec::with_capacity(2);
        if exploit.has_cve_id() {
            writes.push(FieldWrite {
                key: format!("{}{}", CVE_ID_PREFIX, exploit.cve_id),
                field: exploit.exploit_unique_id.clone(),
                value: json.clone(),
            });
        }
        let field = if exploit.has_cve_id() { exploit.cve_id.as_str() } else { NO_CVE_ID_FIELD };
        writes.push(FieldWrite {
            key: format!("{}{}", EXPLOIT_ID_PREFIX, exploit.exploit_unique_id),
            field: field.to_string(),
            value: json,
        });
        Ok(writes)
    }

    fn decode(hash: BTreeMap<String, String>) -> Result<Vec<Exploit>, ExploitDbError> {
        hash.into_values()
            .map(|json| {
                serde_json::from_str::<Exploit>(&json)
                    .map(Exploit::without_mismatched_detail)
                    .map_err(|e| ExploitDbError::Serialization(format!("Failed to unmarshal exploit: {}", e)))
            })
            .collect()
    }
}

#[async_trait]
impl<H: HashStore> ExploitStore for KvStore<H> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Writes both index entries per exploit, one pipeline per exploit.
    /// Stale keys from previous runs are left in place.
    async fn insert_exploits(&self, exploits: &[Exploit]) -> Result<InsertSummary, ExploitDbError> {
        info!(count = exploits.len(), db = %self.name, "Inserting exploits");
        let bar = insert_progress(exploits.len() as u64);
        let mut summary = InsertSummary::default();

        for exploit in exploits {
            let writes = Self::index_writes(exploit)?;
            if let Err(e) = self.hashes.write_fields(&writes).await {
                warn!(
                    written = summary.total(),
                    exploit_unique_id = %exploit.exploit_unique_id,
                    "Insert aborted; exploits written so far remain stored"
                );
                return Err(e);
            }
            summary.record(exploit);
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!(count = summary.without_cve_id, "No CveID Exploit Count");
        info!(count = summary.with_cve_id, "CveID Exploit Count");
        Ok(summary)
    }

    async fn get_exploit_by_id(&self, exploit_unique_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        let hash = self
            .hashes
            .read_hash(&format!("{}{}", EXPLOIT_ID_PREFIX, exploit_unique_id))
            .await?;
        Self::decode(hash)
    }

    async fn get_exploit_by_cve_id(&self, cve_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        let hash = self.hashes.read_hash(&format!("{}{}", CVE_ID_PREFIX, cve_id)).await?;
        Self::decode(hash)
    }

    async fn get_exploit_multi_by_cve_id(
        &self,
        cve_ids: &[String],
    ) -> Result<HashMap<String, Vec<Exploit>>, ExploitDbError> {
        let keys: Vec<String> = cve_ids
            .iter()
            .map(|id| format!("{}{}", CVE_ID_PREFIX, id))
            .collect();
        let hashes = self.hashes.read_hashes(&keys).await?;

        let mut results = HashMap::with_capacity(cve_ids.len());
        for (cve_id, hash) in cve_ids.iter().zip(hashes) {
            results.insert(cve_id.clone(), Self::decode(hash)?);
        }
        // Pad ids the store returned nothing for
        for cve_id in cve_ids {
            results.entry(cve_id.clone()).or_default();
        }
        Ok(results)
    }

    async fn get_exploit_all(&self) -> Result<Vec<Exploit>, ExploitDbError> {
        warn!(db = %self.name, "Full dump requested from key-value backend");
        Err(ExploitDbError::unsupported("get_exploit_all", &self.name))
    }
}
