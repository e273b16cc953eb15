use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::errors::ExploitDbError;
use crate::models::{Document, Exploit, ExploitType, GitHubRepository, InsertSummary, OffensiveSecurity, ShellCode};
use crate::utils::progress::insert_progress;
use super::connection::{sqlite_error, RdbStore};
use super::schema::DELETE_ORDER;

const SELECT_EXPLOIT: &str =
    "SELECT id, exploit_type, exploit_unique_id, url, description, cve_id FROM exploits";

/// An exploit row together with its surrogate key.
struct ExploitRow {
    id: i64,
    exploit_type: String,
    exploit: Exploit,
}

impl RdbStore {
    /// Replace every stored exploit with `exploits` inside one transaction.
    ///
    /// Any failing row rolls the whole transaction back, leaving the previous
    /// contents untouched.
    pub fn replace_exploits(&self, exploits: &[Exploit]) -> Result<InsertSummary, ExploitDbError> {
        info!(count = exploits.len(), "Inserting exploits");
        let mut conn = self.lock()?;
        let tx = conn.transaction()
            .map_err(|e| sqlite_error(self.target(), "Failed to begin transaction", e))?;

        for table in DELETE_ORDER {
            tx.execute(&format!("DELETE FROM {}", table), [])
                .map_err(|e| sqlite_error(self.target(), "Failed to delete old records", e))?;
        }

        let bar = insert_progress(exploits.len() as u64);
        let mut summary = InsertSummary::default();
        for exploit in exploits {
            insert_exploit(&tx, exploit).map_err(|e| {
                sqlite_error(
                    self.target(),
                    &format!("Failed to insert. exploit_unique_id: {}", exploit.exploit_unique_id),
                    e,
                )
            })?;
            summary.record(exploit);
            bar.inc(1);
        }
        bar.finish_and_clear();

        tx.commit()
            .map_err(|e| sqlite_error(self.target(), "Failed to commit", e))?;

        info!(count = summary.without_cve_id, "No CveID Exploit Count");
        info!(count = summary.with_cve_id, "CveID Exploit Count");
        Ok(summary)
    }

    pub fn find_by_unique_id(&self, exploit_unique_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        let conn = self.lock()?;
        let rows = self.select_where(&conn, "exploit_unique_id", exploit_unique_id)?;
        self.attach_details(&conn, rows)
    }

    pub fn find_by_cve_id(&self, cve_id: &str) -> Result<Vec<Exploit>, ExploitDbError> {
        let conn = self.lock()?;
        let rows = self.select_where(&conn, "cve_id", cve_id)?;
        self.attach_details(&conn, rows)
    }

    pub fn find_by_cve_ids(&self, cve_ids: &[String]) -> Result<HashMap<String, Vec<Exploit>>, ExploitDbError> {
        let conn = self.lock()?;
        let mut results = HashMap::with_capacity(cve_ids.len());
        for cve_id in cve_ids {
            let rows = self.select_where(&conn, "cve_id", cve_id)?;
            results.insert(cve_id.clone(), self.attach_details(&conn, rows)?);
        }
        Ok(results)
    }

    /// Full dump. Details come from flat table scans joined in memory.
    pub fn find_all(&self) -> Result<Vec<Exploit>, ExploitDbError> {
        let conn = self.lock()?;
        let query_err = |e: rusqlite::Error| sqlite_error(self.target(), "Query failed", e);

        let rows = self.select_rows(&conn, &format!("{} ORDER BY id", SELECT_EXPLOIT), &[])?;

        let mut documents: HashMap<i64, Document> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT offensive_security_id, document_url, type FROM documents")
                .map_err(query_err)?;
            let mapped = stmt.query_map([], |row: &rusqlite::Row| {
                Ok((row.get::<_, i64>(0)?, Document { document_url: row.get(1)?, file_type: row.get(2)? }))
            }).map_err(query_err)?;
            for row in mapped {
                let (os_id, doc) = row.map_err(query_err)?;
                documents.insert(os_id, doc);
            }
        }

        let mut shell_codes: HashMap<i64, ShellCode> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT offensive_security_id, shell_code_url FROM shell_codes")
                .map_err(query_err)?;
            let mapped = stmt.query_map([], |row: &rusqlite::Row| {
                Ok((row.get::<_, i64>(0)?, ShellCode { shell_code_url: row.get(1)? }))
            }).map_err(query_err)?;
            for row in mapped {
                let (os_id, shell) = row.map_err(query_err)?;
                shell_codes.insert(os_id, shell);
            }
        }

        let mut offensive_securities: HashMap<i64, OffensiveSecurity> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT id, exploit_id FROM offensive_securities")
                .map_err(query_err)?;
            let mapped = stmt.query_map([], |row: &rusqlite::Row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            }).map_err(query_err)?;
            for row in mapped {
                let (os_id, exploit_id) = row.map_err(query_err)?;
                offensive_securities.insert(exploit_id, OffensiveSecurity {
                    document: documents.remove(&os_id),
                    shell_code: shell_codes.remove(&os_id),
                });
            }
        }

        let mut github_repositories: HashMap<i64, GitHubRepository> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT exploit_id, repository_url, star, fork FROM github_repositories")
                .map_err(query_err)?;
            let mapped = stmt.query_map([], |row: &rusqlite::Row| {
                Ok((row.get::<_, i64>(0)?, GitHubRepository {
                    repository_url: row.get(1)?,
                    star: row.get(2)?,
                    fork: row.get(3)?,
                }))
            }).map_err(query_err)?;
            for row in mapped {
                let (exploit_id, repo) = row.map_err(query_err)?;
                github_repositories.insert(exploit_id, repo);
            }
        }

        rows.into_iter()
            .map(|row| -> Result<Exploit, ExploitDbError> {
                let mut exploit = row.exploit;
                exploit.exploit_type = row.exploit_type.parse()?;
                match exploit.exploit_type {
                    ExploitType::OffensiveSecurity => {
                        exploit.offensive_security = offensive_securities.remove(&row.id);
                    }
                    ExploitType::GitHubRepository => {
                        exploit.github_repository = github_repositories.remove(&row.id);
                    }
                    ExploitType::AwesomePoc => {}
                }
                Ok(exploit)
            })
            .collect()
    }

    fn select_where(&self, conn: &Connection, column: &str, value: &str) -> Result<Vec<ExploitRow>, ExploitDbError> {
        let sql = format!("{} WHERE {} = ?1 ORDER BY id", SELECT_EXPLOIT, column);
        self.select_rows(conn, &sql, &[&value])
    }

    fn select_rows(
        &self,
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ExploitRow>, ExploitDbError> {
        let mut stmt = conn.prepare(sql)
            .map_err(|e| sqlite_error(self.target(), "Query failed", e))?;

        let rows = stmt.query_map(params, |row: &rusqlite::Row| {
            Ok(ExploitRow {
                id: row.get(0)?,
                exploit_type: row.get(1)?,
                exploit: Exploit {
                    // Placeholder until the stored type string is parsed
                    exploit_type: ExploitType::AwesomePoc,
                    exploit_unique_id: row.get(2)?,
                    url: row.get(3)?,
                    description: row.get(4)?,
                    cve_id: row.get(5)?,
                    offensive_security: None,
                    github_repository: None,
                },
            })
        }).map_err(|e| sqlite_error(self.target(), "Query error", e))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| sqlite_error(self.target(), "Row error", e))?);
        }
        Ok(results)
    }

    /// Load the type-specific detail of each row by its foreign key.
    fn attach_details(&self, conn: &Connection, rows: Vec<ExploitRow>) -> Result<Vec<Exploit>, ExploitDbError> {
        let mut exploits = Vec::with_capacity(rows.len());
        for row in rows {
            let mut exploit = row.exploit;
            exploit.exploit_type = row.exploit_type.parse()?;
            match exploit.exploit_type {
                ExploitType::OffensiveSecurity => {
                    exploit.offensive_security = load_offensive_security(conn, row.id)
                        .map_err(|e| sqlite_error(self.target(), "Failed to load offensive security detail", e))?;
                }
                ExploitType::GitHubRepository => {
                    exploit.github_repository = load_github_repository(conn, row.id)
                        .map_err(|e| sqlite_error(self.target(), "Failed to load github repository detail", e))?;
                }
                ExploitType::AwesomePoc => {}
            }
            exploits.push(exploit);
        }
        Ok(exploits)
    }
}

fn insert_exploit(conn: &Connection, exploit: &Exploit) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO exploits (exploit_type, exploit_unique_id, url, description, cve_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            exploit.exploit_type.as_str(),
            exploit.exploit_unique_id,
            exploit.url,
            exploit.description,
            exploit.cve_id,
        ],
    )?;
    let exploit_id = conn.last_insert_rowid();

    if let Some(detail) = exploit.offensive_security_detail() {
        conn.execute(
            "INSERT INTO offensive_securities (exploit_id, exploit_unique_id) VALUES (?1, ?2)",
            rusqlite::params![exploit_id, exploit.exploit_unique_id],
        )?;
        let offensive_security_id = conn.last_insert_rowid();

        if let Some(doc) = &detail.document {
            conn.execute(
                "INSERT INTO documents (offensive_security_id, document_url, type) VALUES (?1, ?2, ?3)",
                rusqlite::params![offensive_security_id, doc.document_url, doc.file_type],
            )?;
        }
        if let Some(shell) = &detail.shell_code {
            conn.execute(
                "INSERT INTO shell_codes (offensive_security_id, shell_code_url) VALUES (?1, ?2)",
                rusqlite::params![offensive_security_id, shell.shell_code_url],
            )?;
        }
    }

    if let Some(repo) = exploit.github_detail() {
        conn.execute(
            "INSERT INTO github_repositories (exploit_id, repository_url, star, fork) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![exploit_id, repo.repository_url, repo.star, repo.fork],
        )?;
    }
    Ok(())
}

fn load_offensive_security(conn: &Connection, exploit_id: i64) -> rusqlite::Result<Option<OffensiveSecurity>> {
    let os_id: Option<i64> = conn
        .query_row(
            "SELECT id FROM offensive_securities WHERE exploit_id = ?1",
            rusqlite::params![exploit_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(os_id) = os_id else {
        return Ok(None);
    };

    let document = conn
        .query_row(
            "SELECT document_url, type FROM documents WHERE offensive_security_id = ?1",
            rusqlite::params![os_id],
            |row| Ok(Document { document_url: row.get(0)?, file_type: row.get(1)? }),
        )
        .optional()?;
    let shell_code = conn
        .query_row(
            "SELECT shell_code_url FROM shell_codes WHERE offensive_security_id = ?1",
            rusqlite::params![os_id],
            |row| Ok(ShellCode { shell_code_url: row.get(0)? }),
        )
        .optional()?;

    Ok(Some(OffensiveSecurity { document, shell_code }))
}

fn load_github_repository(conn: &Connection, exploit_id: i64) -> rusqlite::Result<Option<GitHubRepository>> {
    conn.query_row(
        "SELECT repository_url, star, fork FROM github_repositories WHERE exploit_id = ?1",
        rusqlite::params![exploit_id],
        |row| {
            Ok(GitHubRepository {
                repository_url: row.get(0)?,
                star: row.get(1)?,
                fork: row.get(2)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offensive_security(id: &str, cve_id: &str) -> Exploit {
        Exploit {
            exploit_type: ExploitType::OffensiveSecurity,
            exploit_unique_id: id.to_string(),
            url: format!("https://www.exploit-db.com/exploits/{}", id),
            description: format!("exploit {}", id),
            cve_id: cve_id.to_string(),
            offensive_security: Some(OffensiveSecurity {
                document: Some(Document {
                    document_url: format!("https://www.exploit-db.com/docs/{}.pdf", id),
                    file_type: "pdf".to_string(),
                }),
                shell_code: Some(ShellCode {
                    shell_code_url: format!("https://www.exploit-db.com/raw/{}", id),
                }),
            }),
            github_repository: None,
        }
    }

    fn sample() -> Vec<Exploit> {
        vec![
            offensive_security("44553", "CVE-2018-1111"),
            Exploit::github_repository("CVE-2018-1111", "poc", "https://github.com/a/CVE-2018-1111", 12, 4),
            Exploit::awesome_poc("CVE-2019-0708", "BlueKeep", "https://github.com/b/bluekeep"),
            Exploit::awesome_poc("", "unclassified", "https://example.com/none"),
        ]
    }

    #[test]
    fn test_replace_and_lookup_by_unique_id() {
        let store = RdbStore::in_memory().unwrap();
        let exploits = sample();
        let summary = store.replace_exploits(&exploits).unwrap();
        assert_eq!(summary, InsertSummary { with_cve_id: 3, without_cve_id: 1 });

        for exploit in &exploits {
            let found = store.find_by_unique_id(&exploit.exploit_unique_id).unwrap();
            assert_eq!(found, vec![exploit.clone()]);
        }
    }

    #[test]
    fn test_lookup_by_cve_id_attaches_details() {
        let store = RdbStore::in_memory().unwrap();
        store.replace_exploits(&sample()).unwrap();

        let found = store.find_by_cve_id("CVE-2018-1111").unwrap();
        assert_eq!(found.len(), 2);
        let os = found[0].offensive_security.as_ref().unwrap();
        assert_eq!(os.document.as_ref().unwrap().file_type, "pdf");
        assert!(os.shell_code.is_some());
        assert_eq!(found[1].github_repository.as_ref().unwrap().star, 12);
    }

    #[test]
    fn test_lookup_missing_is_empty() {
        let store = RdbStore::in_memory().unwrap();
        store.replace_exploits(&sample()).unwrap();
        assert!(store.find_by_cve_id("CVE-9999-0000").unwrap().is_empty());
        assert!(store.find_by_unique_id("nope").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_unique_ids_are_all_returned() {
        let store = RdbStore::in_memory().unwrap();
        let a = Exploit::github_repository("CVE-2020-0001", "", "https://github.com/x/multi", 1, 0);
        let b = Exploit::github_repository("CVE-2020-0002", "", "https://github.com/x/multi", 1, 0);
        store.replace_exploits(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(store.find_by_unique_id(&a.exploit_unique_id).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_replace_discards_previous_state() {
        let store = RdbStore::in_memory().unwrap();
        store.replace_exploits(&sample()).unwrap();
        let fresh = vec![Exploit::awesome_poc("CVE-2021-4444", "new", "https://example.com/new")];
        store.replace_exploits(&fresh).unwrap();
        assert_eq!(store.find_all().unwrap(), fresh);

        let conn = store.lock().unwrap();
        for table in DELETE_ORDER {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap();
            let expected = if table == "exploits" { 1 } else { 0 };
            assert_eq!(count, expected, "table {}", table);
        }
    }

    #[test]
    fn test_failed_replace_rolls_back() {
        let store = RdbStore::in_memory().unwrap();
        let old = sample();
        store.replace_exploits(&old).unwrap();

        let mut broken = vec![
            Exploit::awesome_poc("CVE-2022-0001", "ok", "https://example.com/1"),
            Exploit::awesome_poc("CVE-2022-0002", "ok", "https://example.com/2"),
        ];
        broken[1].exploit_unique_id = String::new();

        let err = store.replace_exploits(&broken).unwrap_err();
        assert!(matches!(err, ExploitDbError::Database(_)));
        assert_eq!(store.find_all().unwrap(), old);
        assert!(store.find_by_cve_id("CVE-2022-0001").unwrap().is_empty());
    }

    #[test]
    fn test_find_all_joins_details() {
        let store = RdbStore::in_memory().unwrap();
        let exploits = sample();
        store.replace_exploits(&exploits).unwrap();
        assert_eq!(store.find_all().unwrap(), exploits);
    }

    #[test]
    fn test_mismatched_detail_is_not_persisted() {
        let store = RdbStore::in_memory().unwrap();
        let mut exploit = Exploit::awesome_poc("CVE-2020-1234", "", "https://example.com/x");
        exploit.github_repository = Some(GitHubRepository { repository_url: "u".into(), star: 1, fork: 1 });
        store.replace_exploits(&[exploit.clone()]).unwrap();

        let found = store.find_by_cve_id("CVE-2020-1234").unwrap();
        assert!(found[0].github_repository.is_none());
    }

    #[test]
    fn test_find_by_cve_ids_batch() {
        let store = RdbStore::in_memory().unwrap();
        store.replace_exploits(&sample()).unwrap();
        let ids = vec!["CVE-2019-0708".to_string(), "CVE-9999-0000".to_string()];
        let results = store.find_by_cve_ids(&ids).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["CVE-2019-0708"].len(), 1);
        assert!(results["CVE-9999-0000"].is_empty());
    }
}
