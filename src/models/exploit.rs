use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ExploitDbError;

/// Origin of an exploit record. Selects which detail object a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExploitType {
    OffensiveSecurity,
    GitHubRepository,
    AwesomePoc,
}

impl ExploitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExploitType::OffensiveSecurity => "OffensiveSecurity",
            ExploitType::GitHubRepository => "GitHubRepository",
            ExploitType::AwesomePoc => "AwesomePoc",
        }
    }
}

impl fmt::Display for ExploitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExploitType {
    type Err = ExploitDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OffensiveSecurity" => Ok(ExploitType::OffensiveSecurity),
            "GitHubRepository" => Ok(ExploitType::GitHubRepository),
            "AwesomePoc" => Ok(ExploitType::AwesomePoc),
            other => Err(ExploitDbError::Serialization(format!("Unknown exploit type: {}", other))),
        }
    }
}

/// A single exploit reference, normalized across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exploit {
    pub exploit_type: ExploitType,
    /// Globally unique across sources; the identity used by bulk replace.
    pub exploit_unique_id: String,
    pub url: String,
    pub description: String,
    /// `CVE-YYYY-NNNN`, or empty when the exploit is unclassified.
    pub cve_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offensive_security: Option<OffensiveSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repository: Option<GitHubRepository>,
}

/// Exploit-DB detail. Owns its document and shellcode exclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffensiveSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_code: Option<ShellCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub document_url: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShellCode {
    pub shell_code_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub repository_url: String,
    pub star: i64,
    pub fork: i64,
}

impl Exploit {
    pub fn awesome_poc(cve_id: &str, description: &str, url: &str) -> Self {
        Self {
            exploit_type: ExploitType::AwesomePoc,
            exploit_unique_id: format!("{}-{}", ExploitType::AwesomePoc, url),
            url: url.to_string(),
            description: description.to_string(),
            cve_id: cve_id.to_string(),
            offensive_security: None,
            github_repository: None,
        }
    }

    pub fn github_repository(cve_id: &str, description: &str, url: &str, star: i64, fork: i64) -> Self {
        Self {
            exploit_type: ExploitType::GitHubRepository,
            exploit_unique_id: format!("{}-{}", ExploitType::GitHubRepository, url),
            url: url.to_string(),
            description: description.to_string(),
            cve_id: cve_id.to_string(),
            offensive_security: None,
            github_repository: Some(GitHubRepository {
                repository_url: url.to_string(),
                star,
                fork,
            }),
        }
    }

    pub fn has_cve_id(&self) -> bool {
        !self.cve_id.is_empty()
    }

    /// The Exploit-DB detail, only when it matches this record's type.
    pub fn offensive_security_detail(&self) -> Option<&OffensiveSecurity> {
        match self.exploit_type {
            ExploitType::OffensiveSecurity => self.offensive_security.as_ref(),
            _ => None,
        }
    }

    /// The GitHub detail, only when it matches this record's type.
    pub fn github_detail(&self) -> Option<&GitHubRepository> {
        match self.exploit_type {
            ExploitType::GitHubRepository => self.github_repository.as_ref(),
            _ => None,
        }
    }

    /// Drop any detail that does not belong to this record's type.
    pub fn without_mismatched_detail(mut self) -> Self {
        if self.exploit_type != ExploitType::OffensiveSecurity {
            self.offensive_security = None;
        }
        if self.exploit_type != ExploitType::GitHubRepository {
            self.github_repository = None;
        }
        self
    }
}

/// Advisory counts returned by a bulk replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    pub with_cve_id: usize,
    pub without_cve_id: usize,
}

impl InsertSummary {
    pub fn record(&mut self, exploit: &Exploit) {
        if exploit.has_cve_id() {
            self.with_cve_id += 1;
        } else {
            self.without_cve_id += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.with_cve_id + self.without_cve_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exploit_type_round_trips_through_str() {
        for t in [ExploitType::OffensiveSecurity, ExploitType::GitHubRepository, ExploitType::AwesomePoc] {
            assert_eq!(t.as_str().parse::<ExploitType>().unwrap(), t);
        }
        assert!("Metasploit".parse::<ExploitType>().is_err());
    }

    #[test]
    fn test_without_mismatched_detail() {
        let mut poc = Exploit::awesome_poc("CVE-2020-1234", "", "https://example.com/x");
        poc.github_repository = Some(GitHubRepository { repository_url: "u".into(), star: 1, fork: 1 });
        poc.offensive_security = Some(OffensiveSecurity::default());
        let poc = poc.without_mismatched_detail();
        assert!(poc.github_repository.is_none());
        assert!(poc.offensive_security.is_none());

        let repo = Exploit::github_repository("CVE-2020-1234", "", "https://github.com/a/b", 3, 1);
        assert_eq!(repo.clone().without_mismatched_detail(), repo);
    }

    #[test]
    fn test_awesome_poc_unique_id_uses_url() {
        let e = Exploit::awesome_poc("CVE-2020-1234", "desc", "https://example.com/poc");
        assert_eq!(e.exploit_unique_id, "AwesomePoc-https://example.com/poc");
        assert!(e.has_cve_id());
        assert!(e.github_detail().is_none());
    }

    #[test]
    fn test_github_detail_only_for_matching_type() {
        let mut e = Exploit::github_repository("CVE-2019-0001", "", "https://github.com/a/b", 3, 1);
        assert_eq!(e.github_detail().unwrap().star, 3);
        e.exploit_type = ExploitType::AwesomePoc;
        assert!(e.github_detail().is_none());
    }

    #[test]
    fn test_json_omits_absent_details() {
        let e = Exploit::awesome_poc("", "desc", "u");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["exploit_type"], "AwesomePoc");
        assert!(json.get("offensive_security").is_none());
        assert!(json.get("github_repository").is_none());
    }

    #[test]
    fn test_document_type_field_name() {
        let d = Document { document_url: "https://x/y.pdf".into(), file_type: "pdf".into() };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "pdf");
    }

    #[test]
    fn test_insert_summary_counts() {
        let mut summary = InsertSummary::default();
        summary.record(&Exploit::awesome_poc("CVE-2020-1", "", "a"));
        summary.record(&Exploit::awesome_poc("", "", "b"));
        summary.record(&Exploit::awesome_poc("CVE-2020-2", "", "c"));
        assert_eq!(summary, InsertSummary { with_cve_id: 2, without_cve_id: 1 });
        assert_eq!(summary.total(), 3);
    }
}
