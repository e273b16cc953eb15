use crate::models::Exploit;

const SEPARATOR: &str = "---------------------------------------";

/// Human-readable block for search results, one section per exploit.
pub fn format_exploits(exploits: &[Exploit]) -> String {
    let mut out = String::new();
    out.push_str("\nResults: \n");
    out.push_str(SEPARATOR);
    out.push('\n');
    if exploits.is_empty() {
        out.push_str("No Record Found\n");
    }
    for exploit in exploits {
        out.push_str(&format_exploit(exploit));
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out
}

pub fn format_exploit(exploit: &Exploit) -> String {
    let mut out = String::new();
    out.push_str("\n[*]CVE-ExploitID Reference:\n");
    out.push_str(&format!("  CVE: {}\n", display_or_none(&exploit.cve_id)));
    out.push_str(&format!("  Exploit Type: {}\n", exploit.exploit_type));
    out.push_str(&format!("  Exploit Unique ID: {}\n", exploit.exploit_unique_id));
    out.push_str(&format!("  URL: {}\n", exploit.url));
    out.push_str(&format!("  Description: {}\n", exploit.description));

    out.push_str("\n[*]Exploit Detail Info: \n");
    if let Some(os) = &exploit.offensive_security {
        out.push_str("  [*]OffensiveSecurity: \n");
        if let Some(doc) = &os.document {
            out.push_str("  - Document:\n");
            out.push_str(&format!("    Path: {}\n", doc.document_url));
            out.push_str(&format!("    File Type: {}\n", doc.file_type));
        }
        if let Some(shell) = &os.shell_code {
            out.push_str("  - Exploit Code or Proof of Concept:\n");
            out.push_str(&format!("    {}\n", shell.shell_code_url));
        }
    }
    if let Some(repo) = &exploit.github_repository {
        out.push_str("  [*]GitHubRepository: \n");
        out.push_str(&format!("    Repository: {}\n", repo.repository_url));
        out.push_str(&format!("    Stars: {}  Forks: {}\n", repo.star, repo.fork));
    }
    out
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
