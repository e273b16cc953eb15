pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS exploits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exploit_type TEXT NOT NULL,
    exploit_unique_id TEXT NOT NULL CHECK (exploit_unique_id <> ''),
    url TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    cve_id TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS offensive_securities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exploit_id INTEGER NOT NULL REFERENCES exploits(id),
    exploit_unique_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    offensive_security_id INTEGER NOT NULL REFERENCES offensive_securities(id),
    document_url TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS shell_codes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    offensive_security_id INTEGER NOT NULL REFERENCES offensive_securities(id),
    shell_code_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS github_repositories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exploit_id INTEGER NOT NULL REFERENCES exploits(id),
    repository_url TEXT NOT NULL DEFAULT '',
    star INTEGER NOT NULL DEFAULT 0,
    fork INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_exploits_cve_id ON exploits(cve_id);
CREATE INDEX IF NOT EXISTS idx_exploits_unique_id ON exploits(exploit_unique_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_offensive_securities_exploit ON offensive_securities(exploit_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_offensive_security ON documents(offensive_security_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_shell_codes_offensive_security ON shell_codes(offensive_security_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_github_repositories_exploit ON github_repositories(exploit_id);
";

/// Child tables first so foreign keys hold at every step of a wipe.
pub const DELETE_ORDER: [&str; 5] = [
    "documents",
    "shell_codes",
    "offensive_securities",
    "github_repositories",
    "exploits",
];
