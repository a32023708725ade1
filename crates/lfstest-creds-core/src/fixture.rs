//! Fixture-backed credential lookup.
//!
//! Test suites seed a directory with one file per host (and optionally per
//! repository path). Each file holds a single `authtype:username:credential`
//! record:
//!
//! ```text
//! <dir>/example.com              -> used for any path on example.com
//! <dir>/example.com--org-repo    -> used for path "org/repo" on example.com
//! <dir>                          -> used when the URL has no host (file://)
//! ```
//!
//! A path-specific file wins over the host file. If it is missing or
//! malformed, the host file is used instead.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::{CredsError, Result};

/// Separator between the host name and the escaped path in fixture names.
const PATH_SEPARATOR: &str = "--";

/// One parsed fixture file.
#[derive(Clone)]
pub struct FixtureRecord {
    /// Authentication scheme; empty for plain username/password, `skip` to
    /// answer with nothing.
    pub authtype: String,
    /// Username, used when `authtype` is empty.
    pub username: String,
    /// Password or scheme-specific credential.
    pub credential: SecretString,
}

// Manual Debug implementation to avoid exposing the credential
impl std::fmt::Debug for FixtureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureRecord")
            .field("authtype", &self.authtype)
            .field("username", &self.username)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

impl FixtureRecord {
    /// Parse fixture content read from `path`.
    ///
    /// Surrounding whitespace is ignored. The remainder must split on `:`
    /// into exactly three fields.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut fields = content.trim().split(':');

        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(authtype), Some(username), Some(credential), None) => Ok(Self {
                authtype: authtype.to_string(),
                username: username.to_string(),
                credential: SecretString::from(credential),
            }),
            _ => Err(CredsError::FixtureData {
                path: path.to_path_buf(),
                content: content.to_string(),
            }),
        }
    }

    /// Read and parse a single fixture file.
    pub fn read(path: &Path) -> Result<Self> {
        let mut content =
            std::fs::read_to_string(path).map_err(|source| CredsError::FixtureOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let record = Self::parse(path, &content);
        content.zeroize();
        record
    }
}

/// Escape a repository path for use in a fixture file name.
///
/// Leading slashes are dropped and the remaining `/` become `-`, so
/// `/org/repo.git` and `org/repo.git` both map to `org-repo.git`.
pub fn escape_path(path: &str) -> String {
    path.trim_start_matches('/').replace('/', "-")
}

/// A directory of credential fixtures.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    dir: PathBuf,
}

impl FixtureStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The fixtures directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fixture file for a whole host.
    ///
    /// An empty host maps to the fixtures directory itself, which is where
    /// host-less URLs such as `file:///` or `cert:///` find their record.
    pub fn host_fixture(&self, host: &str) -> PathBuf {
        if host.is_empty() {
            self.dir.clone()
        } else {
            self.dir.join(host)
        }
    }

    /// Fixture file for a specific path on a host, if a path was given.
    ///
    /// The name is built by appending to the host fixture name rather than
    /// joining, so a fixtures directory given with a trailing slash keeps it.
    pub fn path_fixture(&self, host: &str, path: &str) -> Option<PathBuf> {
        if path.is_empty() {
            return None;
        }

        let mut name: OsString = self.host_fixture(host).into_os_string();
        name.push(PATH_SEPARATOR);
        name.push(escape_path(path));
        Some(PathBuf::from(name))
    }

    /// Resolve the record for `host` and `path`.
    ///
    /// The path-specific fixture is tried first; any failure there falls
    /// back to the host fixture, whose error (if any) is returned.
    pub fn lookup(&self, host: &str, path: &str) -> Result<FixtureRecord> {
        if let Some(path_fixture) = self.path_fixture(host, path) {
            match FixtureRecord::read(&path_fixture) {
                Ok(record) => {
                    debug!(path = %path_fixture.display(), "Using path-specific fixture");
                    return Ok(record);
                }
                Err(e) => {
                    debug!(
                        path = %path_fixture.display(),
                        error = %e,
                        "Path-specific fixture unusable, falling back to host fixture"
                    );
                }
            }
        }

        let host_fixture = self.host_fixture(host);
        let record = FixtureRecord::read(&host_fixture)?;
        debug!(path = %host_fixture.display(), "Using host fixture");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn parse_three_fields() {
        let record = FixtureRecord::parse(Path::new("f"), "basic:alice:secret123").unwrap();
        assert_eq!(record.authtype, "basic");
        assert_eq!(record.username, "alice");
        assert_eq!(record.credential.expose_secret(), "secret123");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let record = FixtureRecord::parse(Path::new("f"), "  :user:pass\n").unwrap();
        assert_eq!(record.authtype, "");
        assert_eq!(record.username, "user");
        assert_eq!(record.credential.expose_secret(), "pass");
    }

    #[test]
    fn parse_allows_empty_fields() {
        let record = FixtureRecord::parse(Path::new("f"), "skip::").unwrap();
        assert_eq!(record.authtype, "skip");
        assert_eq!(record.username, "");
        assert_eq!(record.credential.expose_secret(), "");
    }

    #[test]
    fn parse_rejects_too_few_fields() {
        let err = FixtureRecord::parse(Path::new("/creds/host"), "basic:alice\n").unwrap_err();
        match err {
            CredsError::FixtureData { path, content } => {
                assert_eq!(path, PathBuf::from("/creds/host"));
                assert_eq!(content, "basic:alice\n");
            }
            other => panic!("expected FixtureData, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_too_many_fields() {
        let result = FixtureRecord::parse(Path::new("f"), "basic:alice:se:cret");
        assert!(matches!(result, Err(CredsError::FixtureData { .. })));
    }

    #[test]
    fn debug_redacts_credential() {
        let record = FixtureRecord::parse(Path::new("f"), ":alice:hunter2").unwrap();
        let debug_output = format!("{:?}", record);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn escape_path_replaces_slashes() {
        assert_eq!(escape_path("org/repo.git"), "org-repo.git");
        assert_eq!(escape_path("/repo.git"), "repo.git");
        assert_eq!(escape_path("a/b/c"), "a-b-c");
        assert_eq!(escape_path("repo"), "repo");
    }

    #[test]
    fn host_fixture_for_empty_host_is_directory() {
        let store = FixtureStore::new("/creds/");
        assert_eq!(store.host_fixture(""), PathBuf::from("/creds/"));
        assert_eq!(
            store.host_fixture("example.com"),
            PathBuf::from("/creds/example.com")
        );
    }

    #[test]
    fn path_fixture_names() {
        let store = FixtureStore::new("/creds");
        assert_eq!(store.path_fixture("example.com", ""), None);
        assert_eq!(
            store.path_fixture("example.com", "/repo.git"),
            Some(PathBuf::from("/creds/example.com--repo.git"))
        );
        assert_eq!(
            store.path_fixture("example.com", "org/repo"),
            Some(PathBuf::from("/creds/example.com--org-repo"))
        );
    }

    #[test]
    fn path_fixture_for_empty_host_keeps_trailing_slash() {
        let store = FixtureStore::new("/creds/");
        assert_eq!(
            store.path_fixture("", "repo"),
            Some(PathBuf::from("/creds/--repo"))
        );
    }

    #[test]
    fn lookup_prefers_path_fixture() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), "example.com", ":bob:hostpass");
        write_fixture(dir.path(), "example.com--repo.git", "basic:alice:secret123");

        let store = FixtureStore::new(dir.path());
        let record = store.lookup("example.com", "/repo.git").unwrap();

        assert_eq!(record.authtype, "basic");
        assert_eq!(record.username, "alice");
        assert_eq!(record.credential.expose_secret(), "secret123");
    }

    #[test]
    fn lookup_falls_back_when_path_fixture_missing() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), "example.com", ":bob:hostpass");

        let store = FixtureStore::new(dir.path());
        let record = store.lookup("example.com", "other.git").unwrap();

        assert_eq!(record.username, "bob");
        assert_eq!(record.credential.expose_secret(), "hostpass");
    }

    #[test]
    fn lookup_falls_back_when_path_fixture_malformed() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), "example.com", ":bob:hostpass");
        write_fixture(dir.path(), "example.com--repo.git", "garbage");

        let store = FixtureStore::new(dir.path());
        let record = store.lookup("example.com", "repo.git").unwrap();

        assert_eq!(record.username, "bob");
    }

    #[test]
    fn lookup_without_path_reads_host_fixture() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), "example.com", ":bob:hostpass");

        let store = FixtureStore::new(dir.path());
        assert_eq!(store.lookup("example.com", "").unwrap().username, "bob");
    }

    #[test]
    fn lookup_missing_host_fixture_names_file() {
        let dir = tempdir().unwrap();
        let store = FixtureStore::new(dir.path());

        let err = store.lookup("missing.example", "repo.git").unwrap_err();
        match &err {
            CredsError::FixtureOpen { path, .. } => {
                assert_eq!(path, &dir.path().join("missing.example"));
            }
            other => panic!("expected FixtureOpen, got {:?}", other),
        }
        assert!(err.to_string().contains("missing.example"));
    }

    #[test]
    fn lookup_malformed_host_fixture_cites_content() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), "example.com", "only-one-field");

        let store = FixtureStore::new(dir.path());
        let err = store.lookup("example.com", "").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("only-one-field"));
        assert!(message.contains("example.com"));
    }

    #[test]
    fn lookup_empty_host_reads_directory_fixture() {
        let dir = tempdir().unwrap();
        // A host-less URL resolves to the directory path itself, which is a
        // file in this layout.
        let fixture = dir.path().join("generic");
        std::fs::write(&fixture, ":local:localpass").unwrap();

        let store = FixtureStore::new(&fixture);
        let record = store.lookup("", "").unwrap();
        assert_eq!(record.username, "local");
    }
}
