//! Role-set resource table.
//!
//! Maps a predicate sense (`arrive-01`) to the argument roles it accepts.
//! The file format is one comma-separated record per line:
//! `predicate,role,role,...`. Roles are matched as suffixes of relation
//! labels, so both `arg0` and `0` are usable entries.
//!
//! A table is loaded once at startup and shared read-only, usually behind
//! an `Arc`.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{info, warn};

use crate::error::ResourceError;

/// Immutable predicate -> roles lookup.
#[derive(Debug, Clone, Default)]
pub struct RoleSets {
    table: HashMap<String, Vec<String>>,
}

impl RoleSets {
    pub fn new() -> Self {
        RoleSets::default()
    }

    /// Loads a role-set file from disk.
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let file = std::fs::File::open(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            ResourceError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if table.is_empty() {
            return Err(ResourceError::Empty {
                path: path.to_path_buf(),
            });
        }
        info!(path = %path.display(), predicates = table.len(), "loaded role sets");
        Ok(table)
    }

    /// Parses records from `reader`. Blank lines and `#` comments are
    /// ignored; records without any role are skipped with a warning.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut table = RoleSets::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',').map(str::trim);
            let predicate = fields.next().unwrap_or_default();
            let roles: Vec<&str> = fields.filter(|f| !f.is_empty()).collect();
            if predicate.is_empty() || roles.is_empty() {
                warn!(line = lineno + 1, record = line, "skipping malformed role-set record");
                continue;
            }
            table.insert(predicate, roles);
        }
        Ok(table)
    }

    pub fn insert<S: AsRef<str>>(&mut self, predicate: &str, roles: impl IntoIterator<Item = S>) {
        self.table.insert(
            predicate.to_lowercase(),
            roles.into_iter().map(|r| r.as_ref().to_lowercase()).collect(),
        );
    }

    /// Roles accepted by `predicate`, if it is known.
    pub fn get(&self, predicate: &str) -> Option<&[String]> {
        self.table.get(&predicate.to_lowercase()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_records_and_skip_malformed() {
        let data = "# comment\narrive-01,0,1\n\nbroken\nsee-01, arg0 , arg1,\n";
        let table = RoleSets::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("arrive-01").unwrap(), &["0", "1"]);
        assert_eq!(table.get("SEE-01").unwrap(), &["arg0", "arg1"]);
        assert!(table.get("broken").is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "arrive-01,0,1").unwrap();
        let table = RoleSets::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn load_empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            RoleSets::load(file.path()),
            Err(ResourceError::Empty { .. })
        ));
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RoleSets::load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }
}
