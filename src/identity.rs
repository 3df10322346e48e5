//! Numeric uid/gid to account name resolution.
//!
//! Names come from the colon-separated account databases (`/etc/passwd`, `/etc/group`):
//! field 0 is the name and field 2 the numeric id. Both tables are parsed together, once,
//! on the first lookup through a given [`IdentityResolver`], and are read-only afterwards.

use crate::options::AuditOptions;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Default)]
struct IdentityTables {
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
}

/// Lazily built uid → user and gid → group lookup.
///
/// Construction is free; the databases are read on the first call to [`user`](Self::user)
/// or [`group`](Self::group). Concurrent first callers block until the single build
/// finishes. Unknown ids resolve to the empty string.
#[derive(Debug)]
pub struct IdentityResolver {
    passwd_path: PathBuf,
    group_path: PathBuf,
    tables: OnceLock<IdentityTables>,
}

impl IdentityResolver {
    pub fn new(passwd_path: impl Into<PathBuf>, group_path: impl Into<PathBuf>) -> Self {
        Self {
            passwd_path: passwd_path.into(),
            group_path: group_path.into(),
            tables: OnceLock::new(),
        }
    }

    pub fn from_options(options: &AuditOptions) -> Self {
        Self::new(options.passwd_path.clone(), options.group_path.clone())
    }

    pub fn user(&self, uid: u32) -> &str {
        self.tables()
            .users
            .get(&uid)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn group(&self, gid: u32) -> &str {
        self.tables()
            .groups
            .get(&gid)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether the databases have been read yet.
    pub fn is_loaded(&self) -> bool {
        self.tables.get().is_some()
    }

    fn tables(&self) -> &IdentityTables {
        self.tables.get_or_init(|| {
            let tables = IdentityTables {
                users: load_id_database(&self.passwd_path),
                groups: load_id_database(&self.group_path),
            };
            tracing::debug!(
                users = tables.users.len(),
                groups = tables.groups.len(),
                "identity tables loaded"
            );
            tables
        })
    }
}

/// Reads an account database, yielding an empty table if it cannot be opened.
fn load_id_database(path: &Path) -> HashMap<u32, String> {
    match File::open(path) {
        Ok(file) => parse_id_database(BufReader::new(file)),
        Err(e) => {
            tracing::debug!("Unable to open {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parses `name:x:id:...` records.
///
/// Lines with fewer than three fields or a non-numeric id are skipped. When an id appears
/// more than once, the last record wins. A read error ends parsing with what was collected.
pub fn parse_id_database(reader: impl BufRead) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for line in reader.split(b'\n') {
        let Ok(line) = line else { break };
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');
        let mut fields = line.split(':');
        let (Some(name), Some(_), Some(id)) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };
        if let Ok(id) = id.parse::<u32>() {
            map.insert(id, name.to_string());
        }
    }
    map
}
