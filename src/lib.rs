//! # fsaudit
//!
//! `fsaudit` recursively inventories filesystem subtrees. Every directory and file visited
//! becomes one line holding its permission string, size, owning user and group names, path,
//! and, for files whose content is not an opaque binary stream, an MD5 of that content:
//!
//! ```text
//! drwxr-xr-x 4096 root root /etc/ssh
//! -rw-r--r-- 3223 root root /etc/ssh/sshd_config md5=2b1a0e5c9d6f8f3a1c7e4b0d9a8f7e6c
//! -rwxr-xr-x 917192 root root /usr/sbin/sshd
//! ```
//!
//! Comparing two such listings taken on different machines shows which configuration and text
//! content diverged, without tripping over executables whose bytes differ only by linking.
//!
//! The walk is best effort. Unreadable entries and subtrees are logged through `tracing` and
//! skipped; only a classifier that cannot be constructed aborts a run.
//!
//! # Example
//!
//! ```no_run
//! use fsaudit::{AuditBuilder, audit};
//!
//! let options = AuditBuilder::new(["/etc", "/usr/local/etc"])
//!     .sort_entries(true)
//!     .build();
//!
//! let summary = audit(options, std::io::stdout().lock()).expect("audit failed");
//! eprintln!("{} entries, {} checksummed", summary.entries, summary.checksummed);
//! ```

mod checksum;
mod classify;
mod engine;
mod error;
mod identity;
mod mode;
mod options;
mod report;

pub use checksum::{Md5Digest, md5_file};
pub use classify::{Classifier, ContentClass, OCTET_STREAM, Signature, parse_signatures};
pub use engine::{AuditStream, AuditSummary, audit, audit_to_string};
pub use error::AuditError;
pub use identity::{IdentityResolver, parse_id_database};
pub use mode::permission_string;
pub use options::{AuditBuilder, AuditOptions, DEFAULT_GROUP_PATH, DEFAULT_PASSWD_PATH};
pub use report::{EntryKind, EntryReport, FileEntry, Reporter};
