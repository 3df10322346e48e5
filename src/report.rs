//! Per-entry reporting: stat, resolve owners, classify, checksum, format.

use crate::checksum::{Md5Digest, md5_file};
use crate::classify::{Classifier, ContentClass};
use crate::error::AuditError;
use crate::identity::IdentityResolver;
use crate::mode::permission_string;
use crate::options::AuditOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
    /// Devices, FIFOs, sockets, and dangling symlinks. Never opened.
    Special,
}

/// Raw status of one visited path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub mode: u32,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub kind: EntryKind,
}

impl FileEntry {
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Special
        };
        Self {
            path: path.into(),
            mode: raw_mode(metadata),
            size: metadata.len(),
            uid: owner_uid(metadata),
            gid: owner_gid(metadata),
            kind,
        }
    }
}

/// One line of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub path: PathBuf,
    pub permissions: String,
    pub size: u64,
    pub owner: String,
    pub group: String,
    pub kind: EntryKind,
    /// Set for regular files whose content was sniffed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentClass>,
    /// Set for textual files whose content could be read in full.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<Md5Digest>,
}

impl EntryReport {
    fn new(entry: FileEntry, owner: &str, group: &str) -> Self {
        Self {
            permissions: permission_string(entry.mode),
            size: entry.size,
            owner: owner.to_string(),
            group: group.to_string(),
            kind: entry.kind,
            path: entry.path,
            content: None,
            md5: None,
        }
    }

    /// Writes the line followed by a newline. Unlike [`Display`](fmt::Display), the path is
    /// written as its raw bytes on unix, so paths that are not valid UTF-8 stay distinct.
    pub fn write_line<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "{} {} {} {} ",
            self.permissions, self.size, self.owner, self.group
        )?;
        out.write_all(&path_bytes(&self.path))?;
        if let Some(digest) = &self.md5 {
            write!(out, " md5={}", digest)?;
        }
        out.write_all(b"\n")
    }
}

/// `<perms> <size> <owner> <group> <path>[ md5=<hex>]`, with the path rendered lossily.
impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.permissions,
            self.size,
            self.owner,
            self.group,
            self.path.display()
        )?;
        if let Some(digest) = &self.md5 {
            write!(f, " md5={}", digest)?;
        }
        Ok(())
    }
}

/// Builds an [`EntryReport`] for a single path.
#[derive(Debug)]
pub struct Reporter {
    identities: IdentityResolver,
    classifier: Classifier,
    digest: fn(&Path) -> Result<Md5Digest, AuditError>,
}

impl Reporter {
    pub fn new(identities: IdentityResolver, classifier: Classifier) -> Self {
        Self {
            identities,
            classifier,
            digest: md5_file,
        }
    }

    #[cfg(test)]
    fn with_digest(mut self, digest: fn(&Path) -> Result<Md5Digest, AuditError>) -> Self {
        self.digest = digest;
        self
    }

    /// # Errors
    ///
    /// Fails only when the classifier cannot be constructed.
    pub fn from_options(options: &AuditOptions) -> Result<Self, AuditError> {
        Ok(Self::new(
            IdentityResolver::from_options(options),
            Classifier::from_options(options)?,
        ))
    }

    pub fn identities(&self) -> &IdentityResolver {
        &self.identities
    }

    /// Returns `None` when nothing can be said about the path: it could not be stat'ed at
    /// all, or its content type could not be determined. Both cases are logged.
    ///
    /// A textual file that cannot be read for checksumming is still reported, without
    /// a digest.
    pub fn report(&self, path: &Path) -> Option<EntryReport> {
        let entry = stat(path)?;
        let owner = self.identities.user(entry.uid);
        let group = self.identities.group(entry.gid);
        let is_file = entry.kind == EntryKind::File;
        let mut report = EntryReport::new(entry, owner, group);
        if !is_file {
            return Some(report);
        }
        let class = match self.classifier.classify(path) {
            Ok(class) => class,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };
        report.content = Some(class);
        if class == ContentClass::Textual {
            match (self.digest)(path) {
                Ok(digest) => report.md5 = Some(digest),
                Err(e) => tracing::warn!("{}", e),
            }
        }
        Some(report)
    }
}

/// Follows symlinks; falls back to the link itself when the target is gone.
fn stat(path: &Path) -> Option<FileEntry> {
    match fs::metadata(path) {
        Ok(metadata) => Some(FileEntry::from_metadata(path, &metadata)),
        Err(e) => {
            tracing::warn!("{}", AuditError::stat(path, e));
            match fs::symlink_metadata(path) {
                Ok(metadata) => Some(FileEntry::from_metadata(path, &metadata)),
                Err(_) => None,
            }
        }
    }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    std::borrow::Cow::Owned(path.display().to_string().into_bytes())
}

#[cfg(unix)]
fn raw_mode(metadata: &Metadata) -> u32 {
    metadata.mode()
}

#[cfg(not(unix))]
fn raw_mode(metadata: &Metadata) -> u32 {
    crate::mode::synthetic_mode(metadata)
}

#[cfg(unix)]
fn owner_uid(metadata: &Metadata) -> u32 {
    metadata.uid()
}

#[cfg(not(unix))]
fn owner_uid(_metadata: &Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn owner_gid(metadata: &Metadata) -> u32 {
    metadata.gid()
}

#[cfg(not(unix))]
fn owner_gid(_metadata: &Metadata) -> u32 {
    0
}
