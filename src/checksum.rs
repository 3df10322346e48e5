//! MD5 fingerprints of file content.
//!
//! The digest is a change detector for comparing copies of the same tree on different
//! machines, not an integrity guarantee against tampering.

use crate::error::AuditError;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Md5Digest(pub [u8; 16]);

impl Md5Digest {
    pub fn of(data: &[u8]) -> Self {
        Md5Digest(Md5::digest(data).into())
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

/// Lowercase hex, 32 characters.
impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Reads the whole file into memory and digests it.
pub fn md5_file(path: &Path) -> Result<Md5Digest, AuditError> {
    let contents = fs::read(path).map_err(|e| AuditError::read(path, e))?;
    Ok(Md5Digest::of(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            Md5Digest::of(b"hello").to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            Md5Digest::of(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn single_byte_change_changes_digest() {
        assert_ne!(Md5Digest::of(b"hello"), Md5Digest::of(b"hellp"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = md5_file(Path::new("/nonexistent/file")).unwrap_err();
        assert!(matches!(err, AuditError::Read { .. }));
    }
}
