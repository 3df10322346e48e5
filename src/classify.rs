//! Content sniffing.
//!
//! A file is labelled with a MIME-style string by looking at its leading bytes, never at its
//! name. Known signatures are matched first; anything unrecognised is handed to
//! `content_inspector`, which separates text encodings from opaque binary data.
//!
//! Only the [`OCTET_STREAM`] label counts as [`ContentClass::Binary`]. Executable and object
//! formats carry that label because their bytes differ between machines after prelinking, so
//! a checksum of them says nothing useful.

use crate::error::AuditError;
use crate::options::AuditOptions;
use content_inspector::ContentType;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// The label reserved for opaque binary streams.
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const EMPTY: &str = "inode/x-empty";
pub const TEXT_PLAIN: &str = "text/plain";

const SNIFF_LEN: u64 = 8192;

const BUILTIN_SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"\x7fELF", OCTET_STREAM),
    (0, &[0xfe, 0xed, 0xfa, 0xce], OCTET_STREAM),
    (0, &[0xce, 0xfa, 0xed, 0xfe], OCTET_STREAM),
    (0, &[0xfe, 0xed, 0xfa, 0xcf], OCTET_STREAM),
    (0, &[0xcf, 0xfa, 0xed, 0xfe], OCTET_STREAM),
    // fat Mach-O and Java class files share this magic
    (0, &[0xca, 0xfe, 0xba, 0xbe], OCTET_STREAM),
    (0, b"MZ", OCTET_STREAM),
    (0, b"!<arch>\n", OCTET_STREAM),
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, &[0xff, 0xd8, 0xff], "image/jpeg"),
    (0, b"%PDF-", "application/pdf"),
    (0, &[0x1f, 0x8b], "application/gzip"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"BZh", "application/x-bzip2"),
    (0, &[0xfd, b'7', b'z', b'X', b'Z', 0x00], "application/x-xz"),
    (0, &[0x28, 0xb5, 0x2f, 0xfd], "application/zstd"),
    (0, b"SQLite format 3\0", "application/vnd.sqlite3"),
    (257, b"ustar", "application/x-tar"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentClass {
    Textual,
    Binary,
}

impl ContentClass {
    pub fn from_label(label: &str) -> Self {
        if label == OCTET_STREAM {
            ContentClass::Binary
        } else {
            ContentClass::Textual
        }
    }
}

/// A byte pattern expected at a fixed offset, and the label it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub offset: usize,
    pub magic: Vec<u8>,
    pub label: String,
}

impl Signature {
    pub fn new(offset: usize, magic: impl Into<Vec<u8>>, label: impl Into<String>) -> Self {
        Self {
            offset,
            magic: magic.into(),
            label: label.into(),
        }
    }

    fn matches(&self, head: &[u8]) -> bool {
        self.offset
            .checked_add(self.magic.len())
            .and_then(|end| head.get(self.offset..end))
            == Some(self.magic.as_slice())
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    signatures: Vec<Signature>,
}

impl Classifier {
    /// Builds the signature database. Signatures from `extra`, if given, take precedence
    /// over the built-in ones.
    ///
    /// # Errors
    ///
    /// [`AuditError::FatalInit`] if `extra` cannot be read or contains a malformed line.
    pub fn new(extra: Option<&Path>) -> Result<Self, AuditError> {
        let mut signatures = match extra {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| AuditError::FatalInit {
                    message: format!("cannot read signature file {}: {}", path.display(), e),
                })?;
                let parsed = parse_signatures(&text).map_err(|e| AuditError::FatalInit {
                    message: format!("{}: {}", path.display(), e),
                })?;
                tracing::debug!(
                    count = parsed.len(),
                    "loaded signatures from {}",
                    path.display()
                );
                parsed
            }
            None => Vec::new(),
        };
        signatures.extend(
            BUILTIN_SIGNATURES
                .iter()
                .map(|&(offset, magic, label)| Signature::new(offset, magic, label)),
        );
        Ok(Self { signatures })
    }

    pub fn from_options(options: &AuditOptions) -> Result<Self, AuditError> {
        Self::new(options.signature_file.as_deref())
    }

    /// Labels a file by its leading bytes, following symlinks.
    pub fn sniff(&self, path: &Path) -> Result<&str, AuditError> {
        let file = File::open(path).map_err(|e| AuditError::classification(path, e))?;
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN)
            .read_to_end(&mut head)
            .map_err(|e| AuditError::classification(path, e))?;
        let label = self.label_bytes(&head);
        tracing::debug!("{}: {}", path.display(), label);
        Ok(label)
    }

    pub fn classify(&self, path: &Path) -> Result<ContentClass, AuditError> {
        self.sniff(path).map(ContentClass::from_label)
    }

    pub fn label_bytes(&self, head: &[u8]) -> &str {
        if let Some(sig) = self.signatures.iter().find(|sig| sig.matches(head)) {
            return &sig.label;
        }
        if head.is_empty() {
            return EMPTY;
        }
        match content_inspector::inspect(head) {
            ContentType::BINARY => OCTET_STREAM,
            ContentType::UTF_16LE => "text/plain; charset=utf-16le",
            ContentType::UTF_16BE => "text/plain; charset=utf-16be",
            ContentType::UTF_32LE => "text/plain; charset=utf-32le",
            ContentType::UTF_32BE => "text/plain; charset=utf-32be",
            _ => TEXT_PLAIN,
        }
    }
}

/// Parses `offset:hexbytes:label` lines. Blank lines and `#` comments are ignored.
pub fn parse_signatures(text: &str) -> Result<Vec<Signature>, AuditError> {
    let mut signatures = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let invalid = |message: &str| AuditError::InvalidSignature {
            line: idx + 1,
            message: message.to_string(),
        };
        let mut parts = line.splitn(3, ':');
        let (Some(offset), Some(hex), Some(label)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected offset:hexbytes:label"));
        };
        let offset = offset
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("offset is not a number"))?;
        let magic = decode_hex(hex.trim()).ok_or_else(|| invalid("magic is not valid hex"))?;
        let label = label.trim();
        if magic.is_empty() || label.is_empty() {
            return Err(invalid("magic and label must not be empty"));
        }
        signatures.push(Signature::new(offset, magic, label));
    }
    Ok(signatures)
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}
