use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum AuditError {
    /// The content sniffing engine could not be built. Nothing is walked after this.
    #[error("Content classifier initialization failed: {message}")]
    FatalInit { message: String },
    #[error("Unable to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to walk path {path}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("Unable to determine content type of {path}: {source}")]
    Classification {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write report: {source}")]
    Write { source: std::io::Error },
    #[error("Invalid signature on line {line}: {message}")]
    InvalidSignature { line: usize, message: String },
}
impl AuditError {
    pub(crate) fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Stat {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Read {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn classification(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Classification {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn walk(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        AuditError::Walk {
            path: path.into(),
            message: message.to_string(),
        }
    }
    /// Whether this error stops the whole run rather than a single entry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::FatalInit { .. } | AuditError::Write { .. })
    }
}
