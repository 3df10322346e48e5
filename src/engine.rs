use crate::classify::ContentClass;
use crate::error::AuditError;
use crate::options::AuditOptions;
use crate::report::{EntryReport, Reporter};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
struct Walker {
    root: PathBuf,
    inner: ignore::Walk,
}
impl Walker {
    fn new(root: PathBuf, options: &AuditOptions, root_is_link: bool) -> Self {
        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .follow_links(options.follow_links);
        // a symlinked root is reported through the link but, like any other link, not entered
        if root_is_link && !options.follow_links {
            builder.max_depth(Some(0));
        }
        if options.sort_entries {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }
        Self {
            inner: builder.build(),
            root,
        }
    }
    /// Returns `None` when the root itself cannot be reached; nothing is reported for it.
    fn open(root: PathBuf, options: &AuditOptions) -> Option<Self> {
        let root_is_link = match fs::symlink_metadata(&root) {
            Ok(metadata) => metadata.file_type().is_symlink(),
            Err(e) => {
                tracing::warn!("{}", AuditError::walk(&root, e));
                return None;
            }
        };
        tracing::debug!("Walking {}", root.display());
        Some(Self::new(root, options, root_is_link))
    }
}
/// Counters for one run over all roots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Roots that existed and were walked.
    pub roots: usize,
    /// Lines emitted.
    pub entries: usize,
    pub checksummed: usize,
    pub binary: usize,
    /// Entries visited but not reported.
    pub skipped: usize,
    /// Missing roots and unreadable subtrees.
    pub walk_errors: usize,
}
impl AuditSummary {
    fn record(&mut self, report: &EntryReport) {
        self.entries += 1;
        if report.md5.is_some() {
            self.checksummed += 1;
        }
        if report.content == Some(ContentClass::Binary) {
            self.binary += 1;
        }
    }
}
/// Lazily yields one [`EntryReport`] per visited entry, root by root, depth-first.
///
/// Per-entry and per-subtree failures are logged and skipped; the iterator only ends when
/// every root has been walked.
pub struct AuditStream {
    roots: std::vec::IntoIter<PathBuf>,
    current: Option<Walker>,
    options: AuditOptions,
    reporter: Reporter,
    summary: AuditSummary,
}
impl AuditStream {
    /// # Errors
    ///
    /// [`AuditError::FatalInit`] if the content classifier cannot be built. No path is
    /// touched before this check.
    pub fn new(options: AuditOptions) -> Result<Self, AuditError> {
        let reporter = Reporter::from_options(&options).inspect_err(|e| {
            tracing::error!("{}", e);
        })?;
        Ok(Self::with_reporter(options, reporter))
    }
    pub fn with_reporter(mut options: AuditOptions, reporter: Reporter) -> Self {
        let roots = std::mem::take(&mut options.roots).into_iter();
        Self {
            roots,
            current: None,
            options,
            reporter,
            summary: AuditSummary::default(),
        }
    }
    pub fn summary(&self) -> AuditSummary {
        self.summary
    }
    fn visit(&mut self, path: &Path) -> Option<EntryReport> {
        match self.reporter.report(path) {
            Some(report) => {
                self.summary.record(&report);
                Some(report)
            }
            None => {
                self.summary.skipped += 1;
                None
            }
        }
    }
}
impl Iterator for AuditStream {
    type Item = EntryReport;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(walker) = self.current.as_mut() else {
                let root = self.roots.next()?;
                self.current = Walker::open(root, &self.options);
                match self.current {
                    Some(_) => self.summary.roots += 1,
                    None => self.summary.walk_errors += 1,
                }
                continue;
            };
            match walker.inner.next() {
                Some(Ok(entry)) => {
                    if let Some(report) = self.visit(entry.path()) {
                        return Some(report);
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("{}", AuditError::walk(&walker.root, e));
                    self.summary.walk_errors += 1;
                }
                None => self.current = None,
            }
        }
    }
}
/// Walks every root in `options` and writes one line per entry to `out`.
///
/// # Errors
///
/// Fails on classifier initialization or when `out` stops accepting writes. Nothing
/// that happens to an individual path is an error here.
pub fn audit<W: Write>(options: AuditOptions, mut out: W) -> Result<AuditSummary, AuditError> {
    let mut stream = AuditStream::new(options)?;
    for report in stream.by_ref() {
        report
            .write_line(&mut out)
            .map_err(|source| AuditError::Write { source })?;
    }
    out.flush().map_err(|source| AuditError::Write { source })?;
    Ok(stream.summary())
}
/// Like [`audit`], collecting the output. Paths that are not valid UTF-8 are rendered lossily.
pub fn audit_to_string(options: AuditOptions) -> Result<String, AuditError> {
    let mut buf = Vec::new();
    audit(options, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
