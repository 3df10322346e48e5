use serde::{Deserialize, Serialize};
use std::path::PathBuf;
pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";
pub const DEFAULT_GROUP_PATH: &str = "/etc/group";
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOptions {
    pub roots: Vec<PathBuf>,
    pub passwd_path: PathBuf,
    pub group_path: PathBuf,
    pub signature_file: Option<PathBuf>,
    pub sort_entries: bool,
    pub follow_links: bool,
}
impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            passwd_path: PathBuf::from(DEFAULT_PASSWD_PATH),
            group_path: PathBuf::from(DEFAULT_GROUP_PATH),
            signature_file: None,
            sort_entries: false,
            follow_links: false,
        }
    }
}
#[derive(Debug, Default)]
pub struct AuditBuilder {
    options: AuditOptions,
}
impl AuditBuilder {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            options: AuditOptions {
                roots: roots.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.options.roots.push(root.into());
        self
    }
    pub fn passwd_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.passwd_path = path.into();
        self
    }
    pub fn group_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.group_path = path.into();
        self
    }
    pub fn signature_file(mut self, path: Option<PathBuf>) -> Self {
        self.options.signature_file = path;
        self
    }
    pub fn sort_entries(mut self, yes: bool) -> Self {
        self.options.sort_entries = yes;
        self
    }
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.options.follow_links = yes;
        self
    }
    pub fn build(self) -> AuditOptions {
        self.options
    }
}
