//! Knowledge-base domain model: repository layout, diagnostics, and scanning.
//!
//! The knowledge base is a plain directory tree: domain folders with spec and
//! risk documents, incident records, shared common-risk documents, and a
//! keyword-routing index. Everything in this module is reconstructed from disk
//! on every run; the tool keeps no persistent state.

pub mod checks;
pub mod index;
pub mod links;
pub mod report;
pub mod sections;

use crate::runtime::config::KbConfig;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Default directory holding domain folders.
pub const DEFAULT_DOMAINS_DIR: &str = "domains";
/// Default directory holding incident records.
pub const DEFAULT_INCIDENTS_DIR: &str = "incidents";
/// Default directory holding shared cross-domain risk documents.
pub const DEFAULT_COMMON_RISKS_DIR: &str = "common-risks";
/// Default directory holding the knowledge index document.
pub const DEFAULT_INDEXES_DIR: &str = "indexes";

/// File name of a domain specification document.
pub const SPEC_FILE_NAME: &str = "spec.md";
/// File name of a domain risk-assessment document.
pub const RISKS_FILE_NAME: &str = "risks.md";

/// Diagnostic severity.
///
/// Warnings flag quality issues (overlapping routing keywords, unmirrored
/// backlinks, thin risk entries) that never affect the process exit status;
/// errors mark structural defects and fail the run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Stable defect taxonomy for knowledge-base findings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FindingKind {
    /// Expected file or directory is absent.
    MissingArtifact,
    /// Unparsable or wrong-shaped index document.
    MalformedIndex,
    /// Required structural field or section is absent.
    MissingField,
    /// Domain name or routing keyword collision.
    DuplicateKey,
    /// Declared or linked path does not exist.
    DanglingReference,
    /// One-directional reference between documents.
    UnmirroredBacklink,
}

impl FindingKind {
    /// Stable machine-readable name, used by the JSON report.
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::MissingArtifact => "missing_artifact",
            FindingKind::MalformedIndex => "malformed_index",
            FindingKind::MissingField => "missing_field",
            FindingKind::DuplicateKey => "duplicate_key",
            FindingKind::DanglingReference => "dangling_reference",
            FindingKind::UnmirroredBacklink => "unmirrored_backlink",
        }
    }
}

/// A single diagnostic: severity, defect kind, subject path, and message.
///
/// Findings accumulate across the whole scan; one malformed document never
/// aborts validation of the rest of the corpus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Finding {
    /// Diagnostic severity.
    pub severity: Severity,
    /// Defect taxonomy entry.
    pub kind: FindingKind,
    /// Root-relative path of the subject artifact.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Create an error-severity finding.
    pub fn error(kind: FindingKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-severity finding.
    pub fn warning(kind: FindingKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Directory layout of a knowledge-base repository.
///
/// All paths the validators touch are derived from this layout, so tests and
/// relocated repositories (`riskkb.toml` overrides) share one resolution rule.
#[derive(Clone, Debug)]
pub struct RepoLayout {
    root: PathBuf,
    domains_dir: String,
    incidents_dir: String,
    common_risks_dir: String,
    indexes_dir: String,
}

impl RepoLayout {
    /// Build a layout for `root`, applying any configured overrides.
    pub fn new(root: PathBuf, config: KbConfig) -> Self {
        Self {
            root,
            domains_dir: config
                .domains_dir
                .unwrap_or_else(|| DEFAULT_DOMAINS_DIR.to_string()),
            incidents_dir: config
                .incidents_dir
                .unwrap_or_else(|| DEFAULT_INCIDENTS_DIR.to_string()),
            common_risks_dir: config
                .common_risks_dir
                .unwrap_or_else(|| DEFAULT_COMMON_RISKS_DIR.to_string()),
            indexes_dir: config
                .indexes_dir
                .unwrap_or_else(|| DEFAULT_INDEXES_DIR.to_string()),
        }
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding domain folders.
    pub fn domains_root(&self) -> PathBuf {
        self.root.join(&self.domains_dir)
    }

    /// Directory holding incident records.
    pub fn incidents_root(&self) -> PathBuf {
        self.root.join(&self.incidents_dir)
    }

    /// Directory holding shared cross-domain risk documents.
    pub fn common_risks_root(&self) -> PathBuf {
        self.root.join(&self.common_risks_dir)
    }

    /// Directory holding the knowledge index document.
    pub fn indexes_root(&self) -> PathBuf {
        self.root.join(&self.indexes_dir)
    }

    /// Root-relative posix rendering of `path`, for diagnostics.
    pub fn rel(&self, path: &Path) -> String {
        rel_posix(&self.root, path)
    }
}

/// Render `path` relative to `root` with posix separators.
pub(crate) fn rel_posix(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Collect the markdown files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list; scan order must be deterministic
/// so finding order is stable across runs.
pub(crate) fn markdown_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .collect();
    files.sort();
    files
}

/// Collect the subdirectories directly inside `dir`, sorted by path.
pub(crate) fn subdirectories_of(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}
