//! Knowledge index loading and writing.
//!
//! The index document routes keywords to domains. Two on-disk shapes are
//! semantically identical and must be accepted transparently: a bare sequence
//! of entries, or a mapping with a `definitions` key holding that sequence.
//! The loader records which shape it saw so the writer can round-trip the
//! original shape instead of silently converting it.
//!
//! Entries are surfaced as raw values on load: a structurally broken entry
//! must become a finding during validation, not a parse abort here.

use crate::knowledge::{Finding, FindingKind, RepoLayout};
use crate::runtime::error::{KbError, KbResult};
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;

/// Accepted index file names under the indexes directory, in probe order.
pub const INDEX_FILE_CANDIDATES: &[&str] = &[
    "knowledge-index.yml",
    "knowledge-index.yaml",
    "knowledge-index.json",
];

/// Which of the two equivalent on-disk index shapes was read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexShape {
    /// The document root is the entry sequence itself.
    BareList,
    /// The document root is a mapping with a `definitions` sequence.
    Definitions,
}

/// A loaded knowledge index: source path, source shape, and raw entries.
#[derive(Clone, Debug)]
pub struct LoadedIndex {
    pub path: PathBuf,
    pub shape: IndexShape,
    pub entries: Vec<Value>,
}

/// Why an index could not be loaded.
///
/// Neither case is fatal to a validation run: the caller converts the failure
/// into a finding and the remaining checks still execute.
#[derive(Clone, Debug)]
pub enum IndexLoadError {
    /// No index file exists at any accepted candidate path.
    Missing { searched: PathBuf },
    /// The index exists but is unparsable or has the wrong top-level shape.
    Malformed { path: PathBuf, message: String },
}

impl IndexLoadError {
    /// Convert the load failure into its error finding.
    pub fn into_finding(self, layout: &RepoLayout) -> Finding {
        match self {
            IndexLoadError::Missing { searched } => Finding::error(
                FindingKind::MissingArtifact,
                layout.rel(&searched),
                "knowledge index not found",
            ),
            IndexLoadError::Malformed { path, message } => {
                Finding::error(FindingKind::MalformedIndex, layout.rel(&path), message)
            }
        }
    }
}

/// Locate and parse the knowledge index.
///
/// YAML and JSON sources go through the same parser; JSON is a YAML subset.
pub fn load_index(layout: &RepoLayout) -> Result<LoadedIndex, IndexLoadError> {
    let Some(path) = find_index_file(layout) else {
        return Err(IndexLoadError::Missing {
            searched: layout.indexes_root().join(INDEX_FILE_CANDIDATES[0]),
        });
    };

    let text = fs::read_to_string(&path).map_err(|err| IndexLoadError::Malformed {
        path: path.clone(),
        message: format!("failed to read index: {err}"),
    })?;

    let value: Value = serde_yaml::from_str(&text).map_err(|err| IndexLoadError::Malformed {
        path: path.clone(),
        message: format!("invalid index syntax: {err}"),
    })?;

    let (shape, entries) = match value {
        Value::Sequence(entries) => (IndexShape::BareList, entries),
        Value::Mapping(mapping) => match mapping.get("definitions").and_then(Value::as_sequence) {
            Some(entries) => (IndexShape::Definitions, entries.clone()),
            None => {
                return Err(IndexLoadError::Malformed {
                    path,
                    message: "index root must be a list or have a 'definitions' key with a list"
                        .to_string(),
                })
            }
        },
        _ => {
            return Err(IndexLoadError::Malformed {
                path,
                message: "index root must be a list or have a 'definitions' key with a list"
                    .to_string(),
            })
        }
    };

    Ok(LoadedIndex {
        path,
        shape,
        entries,
    })
}

/// First existing index file candidate, if any.
pub fn find_index_file(layout: &RepoLayout) -> Option<PathBuf> {
    let indexes_root = layout.indexes_root();
    INDEX_FILE_CANDIDATES
        .iter()
        .map(|name| indexes_root.join(name))
        .find(|candidate| candidate.is_file())
}

/// Typed index entry, used by the writer path.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexEntry {
    pub domain_name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub related_files: RelatedFiles,
}

/// Paths an index entry routes to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelatedFiles {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_risks: Vec<String>,
    pub domain_knowledge: Vec<String>,
}

/// Serialize the index back to its source path in its source shape.
pub fn write_index(index: &LoadedIndex) -> KbResult<()> {
    let root = match index.shape {
        IndexShape::BareList => Value::Sequence(index.entries.clone()),
        IndexShape::Definitions => {
            let mut mapping = serde_yaml::Mapping::new();
            mapping.insert(
                Value::String("definitions".to_string()),
                Value::Sequence(index.entries.clone()),
            );
            Value::Mapping(mapping)
        }
    };

    let is_json = index
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let body = if is_json {
        let json = yaml_to_json(&root).ok_or_else(|| {
            KbError::io("index contains values not representable as JSON").with_path(&index.path)
        })?;
        let mut body = serde_json::to_string_pretty(&json)
            .map_err(|err| KbError::io(format!("failed to serialize index: {err}")))?;
        body.push('\n');
        body
    } else {
        serde_yaml::to_string(&root)
            .map_err(|err| KbError::io(format!("failed to serialize index: {err}")))?
    };

    if let Some(parent) = index.path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            KbError::io(format!("failed to create {}: {err}", parent.display()))
        })?;
    }
    fs::write(&index.path, body)
        .map_err(|err| KbError::io(format!("failed to write {}: {err}", index.path.display())))
}

fn yaml_to_json(value: &Value) -> Option<serde_json::Value> {
    match value {
        Value::Null => Some(serde_json::Value::Null),
        Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(serde_json::Value::from(i))
            } else {
                n.as_f64().map(serde_json::Value::from)
            }
        }
        Value::String(s) => Some(serde_json::Value::String(s.clone())),
        Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json)
            .collect::<Option<Vec<_>>>()
            .map(serde_json::Value::Array),
        Value::Mapping(mapping) => {
            let mut out = serde_json::Map::new();
            for (key, item) in mapping {
                let key = key.as_str()?.to_string();
                out.insert(key, yaml_to_json(item)?);
            }
            Some(serde_json::Value::Object(out))
        }
        Value::Tagged(_) => None,
    }
}

/// String field of a raw index entry.
pub(crate) fn entry_str<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

/// Sequence field of a raw index entry.
pub(crate) fn entry_seq<'a>(entry: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    entry.get(key).and_then(Value::as_sequence)
}
