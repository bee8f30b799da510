//! Typed configuration loading helpers.

use crate::runtime::error::{KbError, KbResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File name of the optional repository-local tool configuration.
pub const CONFIG_FILE_NAME: &str = "riskkb.toml";

/// Optional overrides for the knowledge-base directory layout.
///
/// Every field defaults to the canonical layout documented in
/// [`RepoLayout`](crate::knowledge::RepoLayout); a config file only needs to
/// name the directories it relocates.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KbConfig {
    /// Directory holding `<domain>/spec.md` and `<domain>/risks.md`.
    pub domains_dir: Option<String>,
    /// Directory holding incident records.
    pub incidents_dir: Option<String>,
    /// Directory holding shared cross-domain risk documents.
    pub common_risks_dir: Option<String>,
    /// Directory holding the knowledge index document.
    pub indexes_dir: Option<String>,
}

/// Generic TOML-backed config loader.
///
/// `ConfigLoader<T>` handles only filesystem access and TOML deserialization.
/// Consuming commands are still responsible for semantic validation after the
/// typed value is loaded.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for the given root-relative path.
    pub fn new(root: &Path, relative_path: &str) -> Self {
        Self {
            path: root.join(relative_path),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    ///
    /// Missing files, unreadable files, and TOML parse failures are all
    /// surfaced as [`KbErrorCategory::Config`](crate::runtime::error::KbErrorCategory::Config).
    pub fn load(&self) -> KbResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| {
            KbError::config(format!("failed to read {}: {err}", self.path.display()))
        })?;
        toml::from_str(&body).map_err(|err| {
            KbError::config(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    /// Load the configuration file when it exists, `None` otherwise.
    ///
    /// A present-but-invalid file is still a hard config error; silently
    /// ignoring a broken file would mask layout overrides.
    pub fn load_if_present(&self) -> KbResult<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        self.load().map(Some)
    }

    /// Return the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
