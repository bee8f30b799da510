//! Shared command context passed into command families.

use crate::knowledge::RepoLayout;
use crate::runtime::config::{ConfigLoader, KbConfig, CONFIG_FILE_NAME};
use crate::runtime::error::{KbError, KbResult};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default repository root.
pub const ROOT_ENV_VAR: &str = "RISKKB_ROOT";

/// Shared execution context for riskkb command families.
///
/// Holds the resolved knowledge-base root and its directory layout. The tool
/// never derives the root from its own install location; resolution is an
/// explicit rule: positional argument, then [`ROOT_ENV_VAR`], then the current
/// working directory.
#[derive(Clone, Debug)]
pub struct CommandContext {
    root: PathBuf,
    layout: RepoLayout,
}

impl CommandContext {
    /// Resolve a command context from an optional root argument.
    ///
    /// The resolved root must exist and be a directory. An optional
    /// `riskkb.toml` at the root may relocate the layout directories.
    pub fn resolve(root_arg: Option<PathBuf>) -> KbResult<Self> {
        let root = match root_arg {
            Some(root) => root,
            None => match env::var_os(ROOT_ENV_VAR) {
                Some(value) => PathBuf::from(value),
                None => env::current_dir().map_err(|err| {
                    KbError::environment(format!("failed to resolve working directory: {err}"))
                })?,
            },
        };

        if !root.is_dir() {
            return Err(KbError::environment("repository root is not a directory")
                .with_path(&root)
                .with_hint("pass an explicit root argument or set RISKKB_ROOT"));
        }

        let config = ConfigLoader::<KbConfig>::new(&root, CONFIG_FILE_NAME).load_if_present()?;
        let layout = RepoLayout::new(root.clone(), config.unwrap_or_default());
        Ok(Self { root, layout })
    }

    /// Knowledge-base root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory layout of the knowledge base.
    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_test_root() -> PathBuf {
        std::env::temp_dir().join(format!(
            "riskkb-context-test-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ))
    }

    #[test]
    fn resolve_accepts_existing_root_argument() {
        let root = unique_test_root();
        fs::create_dir_all(&root).expect("create root");

        let ctx = CommandContext::resolve(Some(root.clone())).expect("resolve context");
        assert_eq!(ctx.root(), root.as_path());
        assert_eq!(ctx.layout().domains_root(), root.join("domains"));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn resolve_rejects_missing_root() {
        let root = unique_test_root();
        let err = CommandContext::resolve(Some(root)).expect_err("missing root should fail");
        assert!(err.to_string().contains("repository root"));
    }

    #[test]
    fn resolve_applies_layout_overrides_from_config() {
        let root = unique_test_root();
        fs::create_dir_all(&root).expect("create root");
        fs::write(root.join(CONFIG_FILE_NAME), "incidents_dir = \"postmortems\"\n")
            .expect("write config");

        let ctx = CommandContext::resolve(Some(root.clone())).expect("resolve context");
        assert_eq!(ctx.layout().incidents_root(), root.join("postmortems"));
        assert_eq!(ctx.layout().domains_root(), root.join("domains"));

        let _ = fs::remove_dir_all(root);
    }
}
