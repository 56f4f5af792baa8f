//! Application context and document path resolution.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};

use tomlforms::{EditorOptions, SchemaFetch};

use crate::{schema_source::SchemaSource, utils::StarshipPreview};

/// Environment variable that overrides the document location.
pub const CONFIG_ENV: &str = "STARSHIP_CONFIG";

/// Pick the document path.
///
/// A non-empty `env_override` wins. Otherwise the first candidate that exists
/// is used, and failing that the first candidate, where a new file will be
/// created on save.
pub fn resolve_config_path(env_override: Option<OsString>, candidates: &[PathBuf]) -> PathBuf {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    candidates
        .iter()
        .find(|p| p.is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("starship.toml"))
}

/// Platform locations searched for the document, in order.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("starship.toml"));
    }
    if let Some(config) = dirs::config_dir() {
        candidates.push(config.join("starship.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("starship").join("starship.toml"));
    }
    candidates.dedup();
    candidates
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Document to read and write.
    pub config_path: PathBuf,
    /// Where the schema comes from; `None` when running offline.
    pub schema: Option<SchemaSource>,
    /// Prompt binary used for previews.
    pub program: String,
    /// Copy the existing file aside before saving.
    pub backup: bool,
}

impl AppContext {
    /// Context with the document path resolved from the environment unless
    /// `explicit` is given.
    pub fn new(
        explicit: Option<PathBuf>,
        schema: Option<SchemaSource>,
        program: impl Into<String>,
        backup: bool,
    ) -> Self {
        let config_path = explicit.unwrap_or_else(|| {
            resolve_config_path(env::var_os(CONFIG_ENV), &default_candidates())
        });
        debug!("using config {}", config_path.display());
        Self {
            config_path,
            schema,
            program: program.into(),
            backup,
        }
    }

    /// The document path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Preview runner for the configured prompt binary.
    pub fn preview_runner(&self) -> StarshipPreview {
        StarshipPreview::new(&self.program)
    }

    /// Schema download to start with the editor.
    pub fn schema_fetch(&self) -> Option<SchemaFetch> {
        self.schema
            .clone()
            .map(|source| -> SchemaFetch { Box::pin(source.fetch()) })
    }

    /// Options for the interactive editor.
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            config: self.config_path.clone(),
            backup: self.backup,
            schema: self.schema_fetch(),
            runner: Arc::new(self.preview_runner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_env_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.toml");
        fs::write(&existing, "").unwrap();
        let path = resolve_config_path(Some("/custom/prompt.toml".into()), &[existing]);
        assert_eq!(path, PathBuf::from("/custom/prompt.toml"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let candidates = [PathBuf::from("/nonexistent/one.toml")];
        assert_eq!(resolve_config_path(Some(OsString::new()), &candidates), candidates[0]);
    }

    #[test]
    fn test_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        fs::write(&second, "").unwrap();
        assert_eq!(resolve_config_path(None, &[first.clone(), second.clone()]), second);

        fs::write(&first, "").unwrap();
        assert_eq!(resolve_config_path(None, &[first.clone(), second]), first);
    }

    #[test]
    fn test_falls_back_to_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        assert_eq!(resolve_config_path(None, &[first.clone(), second]), first);
    }

    #[test]
    fn test_explicit_path_skips_lookup() {
        let ctx = AppContext::new(Some("my.toml".into()), None, "starship", false);
        assert_eq!(ctx.config_path(), Path::new("my.toml"));
        assert!(ctx.schema_fetch().is_none());
    }
}
