use std::{
    fmt, fs,
    future::Future,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{
    data::{
        document::Document,
        schema::Schema,
        schema_cache::{SchemaCache, SchemaStatus},
    },
    error::{FetchError, LoadError, ParseError, ProcessError, WriteError},
    filter::{Category, filter},
    preview::{PreviewRunner, render_preview},
    sync,
    widgets::{Panel, PanelKey, WidgetRegistry},
};

/// Sidebar entry standing for the top-level settings.
pub const GLOBAL_LABEL: &str = "-- Global Settings --";

/// Which editor the user changed last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditSource {
    /// Per-module panels.
    #[default]
    Panels,
    /// Full-text editor.
    RawText,
}

/// One-line notice shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Something worked.
    Info(String),
    /// Degraded but usable.
    Warning(String),
    /// An action failed.
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Info(msg) => write!(f, "{msg}"),
            Status::Warning(msg) => write!(f, "warning: {msg}"),
            Status::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Editor state: the document, its panels and everything the UI shows.
///
/// Owns the document exclusively; the sync engine and the UI only ever
/// borrow it through this type.
#[derive(Debug)]
pub struct AppData {
    /// The document being edited.
    pub document: Document,
    /// Schema, or the fallback field set until one arrives.
    pub schema: SchemaCache,
    /// Panels built so far.
    pub registry: WidgetRegistry,
    /// Whether the document has changes that are not on disk.
    pub needs_save: bool,
    /// Copy the existing file aside before overwriting it.
    pub backup: bool,
    /// Sidebar search text.
    pub query: String,
    /// Sidebar category.
    pub category: Category,
    config: PathBuf,
    raw_text: String,
    last_edit: EditSource,
    status: Option<Status>,
}

impl AppData {
    /// Open the document at `config`.
    ///
    /// A missing file starts from the default document. A file that cannot
    /// be read or parsed also does, with an error notice, and is left alone
    /// until the user saves.
    pub fn open(config: impl AsRef<Path>) -> Self {
        let config = config.as_ref().to_path_buf();
        let (document, status, needs_save) = if config.exists() {
            match Document::load(&config) {
                Ok(document) => (
                    document,
                    Status::Info(format!("Loaded {}", config.display())),
                    false,
                ),
                Err(e) => {
                    warn!("{e}");
                    (
                        Document::default_document(),
                        Status::Error(format!("{e}; showing the default configuration")),
                        false,
                    )
                }
            }
        } else {
            (
                Document::default_document(),
                Status::Info(format!(
                    "No config found at {}, starting from defaults",
                    config.display()
                )),
                true,
            )
        };
        let mut app = Self::with_document(config, document);
        app.needs_save = needs_save;
        app.status = Some(status);
        app
    }

    /// Editor state over an already parsed document.
    pub fn with_document(config: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            raw_text: document.serialize(),
            document,
            schema: SchemaCache::new(),
            registry: WidgetRegistry::new(),
            needs_save: false,
            backup: false,
            query: String::new(),
            category: Category::default(),
            config: config.into(),
            last_edit: EditSource::default(),
            status: None,
        }
    }

    /// Path the document is saved to.
    pub fn config_path(&self) -> &Path {
        &self.config
    }

    /// Latest notice, if any.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Replace the notice.
    pub fn notify(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// Start the schema fetch. See [`SchemaCache::request_fetch`].
    pub fn request_schema<F, N>(&mut self, fetch: F, notify: N)
    where
        F: Future<Output = Result<Schema, FetchError>> + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        self.schema.request_fetch(fetch, notify);
        if let SchemaStatus::Failed(e) = self.schema.status() {
            self.status = Some(Status::Warning(format!("schema unavailable: {e}")));
        }
    }

    /// Pick up a delivered schema. Returns whether anything arrived.
    pub fn poll_schema(&mut self) -> bool {
        let status = match self.schema.poll() {
            Some(SchemaStatus::Loaded) => Status::Info(
                "Schema loaded; panels opened from now on show all fields".to_string(),
            ),
            Some(SchemaStatus::Failed(e)) => {
                Status::Warning(format!("schema unavailable, using basic fields: {e}"))
            }
            Some(_) | None => return false,
        };
        self.status = Some(status);
        true
    }

    /// Modules listed in the sidebar for the current query and category.
    pub fn modules(&self) -> Vec<&'static str> {
        filter(&self.query, self.category, &self.document)
    }

    /// The panel for `key`, built on first selection.
    pub fn select(&mut self, key: &PanelKey) -> &mut Panel {
        self.registry
            .get_or_build(key, &self.schema, &self.document)
    }

    /// A panel that was already selected once.
    pub fn panel(&self, key: &PanelKey) -> Option<&Panel> {
        self.registry.get(key)
    }

    fn edit_panel<R>(&mut self, key: &PanelKey, edit: impl FnOnce(&mut Panel) -> R) -> R {
        self.last_edit = EditSource::Panels;
        let panel = self.registry.get_or_build(key, &self.schema, &self.document);
        edit(panel)
    }

    /// Switch a module on or off.
    pub fn set_enabled(&mut self, key: &PanelKey, on: bool) {
        self.edit_panel(key, |panel| panel.set_enabled(on));
    }

    /// Set a checkbox field.
    pub fn set_bool(&mut self, key: &PanelKey, field: &str, checked: bool) -> bool {
        self.edit_panel(key, |panel| panel.set_bool(field, checked))
    }

    /// Set a numeric field. Returns the value after clamping.
    pub fn set_integer(&mut self, key: &PanelKey, field: &str, value: i64) -> Option<i64> {
        self.edit_panel(key, |panel| panel.set_integer(field, value))
    }

    /// Set a text or multi-line field.
    pub fn set_text(&mut self, key: &PanelKey, field: &str, text: &str) -> bool {
        self.edit_panel(key, |panel| panel.set_text(field, text))
    }

    /// Content of the full-text editor.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Replace the full-text editor content. Applied on the next commit,
    /// where it wins over panel edits made before it.
    pub fn edit_raw(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.raw_text {
            self.raw_text = text;
            self.last_edit = EditSource::RawText;
        }
    }

    /// Whether some edit has not been committed to the document yet.
    pub fn has_pending_edits(&self) -> bool {
        self.last_edit == EditSource::RawText || self.registry.panels().any(Panel::is_touched)
    }

    /// Which editor was changed last.
    pub fn last_edit(&self) -> EditSource {
        self.last_edit
    }

    /// Bring the document up to date with the editors.
    ///
    /// If the full-text editor was changed last its text replaces the
    /// document and every panel is re-seeded. Otherwise panel edits are
    /// written back and the full text is refreshed from the document.
    pub fn commit(&mut self) -> Result<(), ParseError> {
        match self.last_edit {
            EditSource::RawText => {
                let document = Document::parse(&self.raw_text)?;
                if document.serialize() != self.document.serialize() {
                    self.needs_save = true;
                }
                self.document = document;
                sync::seed_all(&mut self.registry, &self.document);
                self.last_edit = EditSource::Panels;
            }
            EditSource::Panels => {
                let report = sync::commit(&mut self.registry, &mut self.document);
                self.needs_save |= report.changed();
                self.raw_text = self.document.serialize();
            }
        }
        Ok(())
    }

    fn backup_existing(&self) -> Result<(), WriteError> {
        if !self.backup || !self.config.exists() {
            return Ok(());
        }
        let ext = self
            .config
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("toml");
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let backup_path = self.config.with_extension(format!("bk-{secs}.{ext}"));
        fs::copy(&self.config, &backup_path).map_err(|source| WriteError::Backup {
            path: backup_path.clone(),
            source,
        })?;
        info!("backup written to {}", backup_path.display());
        Ok(())
    }

    /// Commit, then write the document to its path.
    ///
    /// On failure the document stays in memory, unsaved, and the error is
    /// also left as the status notice.
    pub fn save(&mut self) -> Result<(), WriteError> {
        let result = self
            .commit()
            .map_err(WriteError::from)
            .and_then(|()| self.backup_existing())
            .and_then(|()| self.document.write(&self.config));
        match &result {
            Ok(()) => {
                self.needs_save = false;
                info!("saved {}", self.config.display());
                self.status = Some(Status::Info(format!("Saved {}", self.config.display())));
            }
            Err(e) => {
                warn!("save failed: {e}");
                self.status = Some(Status::Error(e.to_string()));
            }
        }
        result
    }

    /// Re-read the document from disk, dropping unsaved edits.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        match Document::load(&self.config) {
            Ok(document) => {
                self.document = document;
                sync::seed_all(&mut self.registry, &self.document);
                self.raw_text = self.document.serialize();
                self.last_edit = EditSource::Panels;
                self.needs_save = false;
                self.status = Some(Status::Info(format!("Reloaded {}", self.config.display())));
                Ok(())
            }
            Err(e) => {
                self.status = Some(Status::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Commit, then render the prompt with `runner`.
    pub fn preview(&mut self, runner: &dyn PreviewRunner) -> Result<String, ProcessError> {
        let result = self
            .commit()
            .map_err(ProcessError::from)
            .and_then(|()| render_preview(&self.document, runner));
        if let Err(e) = &result {
            self.status = Some(Status::Error(e.to_string()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::data::{document::Section, value::FieldValue};

    const SAMPLE: &str = "# mine\n[git_branch]\nformat = \"on $branch\"\ndisabled = false\n";

    fn app_in(dir: &Path, text: Option<&str>) -> AppData {
        let path = dir.join("starship.toml");
        if let Some(text) = text {
            fs::write(&path, text).unwrap();
        }
        AppData::open(path)
    }

    #[test]
    fn test_open_missing_starts_from_default() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), None);
        assert!(app.needs_save);
        assert!(app.document.has_section("character"));
        assert!(matches!(app.status(), Some(Status::Info(_))));
    }

    #[test]
    fn test_open_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), Some("[git_branch\nformat = "));
        assert!(!app.needs_save);
        assert!(app.document.has_section("character"));
        assert!(matches!(app.status(), Some(Status::Error(_))));
    }

    #[test]
    fn test_save_without_edits_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        app.select(&PanelKey::module("git_branch"));
        app.select(&PanelKey::Global);
        assert!(!app.has_pending_edits());
        app.save().unwrap();
        assert_eq!(fs::read_to_string(app.config_path()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_save_writes_panel_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        let key = PanelKey::module("time");
        app.set_enabled(&key, true);
        app.set_text(&key, "symbol", "🕐 ");
        app.save().unwrap();

        let saved = fs::read_to_string(app.config_path()).unwrap();
        assert!(saved.starts_with(SAMPLE));
        assert!(saved.contains("[time]\n"));
        assert!(!app.needs_save);
        assert_eq!(app.raw_text(), saved);
    }

    #[test]
    fn test_raw_text_wins_when_touched_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        let key = PanelKey::module("git_branch");
        app.set_text(&key, "format", "via $branch");
        app.edit_raw("[git_branch]\nsymbol = \"B \"\n");
        app.commit().unwrap();

        assert_eq!(
            app.document.get(Section::Module("git_branch"), "format"),
            None
        );
        let panel = app.panel(&key).unwrap();
        assert!(!panel.is_touched());
        assert_eq!(
            panel.field("symbol").unwrap().control().value(),
            FieldValue::String("B ".into())
        );
        assert!(app.needs_save);
    }

    #[test]
    fn test_panels_win_when_touched_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        app.edit_raw("[git_branch]\nsymbol = \"B \"\n");
        app.set_text(&PanelKey::module("git_branch"), "format", "via $branch");
        app.commit().unwrap();

        assert!(app.raw_text().contains("format = \"via $branch\""));
        assert!(!app.raw_text().contains("symbol"));
    }

    #[test]
    fn test_invalid_raw_text_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        app.edit_raw("[oops");
        assert!(matches!(app.save(), Err(WriteError::Parse(_))));
        assert_eq!(fs::read_to_string(app.config_path()).unwrap(), SAMPLE);
        assert!(matches!(app.status(), Some(Status::Error(_))));
    }

    #[test]
    fn test_write_error_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let mut app = AppData::with_document(blocker.join("starship.toml"), Document::default_document());
        app.set_text(&PanelKey::module("rust"), "symbol", "R ");

        assert!(app.save().is_err());
        assert!(app.needs_save);
        assert!(app.document.has_section("rust"));
    }

    #[test]
    fn test_backup_before_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        app.backup = true;
        app.set_text(&PanelKey::module("git_branch"), "symbol", "B ");
        app.save().unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".bk-"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_reload_discards_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        let key = PanelKey::module("git_branch");
        app.set_text(&key, "format", "x");
        fs::write(app.config_path(), "[git_branch]\nformat = \"y\"\n").unwrap();

        app.reload().unwrap();
        assert_eq!(
            app.panel(&key).unwrap().field("format").unwrap().control().value(),
            FieldValue::String("y".into())
        );
        assert!(!app.needs_save);
    }

    #[test]
    fn test_preview_commits_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some(SAMPLE));
        app.set_text(&PanelKey::module("git_branch"), "symbol", "B ");
        let runner = |path: &Path| -> Result<String, ProcessError> {
            Ok(fs::read_to_string(path).unwrap())
        };

        let out = app.preview(&runner).unwrap();
        assert!(out.contains("symbol = \"B \""));
    }

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn app_without_schema(dir: &Path) -> AppData {
        let mut app = app_in(dir, Some(SAMPLE));
        app.schema.install(Err(FetchError::Transport("connection refused".into())));
        assert!(matches!(app.schema.status(), SchemaStatus::Failed(_)));
        app
    }

    #[test]
    fn test_save_and_preview_without_schema() {
        init_log();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_without_schema(dir.path());
        let key = PanelKey::module("nodejs");
        let names: Vec<_> = app.select(&key).fields().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["format", "style", "symbol", "disabled"]);
        app.set_enabled(&key, true);
        app.set_text(&key, "symbol", "node ");

        app.save().unwrap();
        let saved = fs::read_to_string(app.config_path()).unwrap();
        assert!(saved.contains("[nodejs]\n"));
        assert!(saved.contains("symbol = \"node \""));

        let runner = |path: &Path| -> Result<String, ProcessError> {
            Ok(fs::read_to_string(path).unwrap())
        };
        assert_eq!(app.preview(&runner).unwrap(), saved);
    }

    #[test]
    fn test_failed_preview_sets_error_status() {
        init_log();
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_without_schema(dir.path());
        let runner = |_: &Path| -> Result<String, ProcessError> {
            Err(ProcessError::NotFound {
                program: "starship".into(),
            })
        };

        let err = app.preview(&runner).unwrap_err();
        assert!(matches!(err, ProcessError::NotFound { .. }));
        match app.status() {
            Some(Status::Error(text)) => assert!(text.contains("starship")),
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(fs::read_to_string(app.config_path()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_modules_follow_query() {
        let mut app = AppData::with_document("starship.toml", Document::parse(SAMPLE).unwrap());
        app.query = "git_b".into();
        assert_eq!(app.modules(), ["git_branch"]);
        app.query.clear();
        app.category = Category::Active;
        assert_eq!(app.modules(), ["git_branch"]);
    }
}
