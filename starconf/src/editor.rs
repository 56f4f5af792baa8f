//! Subcommand handlers.
//!
//! - `edit` opens the interactive editor
//! - `preview` renders the prompt for the document on disk
//! - `modules` lists the catalog
//! - `path` prints where the document lives

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use tomlforms::{
    data::document::Document,
    error::LoadError,
    filter::{Category, filter},
    preview::render_preview,
};

use crate::ctx::AppContext;

/// Module list selector for `starconf modules`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListCategory {
    /// Frequently used modules.
    #[default]
    Common,
    /// Every known module.
    All,
    /// Modules configured and not disabled.
    Active,
}

impl From<ListCategory> for Category {
    fn from(value: ListCategory) -> Self {
        match value {
            ListCategory::Common => Category::Common,
            ListCategory::All => Category::All,
            ListCategory::Active => Category::Active,
        }
    }
}

/// Handlers behind the subcommands.
pub struct EditorHandler;

impl EditorHandler {
    /// Loads the document, or the default one when the file does not exist
    /// or does not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_document(ctx: &AppContext) -> Result<Document> {
        match Document::load(ctx.config_path()) {
            Ok(doc) => Ok(doc),
            Err(LoadError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("{} not found, using defaults", ctx.config_path().display());
                Ok(Document::default_document())
            }
            Err(e @ LoadError::Parse { .. }) => {
                warn!("{e}, using defaults");
                Ok(Document::default_document())
            }
            Err(e) => Err(e).context("cannot load configuration"),
        }
    }

    /// Opens the interactive editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor cannot start.
    pub async fn handle_edit(ctx: &AppContext) -> Result<()> {
        let app = tomlforms::run(ctx.editor_options()).await?;
        if app.needs_save || app.has_pending_edits() {
            println!("{}", "Unsaved changes were discarded".yellow());
        } else {
            println!("Configuration at {}", ctx.config_path().display());
        }
        Ok(())
    }

    /// Prints the rendered prompt exactly as the prompt program wrote it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or the program fails.
    pub fn handle_preview(ctx: &AppContext) -> Result<()> {
        let doc = Self::load_document(ctx)?;
        let out = render_preview(&doc, &ctx.preview_runner())
            .with_context(|| format!("preview with `{}` failed", ctx.program))?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Prints the modules matching `query` in `category`; active ones are
    /// highlighted.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn handle_modules(ctx: &AppContext, category: ListCategory, query: &str) -> Result<()> {
        let doc = Self::load_document(ctx)?;
        for module in filter(query, category.into(), &doc) {
            if doc.is_active(module) {
                println!("{}", module.green().bold());
            } else {
                println!("{module}");
            }
        }
        Ok(())
    }

    /// Prints the resolved document path.
    pub fn handle_path(ctx: &AppContext) {
        println!("{}", ctx.config_path().display());
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn ctx_for(path: std::path::PathBuf) -> AppContext {
        AppContext::new(Some(path), None, "starship", false)
    }

    #[test]
    fn test_missing_document_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let doc = EditorHandler::load_document(&ctx_for(dir.path().join("none.toml"))).unwrap();
        assert!(doc.has_section("character"));
    }

    #[test]
    fn test_invalid_document_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("starship.toml");
        fs::write(&path, "[broken").unwrap();
        let doc = EditorHandler::load_document(&ctx_for(path.clone())).unwrap();
        assert!(doc.has_section("character"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[broken");
    }

    #[test]
    fn test_unreadable_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EditorHandler::load_document(&ctx_for(dir.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(Category::from(ListCategory::Active), Category::Active);
        assert_eq!(Category::from(ListCategory::default()), Category::Common);
    }
}
