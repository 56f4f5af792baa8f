use std::{fs, path::Path};

use toml_edit::{DocumentMut, Item, Table, TableLike, value};

use crate::{
    data::value::FieldValue,
    error::{LoadError, ParseError, WriteError},
};

/// Published location of the prompt configuration schema.
pub const SCHEMA_URL: &str = "https://starship.rs/config-schema.json";

/// Addresses either the top-level keys or one module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section<'a> {
    /// Keys of the root table that are not tables themselves.
    Global,
    /// A top-level table named after a module.
    Module(&'a str),
}

/// Format-preserving TOML document.
///
/// Wraps a [`DocumentMut`] together with the exact text it was parsed from.
/// Until something changes, [`Document::serialize`] hands that text back
/// unaltered; afterwards only the touched keys are re-rendered.
#[derive(Debug, Clone)]
pub struct Document {
    doc: DocumentMut,
    source: String,
    crlf: bool,
    dirty: bool,
}

impl Document {
    /// Parse document text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let doc = text.parse::<DocumentMut>()?;
        Ok(Self {
            doc,
            source: text.to_string(),
            crlf: text.contains("\r\n"),
            dirty: false,
        })
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Minimal document used when nothing usable exists on disk.
    pub fn default_document() -> Self {
        let mut doc = DocumentMut::new();
        doc.insert("$schema", value(SCHEMA_URL));
        doc.insert("add_newline", value(true));

        let mut character = Table::new();
        character.insert("success_symbol", value("[❯](bold green)"));
        character.insert("error_symbol", value("[❯](bold red)"));
        character
            .decor_mut()
            .set_prefix("\n# Configuration for the prompt symbol\n");
        doc.insert("character", Item::Table(character));

        let source = doc.to_string();
        Self {
            doc,
            source,
            crlf: false,
            dirty: false,
        }
    }

    fn section(&self, section: Section<'_>) -> Option<&dyn TableLike> {
        match section {
            Section::Global => Some(self.doc.as_table() as &dyn TableLike),
            Section::Module(name) => self.doc.get(name).and_then(Item::as_table_like),
        }
    }

    fn section_mut_or_insert(&mut self, section: Section<'_>) -> Option<&mut dyn TableLike> {
        match section {
            Section::Global => Some(self.doc.as_table_mut() as &mut dyn TableLike),
            Section::Module(name) => {
                let root = self.doc.as_table_mut();
                if !root.contains_key(name) {
                    debug!("creating section [{name}]");
                    root.insert(name, Item::Table(Table::new()));
                }
                root.get_mut(name).and_then(Item::as_table_like_mut)
            }
        }
    }

    /// Current value of a key, if it holds something a control can show.
    pub fn get(&self, section: Section<'_>, key: &str) -> Option<FieldValue> {
        self.section(section)?
            .get(key)?
            .as_value()
            .and_then(FieldValue::from_toml)
    }

    /// Current value of a key, or `default` when absent or unrepresentable.
    pub fn get_or(&self, section: Section<'_>, key: &str, default: FieldValue) -> FieldValue {
        self.get(section, key).unwrap_or(default)
    }

    /// Whether the key is written in the document, whatever its type.
    pub fn contains_key(&self, section: Section<'_>, key: &str) -> bool {
        self.section(section)
            .and_then(|t| t.get(key))
            .is_some_and(|item| matches!(section, Section::Module(_)) || item.is_value())
    }

    /// Set a key, creating the module table when needed.
    ///
    /// An existing key keeps its position, comments and surrounding
    /// whitespace. Writing the value a key already holds changes nothing.
    /// Returns whether the document changed.
    pub fn set(&mut self, section: Section<'_>, key: &str, value: &FieldValue) -> bool {
        if self.get(section, key).as_ref() == Some(value) {
            return false;
        }
        let Some(table) = self.section_mut_or_insert(section) else {
            warn!("cannot write {key}: {section:?} is not a table");
            return false;
        };

        let mut new_value = value.to_toml();
        match table.get_mut(key) {
            Some(item) => {
                if let Some(old) = item.as_value() {
                    *new_value.decor_mut() = old.decor().clone();
                }
                *item = Item::Value(new_value);
            }
            None => {
                table.insert(key, Item::Value(new_value));
            }
        }
        self.dirty = true;
        true
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove(&mut self, section: Section<'_>, key: &str) -> bool {
        let removed = match section {
            Section::Global => {
                let root = self.doc.as_table_mut();
                root.get(key).is_some_and(Item::is_value) && root.remove(key).is_some()
            }
            Section::Module(name) => self
                .doc
                .get_mut(name)
                .and_then(Item::as_table_like_mut)
                .and_then(|t| t.remove(key))
                .is_some(),
        };
        self.dirty |= removed;
        removed
    }

    /// Whether a table for `module` exists.
    pub fn has_section(&self, module: &str) -> bool {
        self.section(Section::Module(module)).is_some()
    }

    /// A module is active when its table exists and is not `disabled = true`.
    pub fn is_active(&self, module: &str) -> bool {
        self.section(Section::Module(module))
            .is_some_and(|t| t.get("disabled").and_then(Item::as_bool) != Some(true))
    }

    /// Drop a module table in which no key holds a non-default, non-empty
    /// value. `is_default` decides which values count as defaults.
    ///
    /// Nested tables count as content. Returns whether the table was removed.
    pub fn remove_section_if_empty(
        &mut self,
        module: &str,
        is_default: impl Fn(&str, &FieldValue) -> bool,
    ) -> bool {
        let Some(table) = self.section(Section::Module(module)) else {
            return false;
        };
        let empty = table.iter().all(|(key, item)| {
            item.as_value()
                .and_then(FieldValue::from_toml)
                .is_some_and(|v| v.is_empty() || is_default(key, &v))
        });
        if !empty {
            return false;
        }
        debug!("pruning empty section [{module}]");
        self.doc.remove(module);
        self.dirty = true;
        true
    }

    /// Render the document as text, keeping the source's line endings.
    pub fn serialize(&self) -> String {
        if !self.dirty {
            return self.source.clone();
        }
        let text = self.doc.to_string();
        if self.crlf {
            text.replace("\r\n", "\n").replace('\n', "\r\n")
        } else {
            text
        }
    }

    /// Whether the document differs from the text it was built from.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document, creating the parent directory if absent.
    pub fn write(&self, path: &Path) -> Result<(), WriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.serialize()).map_err(|source| WriteError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
