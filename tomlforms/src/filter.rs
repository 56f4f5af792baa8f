//! Sidebar filtering.
//!
//! The displayed list is recomputed from scratch on every query change; the
//! catalog is small enough that no index is kept.

use crate::data::{
    catalog::{ModuleEntry, all_modules},
    document::Document,
};

/// Which part of the catalog to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    /// Frequently used modules.
    #[default]
    Common,
    /// Every known module.
    All,
    /// Modules present and not disabled in the current document.
    Active,
}

impl Category {
    /// Categories in selector order.
    pub const ALL: [Category; 3] = [Category::Common, Category::All, Category::Active];

    /// Label shown in the selector.
    pub fn label(self) -> &'static str {
        match self {
            Category::Common => "Common",
            Category::All => "All",
            Category::Active => "Active",
        }
    }

    fn admits(self, entry: &ModuleEntry, doc: &Document) -> bool {
        match self {
            Category::Common => entry.is_common,
            Category::All => true,
            Category::Active => doc.is_active(entry.name),
        }
    }
}

/// Module names matching `query` (case-insensitive substring) within `category`.
///
/// Catalog order is kept. `Active` is evaluated against `doc` on every call.
pub fn filter(query: &str, category: Category, doc: &Document) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    all_modules()
        .iter()
        .filter(|entry| category.admits(entry, doc))
        .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
        .map(|entry| entry.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{document::Section, value::FieldValue};

    fn doc() -> Document {
        Document::parse("[git_branch]\n[time]\ndisabled = true\n[zig]\nsymbol = \"z\"\n").unwrap()
    }

    #[test]
    fn test_common_and_all() {
        let doc = doc();
        assert_eq!(filter("", Category::Common, &doc).len(), 12);
        assert_eq!(filter("", Category::All, &doc).len(), all_modules().len());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let doc = doc();
        assert_eq!(
            filter("GIT", Category::All, &doc),
            ["git_branch", "git_status", "git_commit", "git_metrics", "git_state"]
        );
        assert_eq!(filter("  Git_B ", Category::Common, &doc), ["git_branch"]);
        assert!(filter("zzz", Category::All, &doc).is_empty());
    }

    #[test]
    fn test_active_follows_document() {
        let mut doc = doc();
        assert_eq!(filter("", Category::Active, &doc), ["git_branch", "zig"]);

        doc.set(Section::Module("time"), "disabled", &FieldValue::Boolean(false));
        assert_eq!(filter("", Category::Active, &doc), ["git_branch", "time", "zig"]);
        assert_eq!(filter("t", Category::Active, &doc), ["git_branch", "time"]);
    }
}
