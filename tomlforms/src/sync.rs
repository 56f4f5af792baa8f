//! Copies state between the document and the panels.
//!
//! [`seed_panel`] fills controls from the document. [`commit`] writes
//! changed controls back and is the only place where edits reach the
//! document.

use std::collections::HashMap;

use crate::{
    data::{document::Document, value::FieldValue},
    widgets::{
        WidgetRegistry,
        registry::{DISABLED_FIELD, Panel, PanelKey},
    },
};

/// Module tables kept even when nothing in them differs from the defaults.
pub const KEPT_SECTIONS: [&str; 1] = ["character"];

/// What a [`commit`] pass did to the document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Keys set to a new value.
    pub written: usize,
    /// Keys removed because their control was emptied.
    pub removed: usize,
    /// Module sections dropped because nothing was left in them.
    pub pruned: Vec<String>,
}

impl SyncReport {
    /// Whether the document changed.
    pub fn changed(&self) -> bool {
        self.written > 0 || self.removed > 0 || !self.pruned.is_empty()
    }
}

/// Show the document's current values in every control of `panel` and
/// forget pending edits. Absent keys show the property default.
pub fn seed_panel(panel: &mut Panel, doc: &Document) {
    let key = panel.key().clone();
    let section = key.section();
    if let PanelKey::Module(module) = &key
        && let Some(enable) = panel.enable_mut()
    {
        enable.seed(doc.is_active(module));
    }
    for (name, field) in panel.fields_mut() {
        field.seed(doc.get(section, name).as_ref());
    }
}

/// Re-seed every built panel, after the document was replaced.
pub fn seed_all(registry: &mut WidgetRegistry, doc: &Document) {
    for panel in registry.panels_mut() {
        seed_panel(panel, doc);
    }
}

/// Write every changed control of every built panel into `doc`.
///
/// Running it again without new edits changes nothing.
pub fn commit(registry: &mut WidgetRegistry, doc: &mut Document) -> SyncReport {
    let mut report = SyncReport::default();
    for panel in registry.panels_mut() {
        commit_panel(panel, doc, &mut report);
    }
    if report.changed() {
        info!(
            "sync: {} written, {} removed, {} sections pruned",
            report.written,
            report.removed,
            report.pruned.len()
        );
    }
    report
}

fn commit_panel(panel: &mut Panel, doc: &mut Document, report: &mut SyncReport) {
    if !panel.is_touched() {
        return;
    }
    let key = panel.key().clone();
    let section = key.section();
    let module = match &key {
        PanelKey::Global => None,
        PanelKey::Module(name) => Some(name.as_str()),
    };
    let existed = module.is_some_and(|m| doc.has_section(m));
    let changes_before = report.written + report.removed;
    let toggled = panel.enable().is_some_and(|e| e.is_touched());

    if let Some(enable) = panel.enable()
        && toggled
        && doc.set(section, DISABLED_FIELD, &FieldValue::Boolean(!enable.value()))
    {
        report.written += 1;
    }

    let linked = panel.enable().is_some();
    for (name, field) in panel.fields() {
        if !field.is_touched() || (linked && name == DISABLED_FIELD) {
            continue;
        }
        let value = field.control().value();
        if value.is_empty() {
            if doc.remove(section, name) {
                report.removed += 1;
            }
        } else if (doc.contains_key(section, name) || value != field.default_value())
            && doc.set(section, name, &value)
        {
            report.written += 1;
        }
    }

    if let Some(module) = module {
        let switched_off = panel.enable().is_some_and(|e| !e.value());
        if !existed
            && switched_off
            && doc.has_section(module)
            && doc.set(section, DISABLED_FIELD, &FieldValue::Boolean(true))
        {
            report.written += 1;
        }
        let defaults = panel_defaults(panel, toggled);
        if report.written + report.removed > changes_before
            && !KEPT_SECTIONS.contains(&module)
            && doc.remove_section_if_empty(module, |key, value| defaults.get(key) == Some(value))
        {
            report.pruned.push(module.to_string());
        }
    }

    panel.rebaseline();
}

/// Values that hold no override for a module: declared property defaults,
/// and `disabled = false` unless the enable toggle was just flipped.
fn panel_defaults(panel: &Panel, toggled: bool) -> HashMap<String, FieldValue> {
    let mut defaults: HashMap<String, FieldValue> = panel
        .fields()
        .filter(|(_, field)| field.def().default.is_some())
        .map(|(name, field)| (name.to_string(), field.default_value()))
        .collect();
    if toggled {
        defaults.remove(DISABLED_FIELD);
    } else {
        defaults
            .entry(DISABLED_FIELD.to_string())
            .or_insert(FieldValue::Boolean(false));
    }
    defaults
}
