use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    data::{
        document::{Document, Section},
        schema::{FIXED_FIELDS, FIXED_GLOBAL_FIELDS, PropertyDef},
        schema_cache::SchemaCache,
        value::FieldValue,
    },
    sync,
    widgets::control::Control,
};

/// Most schema fields shown on a panel besides its fixed ones.
pub const MAX_SCHEMA_FIELDS: usize = 10;

/// Field name mirrored by a module panel's enable toggle.
pub const DISABLED_FIELD: &str = "disabled";

/// Which panel a control belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PanelKey {
    /// Top-level settings.
    Global,
    /// One module table.
    Module(String),
}

impl PanelKey {
    /// Key for a module panel.
    pub fn module(name: impl Into<String>) -> Self {
        Self::Module(name.into())
    }

    /// Document section edited by the panel.
    pub fn section(&self) -> Section<'_> {
        match self {
            Self::Global => Section::Global,
            Self::Module(name) => Section::Module(name),
        }
    }
}

/// A control together with the property it edits.
///
/// The baseline is what the control held right after the last seed or
/// commit. Only controls that moved away from it are written back.
#[derive(Debug, Clone)]
pub struct FieldControl {
    def: PropertyDef,
    control: Control,
    baseline: Control,
}

impl FieldControl {
    fn new(def: PropertyDef) -> Self {
        let control = Control::for_property(&def);
        Self {
            baseline: control.clone(),
            def,
            control,
        }
    }

    /// Property this control edits.
    pub fn def(&self) -> &PropertyDef {
        &self.def
    }

    /// Current control state.
    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Whether the user changed the control since it was last synced.
    pub fn is_touched(&self) -> bool {
        self.control != self.baseline
    }

    /// The property's default as this control would write it.
    pub fn default_value(&self) -> FieldValue {
        Control::for_property(&self.def).value()
    }

    pub(crate) fn seed(&mut self, value: Option<&FieldValue>) {
        self.control = Control::for_property(&self.def);
        if let Some(value) = value {
            self.control.set_value(value);
        }
        self.rebaseline();
    }

    pub(crate) fn rebaseline(&mut self) {
        self.baseline = self.control.clone();
    }
}

/// Enable switch shown on top of every module panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnableToggle {
    value: bool,
    baseline: bool,
}

impl EnableToggle {
    /// Whether the module is switched on.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Whether the user flipped it since the last sync.
    pub fn is_touched(&self) -> bool {
        self.value != self.baseline
    }

    pub(crate) fn seed(&mut self, value: bool) {
        self.value = value;
        self.baseline = value;
    }

    pub(crate) fn rebaseline(&mut self) {
        self.baseline = self.value;
    }
}

/// All controls of one panel, in display order.
#[derive(Debug, Clone)]
pub struct Panel {
    key: PanelKey,
    enable: Option<EnableToggle>,
    fields: IndexMap<String, FieldControl>,
}

impl Panel {
    fn new(key: PanelKey, defs: Vec<PropertyDef>) -> Self {
        let enable = match key {
            PanelKey::Global => None,
            PanelKey::Module(_) => Some(EnableToggle::default()),
        };
        let fields = defs
            .into_iter()
            .map(|def| (def.name.clone(), FieldControl::new(def)))
            .collect();
        Self {
            key,
            enable,
            fields,
        }
    }

    /// Which panel this is.
    pub fn key(&self) -> &PanelKey {
        &self.key
    }

    /// The enable switch, absent on the global panel.
    pub fn enable(&self) -> Option<&EnableToggle> {
        self.enable.as_ref()
    }

    /// Look up one field.
    pub fn field(&self, name: &str) -> Option<&FieldControl> {
        self.fields.get(name)
    }

    /// Fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldControl)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Whether any control changed since the last sync.
    pub fn is_touched(&self) -> bool {
        self.enable.is_some_and(|e| e.is_touched())
            || self.fields.values().any(FieldControl::is_touched)
    }

    /// Switch the module on or off. Keeps a `disabled` field in step.
    pub fn set_enabled(&mut self, on: bool) {
        let Some(enable) = self.enable.as_mut() else {
            return;
        };
        enable.value = on;
        if let Some(field) = self.fields.get_mut(DISABLED_FIELD) {
            field.control.set_bool(!on);
        }
    }

    /// Set a checkbox field.
    pub fn set_bool(&mut self, name: &str, checked: bool) -> bool {
        if name == DISABLED_FIELD && self.enable.is_some() {
            self.set_enabled(!checked);
            return true;
        }
        self.fields
            .get_mut(name)
            .is_some_and(|f| f.control.set_bool(checked))
    }

    /// Set a numeric field. Returns the value after clamping.
    pub fn set_integer(&mut self, name: &str, value: i64) -> Option<i64> {
        self.fields.get_mut(name)?.control.set_integer(value)
    }

    /// Set a text or multi-line field.
    pub fn set_text(&mut self, name: &str, text: &str) -> bool {
        self.fields
            .get_mut(name)
            .is_some_and(|f| f.control.set_text(text))
    }

    pub(crate) fn enable_mut(&mut self) -> Option<&mut EnableToggle> {
        self.enable.as_mut()
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&str, &mut FieldControl)> {
        self.fields
            .iter_mut()
            .map(|(name, field)| (name.as_str(), field))
    }

    pub(crate) fn rebaseline(&mut self) {
        if let Some(enable) = self.enable.as_mut() {
            enable.rebaseline();
        }
        self.fields.values_mut().for_each(FieldControl::rebaseline);
    }
}

/// Fixed fields first, in their listed order, then at most
/// [`MAX_SCHEMA_FIELDS`] of the remaining properties.
fn select_properties(defs: Vec<PropertyDef>, fixed: &[&str]) -> Vec<PropertyDef> {
    let (mut pinned, rest): (Vec<_>, Vec<_>) = defs
        .into_iter()
        .partition(|def| fixed.contains(&def.name.as_str()));
    pinned.sort_by_key(|def| fixed.iter().position(|f| *f == def.name));
    pinned.extend(rest.into_iter().take(MAX_SCHEMA_FIELDS));
    pinned
}

/// Lazily built panels, one per module plus the global one.
///
/// A panel's field set is chosen when it is first built and never changes
/// afterwards, even if a schema arrives later.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    panels: HashMap<PanelKey, Panel>,
    builds: usize,
}

impl WidgetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The panel for `key`, building and seeding it on first use.
    pub fn get_or_build(
        &mut self,
        key: &PanelKey,
        schema: &SchemaCache,
        doc: &Document,
    ) -> &mut Panel {
        let builds = &mut self.builds;
        self.panels.entry(key.clone()).or_insert_with(|| {
            let defs = match key {
                PanelKey::Global => select_properties(schema.lookup_global(), &FIXED_GLOBAL_FIELDS),
                PanelKey::Module(name) => select_properties(schema.lookup(name), &FIXED_FIELDS),
            };
            let mut panel = Panel::new(key.clone(), defs);
            sync::seed_panel(&mut panel, doc);
            debug!("built panel {key:?} with {} fields", panel.fields.len());
            *builds += 1;
            panel
        })
    }

    /// An already built panel.
    pub fn get(&self, key: &PanelKey) -> Option<&Panel> {
        self.panels.get(key)
    }

    /// An already built panel, mutably.
    pub fn get_mut(&mut self, key: &PanelKey) -> Option<&mut Panel> {
        self.panels.get_mut(key)
    }

    /// Whether the panel for `key` exists.
    pub fn is_built(&self, key: &PanelKey) -> bool {
        self.panels.contains_key(key)
    }

    /// How many panels were ever constructed.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of built panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether no panel was built yet.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Built panels, in no particular order.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    /// Built panels, mutably.
    pub fn panels_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.panels.values_mut()
    }
}
