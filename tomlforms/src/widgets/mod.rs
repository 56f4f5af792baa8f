//! Editing controls and the panels that group them.
//!
//! - [`control`] - one control per property type
//! - [`registry`] - per-module panels, built on first selection

/// Typed control state.
pub mod control;

/// Panels and their lazy registry.
pub mod registry;

pub use control::Control;
pub use registry::{FieldControl, Panel, PanelKey, WidgetRegistry};
