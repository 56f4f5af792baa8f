//! Document, schema and editor state.
//!
//! - [`document`] - comment-preserving TOML document
//! - [`value`] - values a control can hold
//! - [`schema`] - property definitions and schema parsing
//! - [`schema_cache`] - background-fetched schema with fallback
//! - [`catalog`] - known modules
//! - [`app_data`] - editor state owning all of the above

/// Editor state and the actions the UI triggers.
pub mod app_data;

/// Static module catalog.
pub mod catalog;

/// Format-preserving TOML document.
pub mod document;

/// Property definitions and schema parsing.
pub mod schema;

/// Schema delivered from a background fetch.
pub mod schema_cache;

/// Control values.
pub mod value;

pub use app_data::AppData;
pub use document::{Document, Section};
