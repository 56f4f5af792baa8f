//! # tomlforms
//!
//! Form editor for starship-style prompt configuration files.
//!
//! The document is kept in a format-preserving TOML tree, so keys nobody
//! touched keep their comments, spacing and order byte for byte. Each module
//! section gets a panel of typed controls, built the first time the module is
//! selected, from a schema fetched in the background or from a small fallback
//! field set while no schema is available.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tomlforms::{data::AppData, widgets::PanelKey};
//!
//! let mut app = AppData::open("starship.toml");
//! let key = PanelKey::module("time");
//! app.set_enabled(&key, true);
//! app.set_text(&key, "format", "at [$time]($style) ");
//! app.save().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`data`] - document, schema, catalog and editor state
//! - [`widgets`] - typed controls and lazily built panels
//! - [`sync`] - document to panels and back
//! - [`filter`] - sidebar search
//! - [`preview`] - rendering through the prompt program
//! - [`ui`] / [`run`] - the terminal interface

#[macro_use]
extern crate log;

/// Document, schema, catalog and editor state.
pub mod data;

/// Error types.
pub mod error;

/// Sidebar search.
pub mod filter;

/// Prompt rendering through an external program.
pub mod preview;

/// Terminal application runner.
pub mod run;

/// Copying state between the document and the panels.
pub mod sync;

/// Terminal views and callbacks.
pub mod ui;

/// Typed controls and panels.
pub mod widgets;

pub use run::*;
