//! # starconf
//!
//! Terminal configurator for the starship prompt.
//!
//! Opens the prompt's TOML configuration in a form editor where each module
//! gets its own panel, keeps every untouched line of the file as it was, and
//! renders a live preview through the prompt binary.
//!
//! ## Modules
//!
//! - [`ctx`] - command line settings and config path lookup
//! - [`editor`] - subcommand handlers
//! - [`schema_source`] - schema download or file read
//! - [`utils`] - external program runner

/// Application context and config path resolution.
pub mod ctx;

/// Subcommand handlers.
pub mod editor;

/// Schema loading.
pub mod schema_source;

/// External program helpers.
pub mod utils;

#[macro_use]
extern crate log;

pub use tomlforms::cursive;
