//! Error types for every action boundary of the editor.
//!
//! Each enum maps to one kind of failure the controller converts into a
//! status notice. None of them is fatal.

use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// The document text is not valid TOML.
#[derive(Debug, Error)]
#[error("invalid TOML document: {0}")]
pub struct ParseError(#[from] pub toml_edit::TomlError);

/// Loading a document from disk failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file was read but is not valid TOML.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Parser error.
        source: ParseError,
    },
}

/// The schema could not be obtained or understood.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or file transport failed.
    #[error("schema transport failed: {0}")]
    Transport(String),
    /// The payload was not JSON.
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON did not have a recognised schema shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The fetch worker went away without reporting a result.
    #[error("schema fetch was cancelled")]
    Cancelled,
}

/// Schema JSON with an unexpected shape.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Neither a JSON Schema document nor the flat module map.
    #[error("unrecognised schema layout: {0}")]
    Layout(String),
    /// A flat property entry could not be decoded.
    #[error("invalid property in module `{module}`: {source}")]
    Property {
        /// Module the entry belongs to.
        module: String,
        /// Decoder error.
        source: serde_json::Error,
    },
}

/// Saving the document failed. The in-memory document is untouched.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Parent directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Existing file could not be copied aside.
    #[error("failed to back up {}: {source}", .path.display())]
    Backup {
        /// File being backed up.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file itself could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The raw editor text did not parse, so there is nothing valid to save.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The external preview program could not produce output.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Program is not installed or not on `PATH`.
    #[error("'{program}' command not found, make sure it is installed and on PATH")]
    NotFound {
        /// Program name.
        program: String,
    },
    /// Program could not be started for another reason.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Program exited unsuccessfully.
    #[error("'{program}' failed with {status}:\n{stderr}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error.
        stderr: String,
    },
    /// The raw editor text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The temporary document could not be written.
    #[error("failed to write temporary config: {0}")]
    TempFile(#[source] io::Error),
}
