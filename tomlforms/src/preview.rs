//! Rendering the prompt through an external program.

use std::{io::Write, path::Path};

use crate::{data::document::Document, error::ProcessError};

/// Arguments placed before the config path when invoking the prompt program.
pub const PREVIEW_ARGS: [&str; 2] = ["print", "--config"];

/// Something that can render a prompt from a config file.
pub trait PreviewRunner {
    /// Render the prompt for the config at `config` and return its standard
    /// output untouched, escape sequences included.
    fn render(&self, config: &Path) -> Result<String, ProcessError>;
}

impl<F> PreviewRunner for F
where
    F: Fn(&Path) -> Result<String, ProcessError>,
{
    fn render(&self, config: &Path) -> Result<String, ProcessError> {
        self(config)
    }
}

/// Write `doc` to a temporary file and render it with `runner`.
///
/// The temporary file is removed whether rendering succeeds or not.
pub fn render_preview(doc: &Document, runner: &dyn PreviewRunner) -> Result<String, ProcessError> {
    let mut file = tempfile::Builder::new()
        .prefix("starship-preview-")
        .suffix(".toml")
        .tempfile()
        .map_err(ProcessError::TempFile)?;
    file.write_all(doc.serialize().as_bytes())
        .and_then(|_| file.flush())
        .map_err(ProcessError::TempFile)?;

    debug!("rendering preview from {}", file.path().display());
    let result = runner.render(file.path());

    if let Err(e) = file.close() {
        warn!("failed to remove preview file: {e}");
    }
    result
}
