//! Running external programs.

use std::{
    ffi::OsStr,
    io,
    ops::{Deref, DerefMut},
    path::Path,
};

use tomlforms::{
    error::ProcessError,
    preview::{PREVIEW_ARGS, PreviewRunner},
};

/// `std::process::Command` that logs what it runs and maps failures to
/// [`ProcessError`].
pub struct Command {
    inner: std::process::Command,
}

impl Deref for Command {
    type Target = std::process::Command;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Command {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Command {
    /// Creates a new command for `program`.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Command {
        Self {
            inner: std::process::Command::new(program),
        }
    }

    /// The command line as it would be typed in a shell.
    pub fn cmd_line(&self) -> String {
        let mut cmd_str = self.get_program().to_string_lossy().to_string();
        for arg in self.get_args() {
            cmd_str += " ";
            cmd_str += arg.to_string_lossy().as_ref();
        }
        cmd_str
    }

    fn program(&self) -> String {
        self.get_program().to_string_lossy().to_string()
    }

    /// Runs the command and returns its standard output unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the program cannot be started or exits with non-zero status.
    pub fn capture(&mut self) -> Result<String, ProcessError> {
        debug!("running {}", self.cmd_line());
        let output = self.output().map_err(|source| {
            let program = self.program();
            if source.kind() == io::ErrorKind::NotFound {
                ProcessError::NotFound { program }
            } else {
                ProcessError::Spawn { program, source }
            }
        })?;
        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: self.program(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Renders previews with `<program> print --config <path>`.
#[derive(Debug, Clone)]
pub struct StarshipPreview {
    program: String,
}

impl StarshipPreview {
    /// Use `program` as the prompt binary.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PreviewRunner for StarshipPreview {
    fn render(&self, config: &Path) -> Result<String, ProcessError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(PREVIEW_ARGS).arg(config);
        cmd.capture()
    }
}
