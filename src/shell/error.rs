//! Error types for shell session setup and launch.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while preparing or running a shell session.
///
/// Only [`ShellError::NoShellDetected`], [`ShellError::Launch`] and
/// [`ShellError::ExitStatus`] ever reach the caller of a session. Shellrc
/// errors are consumed by the launcher, which falls back to an
/// uncustomized shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `SHELL` is unset or empty.
    #[error("unable to detect the current shell: SHELL is not set")]
    NoShellDetected,

    /// The per-session directory for the shellrc could not be created.
    #[error("create temp dir for shell init file under {root}: {source}")]
    TempDir {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shellrc file could not be created.
    #[error("write to shell init file {path}: {source}")]
    CreateShellrc {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template failed to render into the shellrc file.
    #[error("render shell init file {path}: {source}")]
    RenderShellrc {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The environment tool could not be started.
    #[error("failed to start {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The environment tool ran but exited unsuccessfully.
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },
}

/// Result type for shell session operations.
pub type ShellResult<T> = std::result::Result<T, ShellError>;
