//! Detection of the user's shell and its init file.

use std::fmt;
use std::path::{Path, PathBuf};

use super::env::{Environ, clean_path};
use super::error::{ShellError, ShellResult};

/// Shells we know how to point at a custom init file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Ksh,
    /// dash, ash and sh. All read the file named by `ENV`.
    Posix,
    /// Launched as-is, without a custom init file.
    Unknown,
}

impl ShellKind {
    /// Classify a shell by the base name of its binary. A leading `-`
    /// (login shell) must already be stripped.
    pub fn from_base_name(base: &str) -> Self {
        match base {
            "bash" => ShellKind::Bash,
            "zsh" => ShellKind::Zsh,
            "ksh" => ShellKind::Ksh,
            "dash" | "ash" | "sh" => ShellKind::Posix,
            _ => ShellKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Ksh => "ksh",
            ShellKind::Posix => "posix",
            ShellKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user's shell, as detected once at the start of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProfile {
    kind: ShellKind,
    bin_path: PathBuf,
    rc_path: Option<PathBuf>,
    plan_hook: String,
    user_hook: String,
}

impl ShellProfile {
    pub fn kind(&self) -> ShellKind {
        self.kind
    }

    /// Cleaned path of the shell binary, taken from `SHELL`.
    pub fn bin_path(&self) -> &Path {
        &self.bin_path
    }

    /// The user's init file. `None` when the shell is unknown or the home
    /// directory could not be found. The file may not exist.
    pub fn rc_path(&self) -> Option<&Path> {
        self.rc_path.as_deref()
    }

    /// Session-level commands run after the user's init file.
    pub fn plan_hook(&self) -> &str {
        &self.plan_hook
    }

    /// User-level commands run after the user's init file.
    pub fn user_hook(&self) -> &str {
        &self.user_hook
    }

    pub fn with_plan_hook(mut self, hook: impl Into<String>) -> Self {
        self.plan_hook = hook.into();
        self
    }

    pub fn with_user_hook(mut self, hook: impl Into<String>) -> Self {
        self.user_hook = hook.into();
        self
    }
}

/// Detect the user's shell from `SHELL` in `env`.
///
/// Fails with [`ShellError::NoShellDetected`] when `SHELL` is unset or
/// empty; the caller should then launch a plain nix-shell instead.
pub fn detect_shell(env: &Environ) -> ShellResult<ShellProfile> {
    let shell = env
        .get_non_empty("SHELL")
        .ok_or(ShellError::NoShellDetected)?;

    let bin_path = clean_path(shell);
    let file_name = bin_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // Login shell
    let base = file_name.strip_prefix('-').unwrap_or(&file_name);

    let kind = ShellKind::from_base_name(base);
    let rc_path = match kind {
        ShellKind::Bash => rcfile_path(env, ".bashrc"),
        ShellKind::Zsh => rcfile_path(env, ".zshrc"),
        ShellKind::Ksh => rcfile_path(env, ".kshrc"),
        // Make up a name if there isn't an init file set so we have
        // somewhere to put a new one.
        ShellKind::Posix => Some(PathBuf::from(
            env.get_non_empty("ENV").unwrap_or(".shinit"),
        )),
        ShellKind::Unknown => None,
    };

    tracing::debug!("Detected shell: {}", bin_path.display());
    tracing::debug!("Recognized shell as: {}", kind);
    tracing::debug!(
        "Looking for user's shell init file at: {}",
        rc_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );

    Ok(ShellProfile {
        kind,
        bin_path,
        rc_path,
        plan_hook: String::new(),
        user_hook: String::new(),
    })
}

/// Absolute path of an init file in the user's home directory. It doesn't
/// check that the file exists.
fn rcfile_path(env: &Environ, basename: &str) -> Option<PathBuf> {
    let home = match env.get_non_empty("HOME") {
        Some(home) => PathBuf::from(home),
        None => etcetera::home_dir().ok()?,
    };
    Some(home.join(basename))
}
