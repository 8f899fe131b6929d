//! Launching the user's shell inside nix-shell.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::detect::ShellProfile;
use super::env::{Environ, clean_env_path, keep_args, split_nix_list};
use super::error::{ShellError, ShellResult};
use super::exec::exec_command;
use super::shellrc::write_shellrc;

/// Default program used to materialize the environment.
pub const NIX_SHELL: &str = "nix-shell";

/// Add the session variables to a snapshot of the parent environment.
///
/// - `PARENT_PATH`: the parent's `PATH`, cleaned of relative entries and
///   anything under a Nix profile directory.
/// - `NIX_PROFILES`: the profile directories, cleaned and space-joined, for
///   tools running inside the session.
/// - `__ETC_PROFILE_NIX_SOURCED=1`: stops the user's shellrc from sourcing
///   nix-daemon.sh again inside the session.
pub fn curate_env(env: &Environ) -> Environ {
    let nix_profile_dirs = split_nix_list(env.get("NIX_PROFILES").unwrap_or_default());
    let parent_path = clean_env_path(env.get("PATH").unwrap_or_default(), &nix_profile_dirs);

    let mut curated = env.clone();
    curated.push("PARENT_PATH", parent_path);
    curated.push("NIX_PROFILES", nix_profile_dirs.join(" "));
    curated.push("__ETC_PROFILE_NIX_SOURCED", "1");
    curated
}

/// Runs nix-shell with the user's shell for one session.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use devshell::shell::{Environ, Launcher, detect_shell};
///
/// let env = Environ::capture();
/// let shell = detect_shell(&env).ok().map(|sh| sh.with_plan_hook("echo ready"));
/// Launcher::new(env).run(shell.as_ref(), Path::new("."))?;
/// # Ok::<(), devshell::shell::ShellError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Launcher {
    program: String,
    rc_root: PathBuf,
    env: Environ,
}

impl Launcher {
    /// Create a launcher for the parent environment `env`.
    pub fn new(env: Environ) -> Self {
        Self {
            program: NIX_SHELL.to_string(),
            rc_root: std::env::temp_dir(),
            env,
        }
    }

    /// Use a different nix-shell binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Directory under which each session's shellrc directory is created.
    pub fn with_rc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.rc_root = root.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn rc_root(&self) -> &Path {
        &self.rc_root
    }

    /// Build the nix-shell command for `target` without running it.
    ///
    /// With `shell`, this writes the session shellrc (if the shell has an rc
    /// path) and tells nix-shell to exec the user's shell. Without it, the
    /// command falls back to a plain `nix-shell --pure`. Either way the child
    /// gets only the curated environment and inherits our stdio.
    pub fn command(&self, shell: Option<&ShellProfile>, target: &Path) -> Command {
        let env = curate_env(&self.env);

        let mut cmd = Command::new(&self.program);
        if let Some(shell) = shell {
            cmd.arg("--command").arg(self.shell_command(shell));
        }
        cmd.arg("--pure");
        cmd.args(keep_args(env.entries()));
        cmd.arg(target);

        cmd.env_clear();
        cmd.envs(env.iter());
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Run nix-shell for `target` and wait for the session to end.
    ///
    /// Pass `None` for `shell` when detection failed. Shellrc problems never
    /// fail the session, they only drop the customizations.
    pub fn run(&self, shell: Option<&ShellProfile>, target: &Path) -> ShellResult<()> {
        let mut cmd = self.command(shell, target);
        let args: Vec<String> = std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        if shell.is_some() {
            tracing::debug!("Executing nix-shell command: {:?}", args);
        } else {
            tracing::info!(
                "Unable to detect the user's shell, falling back to: {:?}",
                args
            );
        }

        let status = cmd.status().map_err(|source| ShellError::Launch {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(ShellError::ExitStatus {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }

    fn shell_command(&self, shell: &ShellProfile) -> String {
        // No rc path means we don't know how to override the shellrc, so
        // just launch the shell.
        if shell.rc_path().is_none() {
            return exec_command(shell, None);
        }

        match write_shellrc(shell, &self.rc_root) {
            Ok(shellrc) => exec_command(shell, Some(&shellrc)),
            Err(e) => {
                tracing::warn!("Failed to write devshell shellrc: {}", e);
                exec_command(shell, None)
            }
        }
    }
}
