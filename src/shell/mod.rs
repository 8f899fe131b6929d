//! Shell bootstrap: run the user's own shell inside a nix-shell environment.
//!
//! A session goes through these steps in order:
//!
//! 1. Snapshot and curate the environment ([`curate_env`], [`keep_args`]).
//! 2. Detect the user's shell and its init file ([`detect_shell`]).
//! 3. Write a session shellrc that inlines the user's init file followed by
//!    the hooks ([`write_shellrc`]).
//! 4. Build the `exec env ... <shell>` command that makes the shell load that
//!    file ([`exec_command`]).
//! 5. Run `nix-shell --pure` with the command and wait ([`Launcher`]).
//!
//! Failing to detect the shell falls back to a plain `nix-shell --pure`.
//! Failing to write the shellrc falls back to launching the shell without
//! customizations.

pub mod detect;
pub mod env;
pub mod error;
pub mod exec;
pub mod session;
pub mod shellrc;

pub use detect::{ShellKind, ShellProfile, detect_shell};
pub use env::{Environ, KEEP_ENV, clean_env_path, clean_path, is_kept, keep_args, split_nix_list};
pub use error::{ShellError, ShellResult};
pub use exec::exec_command;
pub use session::{Launcher, NIX_SHELL, curate_env};
pub use shellrc::{DefaultShellrc, RenderShellrc, ShellrcFields, write_shellrc, write_shellrc_with};
