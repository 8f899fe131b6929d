//! CLI subcommand: `devshell shell`
//!
//! Detects the user's shell and starts it inside nix-shell. If the shell
//! can't be detected, a plain `nix-shell --pure` is started instead.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::shell::{Environ, Launcher, ShellProfile, detect_shell};

#[derive(Args)]
pub struct ShellArgs {
    /// Environment to enter: a shell.nix file or a directory containing one
    /// (default: nix.target from config)
    pub target: Option<PathBuf>,

    /// Commands to run after your shellrc, for this session only
    #[arg(long)]
    pub hook: Option<String>,

    /// Print the nix-shell command instead of running it. The session
    /// shellrc is still written, so the printed command works as-is.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ShellArgs, config: &Config) -> Result<()> {
    let env = Environ::capture();
    let target = args
        .target
        .unwrap_or_else(|| PathBuf::from(&config.nix.target));

    let shell = detect(&env, config, args.hook.as_deref());

    // Soft failure: without an rc root the launcher starts a plain shell.
    let rc_root = config.rc_root();
    if config.paths.runtime_dir.as_deref() == Some(rc_root.as_path())
        && let Err(e) = config.paths.ensure_runtime_dir()
    {
        tracing::warn!("{:#}", e);
    }

    let launcher = Launcher::new(env)
        .with_program(&config.nix.program)
        .with_rc_root(rc_root);

    if args.dry_run {
        let cmd = launcher.command(shell.as_ref(), &target);
        let argv: Vec<String> = std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        println!("{}", argv.join(" "));
        return Ok(());
    }

    launcher
        .run(shell.as_ref(), &target)
        .with_context(|| format!("devshell session for {} failed", target.display()))
}

/// Detect the shell, attaching the configured user hook and the session hook.
/// Detection failure is logged and turned into `None` (fallback shell).
fn detect(env: &Environ, config: &Config, hook: Option<&str>) -> Option<ShellProfile> {
    match detect_shell(env) {
        Ok(shell) => Some(
            shell
                .with_user_hook(config.shell.init_hook.as_str())
                .with_plan_hook(hook.unwrap_or_default()),
        ),
        Err(e) => {
            tracing::info!("{}", e);
            None
        }
    }
}
