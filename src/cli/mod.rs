pub mod config;
pub mod detect;
pub mod paths;
pub mod shell;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "devshell")]
#[command(
    author,
    version,
    about = "Run your own shell inside a reproducible nix-shell environment"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "DEVSHELL_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start your shell inside a nix-shell environment
    Shell(shell::ShellArgs),

    /// Show which shell and init file would be used
    Detect,

    /// Configuration management
    Config(config::ConfigArgs),

    /// Show resolved XDG directory paths
    Paths,
}
