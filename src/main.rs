use anyhow::Result;
use clap::Parser;
use std::path::Path;

use devshell::cli::{self, Cli, Commands};
use devshell::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.as_deref().map(Path::new))?;

    // Initialize logging. Logs go to stderr so the session's stdout stays clean.
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Shell(args) => cli::shell::run(args, &config),
        Commands::Detect => cli::detect::run(),
        Commands::Config(args) => cli::config::run(args, config),
        Commands::Paths => cli::paths::run(&config),
    }
}
