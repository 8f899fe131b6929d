use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output format: toml (default) or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., shell.init_hook)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g., nix.program)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,

    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: Config) -> Result<()> {
    match args.command {
        ConfigCommands::Show { format } => show_config(&config, &format),
        ConfigCommands::Get { key } => get_config(&config, &key),
        ConfigCommands::Set { key, value } => set_config(config, &key, &value),
        ConfigCommands::Path => show_path(&config),
        ConfigCommands::Init { force } => init_config(&config, force),
    }
}

fn show_config(config: &Config, format: &str) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(config)?;
            println!("{}", json);
        }
        _ => {
            let toml = toml::to_string_pretty(config)?;
            println!("{}", toml);
        }
    }

    Ok(())
}

fn get_config(config: &Config, key: &str) -> Result<()> {
    let value = config.get_value(key)?;
    println!("{}", value);
    Ok(())
}

fn set_config(mut config: Config, key: &str, value: &str) -> Result<()> {
    config.set_value(key, value)?;
    config.save()?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn show_path(config: &Config) -> Result<()> {
    println!("{}", config.file.display());
    Ok(())
}

fn init_config(config: &Config, force: bool) -> Result<()> {
    if config.file.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config.file.display()
        );
    }

    config.save_with_template()?;

    println!("Created config file at {}", config.file.display());
    Ok(())
}
