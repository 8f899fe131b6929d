use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved XDG-compliant paths (not serialized)
    #[serde(skip)]
    pub paths: Paths,

    /// File this config was loaded from and is saved to (not serialized)
    #[serde(skip)]
    pub file: PathBuf,

    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub nix: NixConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Commands run in every session after the user's own shellrc
    #[serde(default)]
    pub init_hook: String,

    /// Where per-session shellrc directories are created.
    /// Default: runtime dir, falling back to the system temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rc_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NixConfig {
    /// nix-shell binary to run
    #[serde(default = "default_nix_program")]
    pub program: String,

    /// Default environment passed to nix-shell (shell.nix, directory, ...)
    #[serde(default = "default_nix_target")]
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_nix_program() -> String {
    crate::shell::NIX_SHELL.to_string()
}
fn default_nix_target() -> String {
    ".".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for NixConfig {
    fn default() -> Self {
        Self {
            program: default_nix_program(),
            target: default_nix_target(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default config file when `None`.
    ///
    /// A missing file is not an error: defaults are used and nothing is
    /// written. Run `devshell config init` to create one.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let paths = Paths::resolve()?;
        let file = match path {
            Some(p) => p.to_path_buf(),
            None => paths.config_file(),
        };

        let mut config = if file.exists() {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config file {}", file.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file {}", file.display()))?
        } else {
            tracing::debug!("No config file at {}, using defaults", file.display());
            Config::default()
        };
        config.paths = paths;
        config.file = file;

        Ok(config)
    }

    /// Parse a config from TOML text. Paths are left at their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&self.file, content)
            .with_context(|| format!("Failed to write config file {}", self.file.display()))?;

        Ok(())
    }

    /// Write the commented default template to this config's file.
    pub fn save_with_template(&self) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.file, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config file {}", self.file.display()))?;

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["shell", "init_hook"] => Ok(self.shell.init_hook.clone()),
            ["shell", "rc_dir"] => Ok(self.shell.rc_dir.clone().unwrap_or_default()),
            ["nix", "program"] => Ok(self.nix.program.clone()),
            ["nix", "target"] => Ok(self.nix.target.clone()),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["shell", "init_hook"] => self.shell.init_hook = value.to_string(),
            ["shell", "rc_dir"] => {
                self.shell.rc_dir = Some(value.to_string()).filter(|v| !v.trim().is_empty())
            }
            ["nix", "program"] => self.nix.program = value.to_string(),
            ["nix", "target"] => self.nix.target = value.to_string(),
            ["logging", "level"] => self.logging.level = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }

    /// Directory under which session shellrc directories are created.
    ///
    /// 1. `shell.rc_dir` from the config file (`~` expanded)
    /// 2. The runtime directory
    /// 3. The system temp directory
    pub fn rc_root(&self) -> PathBuf {
        if let Some(ref dir) = self.shell.rc_dir {
            let expanded = shellexpand::tilde(dir.trim());
            if !expanded.is_empty() {
                return PathBuf::from(expanded.as_ref());
            }
        }

        self.paths
            .runtime_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Default config template with helpful comments (used by `config init`)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# devshell configuration

[shell]
# Commands to run in every devshell session, after your own shellrc.
# init_hook = "echo 'Welcome to devshell'"

# Where each session's generated shellrc is written.
# Default: $XDG_RUNTIME_DIR/devshell, or the system temp directory.
# rc_dir = "~/.cache/devshell/rc"

[nix]
program = "nix-shell"
# Environment to enter when `devshell shell` gets no target.
target = "."

[logging]
# error | warn | info | debug | trace  (RUST_LOG takes precedence)
level = "warn"
"#;
