//! CLI subcommand: `devshell detect`

use anyhow::Result;

use crate::shell::{Environ, ShellError, detect_shell};

pub fn run() -> Result<()> {
    let env = Environ::capture();

    match detect_shell(&env) {
        Ok(shell) => {
            println!("Shell:      {}", shell.bin_path().display());
            println!("Kind:       {}", shell.kind());
            match shell.rc_path() {
                Some(rc) => {
                    let status = if rc.exists() { "" } else { " (not found)" };
                    println!("Init file:  {}{}", rc.display(), status);
                }
                None => println!("Init file:  (none, shell will start without customization)"),
            }
        }
        Err(ShellError::NoShellDetected) => {
            println!("Shell:      (not detected, SHELL is not set)");
            println!("            `devshell shell` will fall back to plain nix-shell");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
