//! The command nix-shell runs to start the user's shell.

use std::path::Path;

use super::detect::{ShellKind, ShellProfile};

/// Build the command that replaces nix-shell's own shell with `profile`'s.
///
/// This is what the launcher passes to `nix-shell --command`. We exec `env`,
/// which then execs the shell, so that variables set here are in place
/// before any of the shell's init files run.
///
/// `shellrc` is the file written by [`write_shellrc`](super::write_shellrc).
/// Without one (unknown shell, missing rc path, or the write failed) the
/// shell is launched with no extra flags or variables.
pub fn exec_command(profile: &ShellProfile, shellrc: Option<&Path>) -> String {
    let bin_path = profile.bin_path().display().to_string();
    let mut args: Vec<String> = vec![
        "exec".to_string(),
        "env".to_string(),
        // Correct SHELL to be the one we're about to exec.
        quoted_assign("SHELL", &bin_path),
    ];

    let Some(shellrc) = shellrc.filter(|p| !p.as_os_str().is_empty()) else {
        args.push(bin_path);
        return args.join(" ");
    };

    // Shells have different ways of overriding the shellrc.
    let mut extra_args: Vec<String> = Vec::new();
    match profile.kind() {
        ShellKind::Bash => {
            extra_args.push("--rcfile".to_string());
            extra_args.push(quoted(&shellrc.display().to_string()));
        }
        // zsh looks for .zshrc in ZDOTDIR.
        ShellKind::Zsh => {
            let dir = shellrc.parent().unwrap_or(Path::new("/"));
            args.push(quoted_assign("ZDOTDIR", &dir.display().to_string()));
        }
        ShellKind::Ksh | ShellKind::Posix => {
            args.push(quoted_assign("ENV", &shellrc.display().to_string()));
        }
        ShellKind::Unknown => {}
    }

    args.push(bin_path);
    args.extend(extra_args);
    args.join(" ")
}

fn quoted(value: &str) -> String {
    format!(r#""{value}""#)
}

fn quoted_assign(name: &str, value: &str) -> String {
    format!(r#""{name}={value}""#)
}
