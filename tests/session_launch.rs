//! End-to-end launcher tests against a fake `nix-shell`.
//!
//! The fake records its argv and a few environment variables into files
//! named by the session environment, then exits with `$FAKE_EXIT`. This
//! exercises the real spawn path (curated env, stdio, exit status) without
//! needing Nix installed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tempfile::TempDir;

use devshell::shell::{Environ, Launcher, ShellError, detect_shell};

const FAKE_NIX_SHELL: &str = r#"#!/bin/sh
for arg in "$@"; do
  printf '%s\n' "$arg"
done > "$ARGS_OUT"
{
  printf 'PARENT_PATH=%s\n' "$PARENT_PATH"
  printf 'NIX_PROFILES=%s\n' "$NIX_PROFILES"
  printf 'GUARD=%s\n' "$__ETC_PROFILE_NIX_SOURCED"
  printf 'SECRET=%s\n' "${SECRET-unset}"
} > "$ENV_OUT"
exit "${FAKE_EXIT:-0}"
"#;

/// Written once, before any test spawns a process, so no child can inherit
/// the script's write handle (ETXTBSY).
static FAKE: Lazy<PathBuf> = Lazy::new(|| {
    let dir = TempDir::new().expect("temp dir").keep();
    let path = dir.join("nix-shell");
    fs::write(&path, FAKE_NIX_SHELL).expect("write fake nix-shell");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake nix-shell");
    path
});

struct Session {
    _dir: TempDir,
    args_out: PathBuf,
    env_out: PathBuf,
    home: PathBuf,
    rc_root: PathBuf,
}

impl Session {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir(&home).unwrap();
        Self {
            args_out: dir.path().join("args"),
            env_out: dir.path().join("env"),
            rc_root: dir.path().join("rc"),
            home,
            _dir: dir,
        }
    }

    fn env(&self, extra: &[(&str, &str)]) -> Environ {
        let mut env = Environ::from_pairs([
            ("HOME", self.home.display().to_string()),
            ("ARGS_OUT", self.args_out.display().to_string()),
            ("ENV_OUT", self.env_out.display().to_string()),
            ("TERM", "xterm-256color".to_string()),
            ("SECRET", "hunter2".to_string()),
            (
                "PATH",
                "/usr/bin:./node_modules/.bin:/nix/var/nix/profiles/default/bin:/bin".to_string(),
            ),
            (
                "NIX_PROFILES",
                "/nix/var/nix/profiles/default /home/u/.nix-profile".to_string(),
            ),
        ]);
        for (k, v) in extra {
            env.push(*k, *v);
        }
        env
    }

    fn launcher(&self, env: Environ) -> Launcher {
        Launcher::new(env)
            .with_program(FAKE.display().to_string())
            .with_rc_root(&self.rc_root)
    }

    fn args(&self) -> Vec<String> {
        fs::read_to_string(&self.args_out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn recorded_env(&self) -> String {
        fs::read_to_string(&self.env_out).unwrap()
    }
}

#[test]
fn test_bash_session_passes_rcfile_and_curated_env() {
    let session = Session::new();
    fs::write(session.home.join(".bashrc"), "alias ll='ls -l'\n").unwrap();

    let env = session.env(&[("SHELL", "/bin/bash")]);
    let shell = detect_shell(&env).unwrap().with_plan_hook("echo ready");
    session
        .launcher(env)
        .run(Some(&shell), Path::new("/proj"))
        .unwrap();

    let args = session.args();
    assert_eq!(args[0], "--command");
    assert!(args[1].starts_with(r#"exec env "SHELL=/bin/bash" /bin/bash --rcfile ""#));
    assert_eq!(args[2], "--pure");
    assert_eq!(args.last().unwrap(), "/proj");
    assert!(args.windows(2).any(|w| w == ["--keep", "TERM"]));
    assert!(args.windows(2).any(|w| w == ["--keep", "PARENT_PATH"]));
    assert!(!args.iter().any(|a| a == "SECRET" || a == "ARGS_OUT"));

    // The shellrc referenced by --rcfile exists and has both parts.
    let rcfile = args[1]
        .rsplit_once("--rcfile ")
        .map(|(_, p)| p.trim_matches('"'))
        .unwrap();
    assert!(Path::new(rcfile).starts_with(&session.rc_root));
    let content = fs::read_to_string(rcfile).unwrap();
    assert!(content.contains("alias ll='ls -l'"));
    assert!(content.contains("echo ready"));

    let recorded = session.recorded_env();
    assert!(recorded.contains("PARENT_PATH=/usr/bin:/bin\n"), "{recorded}");
    assert!(recorded.contains(
        "NIX_PROFILES=/nix/var/nix/profiles/default /home/u/.nix-profile\n"
    ));
    assert!(recorded.contains("GUARD=1\n"));
}

#[test]
fn test_zsh_session_points_zdotdir_at_shellrc_dir() {
    let session = Session::new();
    let env = session.env(&[("SHELL", "/usr/bin/zsh")]);
    let shell = detect_shell(&env).unwrap();
    session
        .launcher(env)
        .run(Some(&shell), Path::new("."))
        .unwrap();

    let command = &session.args()[1];
    let zdotdir = command
        .split(r#""ZDOTDIR="#)
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap();
    assert!(Path::new(zdotdir).join(".zshrc").is_file());
    assert!(command.ends_with("/usr/bin/zsh"));
}

#[test]
fn test_fallback_session_without_shell() {
    let session = Session::new();
    let env = session.env(&[]);
    assert!(matches!(
        detect_shell(&env),
        Err(ShellError::NoShellDetected)
    ));

    session
        .launcher(env)
        .run(None, Path::new("shell.nix"))
        .unwrap();

    let args = session.args();
    assert_eq!(args[0], "--pure");
    assert!(!args.iter().any(|a| a == "--command"));
    assert_eq!(
        args,
        vec![
            "--pure",
            "--keep",
            "HOME",
            "--keep",
            "TERM",
            "--keep",
            "PARENT_PATH",
            "--keep",
            "__ETC_PROFILE_NIX_SOURCED",
            "shell.nix",
        ]
    );
    // No shellrc was written.
    assert!(!session.rc_root.exists());
}

#[test]
fn test_nonzero_exit_is_propagated() {
    let session = Session::new();
    let env = session.env(&[("SHELL", "/bin/sh"), ("FAKE_EXIT", "3")]);
    let shell = detect_shell(&env).unwrap();

    let err = session
        .launcher(env)
        .run(Some(&shell), Path::new("."))
        .unwrap_err();
    match err {
        ShellError::ExitStatus { ref status, .. } => assert_eq!(status.code(), Some(3)),
        other => panic!("expected ExitStatus, got {other:?}"),
    }
}

#[test]
fn test_child_sees_only_the_snapshot() {
    let session = Session::new();
    let mut env = session.env(&[]);
    env.push("SECRET", "");
    session.launcher(env).run(None, Path::new(".")).unwrap();

    // The fake nix-shell isn't pure, so it sees the whole snapshot; the
    // last SECRET value wins.
    assert!(session.recorded_env().contains("SECRET=\n"));
}
