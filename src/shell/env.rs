//! Environment curation for the nix-shell session.
//!
//! `nix-shell --pure` strips the environment down to almost nothing. The
//! variables in [`KEEP_ENV`] are the ones we ask it to carry over verbatim,
//! and the parent shell's `PATH` crosses over as `PARENT_PATH` after it has
//! been cleaned of relative entries and Nix profile directories.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Separator between entries of `PATH`-like variables on this platform.
pub const LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Environment variables that are copied verbatim into the new shell.
pub const KEEP_ENV: &[&str] = &[
    // POSIX
    "HOME",
    "OLDPWD",
    "PWD",
    "TERM",
    "TZ",
    "USER",
    // POSIX locale. LC_ALL overrides the rest, LANG is the fallback for
    // any that are unset.
    "LC_ALL",
    "LANG",
    "LC_COLLATE",
    "LC_CTYPE",
    "LC_MESSAGES",
    "LC_MONETARY",
    "LC_NUMERIC",
    "LC_TIME",
    // Not POSIX, but most programs agree on them.
    "TERM_PROGRAM",
    "TERM_PROGRAM_VERSION",
    "SHLVL",
    // Set by macOS Terminal.app before it launches the shell. Dropping them
    // breaks session save/resume (see /etc/zshrc_Apple_Terminal).
    "TERM_SESSION_ID",
    "SHELL_SESSIONS_DISABLE",
    "SECURITYSESSIONID",
    // Nix and devshell
    "PARENT_PATH",               // PATH of the shell that ran `devshell shell`
    "__ETC_PROFILE_NIX_SOURCED", // stops nix-daemon.sh from being sourced again
    "NIX_SSL_CERT_FILE",
    "SSL_CERT_FILE",
];

static KEEP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| KEEP_ENV.iter().copied().collect());

/// Check whether `name` is on the keep list. Exact, case-sensitive match.
pub fn is_kept(name: &str) -> bool {
    KEEP_SET.contains(name)
}

/// Build the `--keep NAME` arguments for every kept variable in `env`.
///
/// `env` holds `NAME=VALUE` entries. Output order follows input order and
/// duplicate names each produce their own pair.
///
/// # Examples
///
/// ```
/// use devshell::shell::keep_args;
///
/// let args = keep_args(["HOME=/x", "FOO=1", "TERM=xterm"]);
/// assert_eq!(args, ["--keep", "HOME", "--keep", "TERM"]);
/// ```
pub fn keep_args<I, S>(env: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = Vec::new();
    for kv in env {
        let kv = kv.as_ref();
        let name = kv.split_once('=').map_or(kv, |(name, _)| name);
        if is_kept(name) {
            args.push("--keep".to_string());
            args.push(name.to_string());
        }
    }
    args
}

/// Lexically normalize a path: drop `.` components, resolve `..` against
/// the preceding component and collapse repeated or trailing separators.
/// Returns `.` for an empty path. Never touches the filesystem.
pub fn clean_path(path: &str) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in Path::new(path).components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            _ => out.push(comp),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Split a space-delimited list of paths, such as `NIX_PROFILES`, and clean
/// each entry. Nix uses whitespace here regardless of platform.
pub fn split_nix_list(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|dir| clean_path(dir).to_string_lossy().into_owned())
        .collect()
}

/// Clean a `PATH`-formatted string for passing into nix-shell.
///
/// Each entry is normalized with [`clean_path`], then dropped if it is
/// relative or if it starts with one of `nix_profile_dirs`. Survivors keep
/// their order.
///
/// The profile check is a plain string prefix: `/nix/store/abc` also
/// excludes `/nix/store/abcdef`.
pub fn clean_env_path(path_env: &str, nix_profile_dirs: &[String]) -> String {
    if path_env.is_empty() {
        return String::new();
    }

    let mut cleaned: Vec<String> = Vec::new();
    for entry in path_env.split(LIST_SEPARATOR) {
        let path = clean_path(entry);
        if !path.is_absolute() {
            continue;
        }

        let path = path.to_string_lossy();
        let under_profile = nix_profile_dirs
            .iter()
            .any(|dir| path.starts_with(dir.as_str()));
        if !under_profile {
            cleaned.push(path.into_owned());
        }
    }
    cleaned.join(&LIST_SEPARATOR.to_string())
}

/// An ordered snapshot of environment variables.
///
/// Names and values are kept as `OsString`, so variables that aren't valid
/// UTF-8 still reach the child unchanged. Later entries win over earlier
/// ones with the same name, which is how the snapshot behaves once it is
/// applied to a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    vars: Vec<(OsString, OsString)>,
}

impl Environ {
    /// Snapshot the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Build a snapshot from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of `name`, if set. The last entry wins.
    pub fn get_os(&self, name: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_os_str())
    }

    /// Value of `name`, if set and valid UTF-8. The last entry wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_os(name).and_then(OsStr::to_str)
    }

    /// Value of `name` if set to something other than the empty string.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Append an entry, overriding any earlier value for `name`.
    pub fn push(&mut self, name: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Entries in `NAME=VALUE` form, lossily converted to UTF-8.
    pub fn entries(&self) -> impl Iterator<Item = String> + '_ {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
