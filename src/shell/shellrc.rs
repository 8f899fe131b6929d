//! Generation of the shell init file used inside the session.
//!
//! The generated file sources nothing: it inlines the user's own init file
//! and then appends the user and plan hooks, so the shell sees one script.
//! Each session writes into a fresh directory because zsh can only be
//! redirected to a directory (`ZDOTDIR`), not to a single file.
//!
//! The directory is not removed: the interactive shell reads from it for as
//! long as the session runs.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::detect::ShellProfile;
use super::env::clean_path;
use super::error::{ShellError, ShellResult};

/// File name used when the user's init file has no usable name.
const FALLBACK_SHELLRC_NAME: &str = "shellrc";

/// Values filled into the shellrc template. Any of them may be empty.
#[derive(Debug, Clone, Copy)]
pub struct ShellrcFields<'a> {
    /// Contents of the user's init file, trimmed. Raw bytes: init files
    /// aren't required to be UTF-8.
    pub original_init: &'a [u8],
    /// Where the user's init file lives, for reference in comments.
    pub original_init_path: &'a Path,
    /// User-level hook, trimmed.
    pub user_hook: &'a str,
    /// Plan/session-level hook, trimmed.
    pub plan_hook: &'a str,
}

/// Renders a shellrc from its fields.
pub trait RenderShellrc {
    fn render(&self, fields: &ShellrcFields<'_>, out: &mut dyn Write) -> io::Result<()>;
}

/// The built-in shellrc template.
///
/// Sections whose field is empty are left out entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShellrc;

impl RenderShellrc for DefaultShellrc {
    fn render(&self, fields: &ShellrcFields<'_>, out: &mut dyn Write) -> io::Result<()> {
        let original_path = fields.original_init_path.display();

        if !fields.original_init.is_empty() {
            writeln!(out, "# Begin {original_path}")?;
            writeln!(out)?;
            out.write_all(fields.original_init)?;
            writeln!(out)?;
            writeln!(out)?;
            writeln!(out, "# End {original_path}")?;
            writeln!(out)?;
        }

        out.write_all(SESSION_PREAMBLE.as_bytes())?;

        if !fields.user_hook.is_empty() {
            writeln!(out)?;
            writeln!(out, "# Begin user init hook")?;
            writeln!(out)?;
            writeln!(out, "{}", fields.user_hook)?;
            writeln!(out)?;
            writeln!(out, "# End user init hook")?;
        }

        if !fields.plan_hook.is_empty() {
            writeln!(out)?;
            writeln!(out, "# Begin plan init hook")?;
            writeln!(out)?;
            writeln!(out, "{}", fields.plan_hook)?;
            writeln!(out)?;
            writeln!(out, "# End plan init hook")?;
        }

        Ok(())
    }
}

/// Runs between the user's init file and the hooks. Must stay valid in
/// bash, zsh, ksh and POSIX sh.
const SESSION_PREAMBLE: &str = r#"# Begin devshell post-init

# nix-shell puts the environment's PATH first. Keep the parent shell's
# PATH reachable after it, but never add an empty entry.
if [ -n "$PARENT_PATH" ]; then
  PATH="$PATH:$PARENT_PATH"
  export PATH
fi

# Make it obvious that we're inside devshell.
PS1="(devshell) $PS1"

# End devshell post-init
"#;

/// Write the session shellrc for `profile` using [`DefaultShellrc`].
///
/// See [`write_shellrc_with`].
pub fn write_shellrc(profile: &ShellProfile, tmp_root: &Path) -> ShellResult<PathBuf> {
    write_shellrc_with(profile, tmp_root, &DefaultShellrc)
}

/// Write the session shellrc for `profile` into a new directory under
/// `tmp_root` and return its path.
///
/// `profile` must have an rc path. Shells without one get the fallback
/// command instead of a shellrc; calling this for them is a bug.
///
/// The user's existing init file is included on a best-effort basis: if it
/// can't be read it is treated as empty.
pub fn write_shellrc_with(
    profile: &ShellProfile,
    tmp_root: &Path,
    template: &dyn RenderShellrc,
) -> ShellResult<PathBuf> {
    debug_assert!(
        profile.rc_path().is_some(),
        "write_shellrc called without a user shellrc path; use the fallback shell instead"
    );

    let temp_dir_err = |source: io::Error| ShellError::TempDir {
        root: tmp_root.to_path_buf(),
        source,
    };
    fs::create_dir_all(tmp_root).map_err(temp_dir_err)?;
    let dir = tempfile::Builder::new()
        .prefix("devshell")
        .tempdir_in(tmp_root)
        .map_err(temp_dir_err)?
        .keep();

    let user_shellrc = profile
        .rc_path()
        .and_then(|p| fs::read(p).ok())
        .unwrap_or_default();

    // Give the new file the same name as the user's, so that shells which
    // pick their init file by name (zsh) find it.
    let name = profile
        .rc_path()
        .and_then(Path::file_name)
        .unwrap_or(OsStr::new(FALLBACK_SHELLRC_NAME));
    let path = dir.join(name);

    let original_init_path = profile
        .rc_path()
        .map(|p| clean_path(&p.to_string_lossy()))
        .unwrap_or_default();

    let file = fs::File::create(&path).map_err(|source| ShellError::CreateShellrc {
        path: path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    let fields = ShellrcFields {
        original_init: user_shellrc.trim_ascii(),
        original_init_path: &original_init_path,
        user_hook: profile.user_hook().trim(),
        plan_hook: profile.plan_hook().trim(),
    };
    template
        .render(&fields, &mut out)
        .and_then(|()| out.flush())
        .map_err(|source| ShellError::RenderShellrc {
            path: path.clone(),
            source,
        })?;

    tracing::debug!("Wrote devshell shellrc to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::detect::detect_shell;
    use crate::shell::env::Environ;
    use tempfile::TempDir;

    fn bash_profile(home: &Path) -> ShellProfile {
        let env = Environ::from_pairs([
            ("SHELL", "/bin/bash".to_string()),
            ("HOME", home.display().to_string()),
        ]);
        detect_shell(&env).unwrap()
    }

    fn render_to_string(fields: &ShellrcFields<'_>) -> String {
        let mut buf = Vec::new();
        DefaultShellrc.render(fields, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_shellrc_includes_original_and_hooks() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        fs::write(home.path().join(".bashrc"), "\n  echo hi  \n\n").unwrap();

        let profile = bash_profile(home.path()).with_user_hook("  export X=1\n");
        let path = write_shellrc(&profile, tmp.path()).unwrap();

        assert!(path.starts_with(tmp.path()));
        assert_eq!(path.file_name().unwrap(), ".bashrc");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\necho hi\n"));
        assert!(content.contains("\nexport X=1\n"));
        assert!(content.contains(&format!(
            "# Begin {}",
            home.path().join(".bashrc").display()
        )));
        assert!(!content.contains("plan init hook"));

        let original = content.find("echo hi").unwrap();
        let hook = content.find("export X=1").unwrap();
        assert!(original < hook);
    }

    #[test]
    fn test_write_shellrc_keeps_non_utf8_bytes() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        fs::write(home.path().join(".bashrc"), b"\talias cafe='echo caf\xe9'\n\n").unwrap();

        let path = write_shellrc(&bash_profile(home.path()), tmp.path()).unwrap();

        let content = fs::read(&path).unwrap();
        let line: &[u8] = b"\nalias cafe='echo caf\xe9'\n";
        assert!(content.windows(line.len()).any(|w| w == line));
        let replacement = "\u{FFFD}".as_bytes();
        assert!(!content.windows(replacement.len()).any(|w| w == replacement));
    }

    #[test]
    fn test_write_shellrc_unreadable_original_is_empty() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();

        // No .bashrc in home
        let profile = bash_profile(home.path()).with_plan_hook("echo plan");
        let path = write_shellrc(&profile, tmp.path()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("# Begin /"));
        assert!(content.contains("# Begin plan init hook\n\necho plan\n"));
        assert!(content.contains("PARENT_PATH"));
    }

    #[test]
    fn test_write_shellrc_fresh_dir_per_call() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        let profile = bash_profile(home.path());

        let first = write_shellrc(&profile, tmp.path()).unwrap();
        let second = write_shellrc(&profile, tmp.path()).unwrap();
        assert_ne!(first.parent(), second.parent());
        // Both survive after returning.
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_write_shellrc_creates_missing_root() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("rc");

        let path = write_shellrc(&bash_profile(home.path()), &root).unwrap();
        assert!(path.starts_with(&root));
    }

    #[test]
    fn test_write_shellrc_zsh_keeps_name() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        let env = Environ::from_pairs([
            ("SHELL", "/bin/zsh".to_string()),
            ("HOME", home.path().display().to_string()),
        ]);
        let profile = detect_shell(&env).unwrap();

        let path = write_shellrc(&profile, tmp.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), ".zshrc");
    }

    struct FailingTemplate;

    impl RenderShellrc for FailingTemplate {
        fn render(&self, _: &ShellrcFields<'_>, _: &mut dyn Write) -> io::Result<()> {
            Err(io::Error::other("template exploded"))
        }
    }

    #[test]
    fn test_write_shellrc_render_failure() {
        let home = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();

        let err = write_shellrc_with(&bash_profile(home.path()), tmp.path(), &FailingTemplate)
            .unwrap_err();
        assert!(matches!(err, ShellError::RenderShellrc { .. }));
        assert!(err.to_string().contains("template exploded"));
    }

    #[test]
    fn test_render_omits_empty_sections() {
        let content = render_to_string(&ShellrcFields {
            original_init: b"",
            original_init_path: Path::new("/home/u/.bashrc"),
            user_hook: "",
            plan_hook: "",
        });
        assert!(!content.contains("/home/u/.bashrc"));
        assert!(!content.contains("user init hook"));
        assert!(!content.contains("plan init hook"));
        assert!(content.starts_with("# Begin devshell post-init"));
    }

    #[test]
    fn test_render_section_order() {
        let content = render_to_string(&ShellrcFields {
            original_init: b"alias ll='ls -l'",
            original_init_path: Path::new("/home/u/.zshrc"),
            user_hook: "echo user",
            plan_hook: "echo plan",
        });
        let positions: Vec<usize> = [
            "# Begin /home/u/.zshrc",
            "alias ll='ls -l'",
            "# End /home/u/.zshrc",
            "# Begin devshell post-init",
            "echo user",
            "echo plan",
        ]
        .iter()
        .map(|needle| content.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{content}");
    }
}
