//! Path helpers for embedding remote paths into locally built commands.

use super::ShellSession;

/// Helpers applied wherever a remote path lands inside a locally
/// constructed command string (sync destinations, patch destinations,
/// directory creation).
pub trait PathTools {
    /// Whether remote paths must be rewritten for a Cygwin-hosted rsync.
    fn windows_paths(&self) -> bool;

    /// Rewrites `<drive>:` prefixes to `/cygdrive/<drive>` when targeting a
    /// Windows host; other paths pass through unchanged.
    fn adjust_remote_path(&self, path: &str) -> String {
        if self.windows_paths() {
            adjust_cygwin_path(path)
        } else {
            path.to_owned()
        }
    }
}

impl<S: ShellSession> PathTools for S {
    fn windows_paths(&self) -> bool {
        self.windows_target()
    }
}

/// Rewrites a `C:/...` style path into the `/cygdrive/C/...` form a Cygwin
/// rsync expects. Paths without a drive-letter prefix are returned as-is.
#[must_use]
pub fn adjust_cygwin_path(path: &str) -> String {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("/cygdrive/{drive}{}", chars.as_str())
        }
        _ => path.to_owned(),
    }
}

/// Builds the portable directory-creation command executed on the remote
/// host. The remote Ruby runtime is used instead of `mkdir -p` so the same
/// line works on Windows targets; the call is idempotent.
#[must_use]
pub fn portable_mkdir_command(path: &str) -> String {
    format!("ruby -rfileutils -e \"FileUtils.mkdir_p('{path}')\"")
}
