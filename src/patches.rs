//! Supplemental library patches uploaded alongside the kitchen.
//!
//! Old chef-solo releases miss a few behaviours recipes commonly rely on;
//! the bundled patch files close those gaps. They are embedded in the
//! binary, staged to a temporary directory, and copied one by one into a
//! fixed library directory under the first cookbook path.

use camino::Utf8PathBuf;
use log::debug;
use thiserror::Error;

use crate::shell::{CommandRunner, ShellError, ShellSession, portable_mkdir_command};
use crate::sync::{KitchenSyncer, SyncError};

/// Remote directory for patch files, relative to the first cookbook path.
pub const PATCH_SUBDIRECTORY: &str = "chef_solo_patches/libraries";

/// Bundled patch files, copied verbatim in this order.
pub const PATCH_FILES: [(&str, &str); 2] = [
    (
        "deep_merge_workaround.rb",
        include_str!("../patches/deep_merge_workaround.rb"),
    ),
    ("solo_search.rb", include_str!("../patches/solo_search.rb")),
];

/// Errors raised while injecting patches.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PatchError {
    /// Raised when the remote patch directory cannot be created.
    #[error("failed to create remote directory {path}: {message}")]
    Mkdir {
        /// Remote directory that could not be created.
        path: String,
        /// Stderr captured from the remote command.
        message: String,
    },
    /// Raised when a patch cannot be staged locally before transfer.
    #[error("failed to stage patch {name}: {message}")]
    Stage {
        /// Patch file name that failed to stage.
        name: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the remote directory command cannot be started.
    #[error(transparent)]
    Shell(#[from] ShellError),
    /// Raised when a patch transfer fails.
    #[error(transparent)]
    Transfer(#[from] SyncError),
}

/// Ensures the remote patch directory exists and uploads every bundled
/// patch into it.
///
/// Directory creation is idempotent; patch copies reuse the kitchen
/// transfer mechanism without delete-mirroring.
///
/// # Errors
///
/// Returns [`PatchError`] when the directory cannot be created, a patch
/// cannot be staged, or a transfer fails.
pub fn inject_patches<S: ShellSession, R: CommandRunner>(
    session: &S,
    syncer: &KitchenSyncer<R>,
    cookbook_path: &str,
) -> Result<(), PatchError> {
    let remote_dir = format!("{cookbook_path}/{PATCH_SUBDIRECTORY}");

    let mkdir = portable_mkdir_command(&remote_dir);
    let output = session.run(&mkdir)?;
    if !output.is_success() {
        return Err(PatchError::Mkdir {
            path: remote_dir,
            message: output.stderr,
        });
    }

    let staging = tempfile::tempdir().map_err(|err| PatchError::Stage {
        name: String::from("(staging directory)"),
        message: err.to_string(),
    })?;

    for (name, contents) in PATCH_FILES {
        let staged = staging.path().join(name);
        std::fs::write(&staged, contents).map_err(|err| PatchError::Stage {
            name: name.to_owned(),
            message: err.to_string(),
        })?;
        let staged_utf8 = Utf8PathBuf::from_path_buf(staged).map_err(|path| PatchError::Stage {
            name: name.to_owned(),
            message: format!("staging path is not valid UTF-8: {}", path.display()),
        })?;
        debug!("uploading patch {name} to {remote_dir}");
        syncer.copy_file(session, &staged_utf8, &remote_dir)?;
    }
    Ok(())
}
