//! Kitchen location and layout validation.
//!
//! A kitchen is the local directory tree being deployed. The pipeline
//! refuses to start unless the workspace carries the minimum layout a
//! chef-solo run needs (`solo.rb` plus a `cookbooks` directory).

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Resolves and validates the workspace the pipeline deploys.
pub trait KitchenLocator {
    /// Root of the kitchen tree.
    fn root(&self) -> &Utf8Path;

    /// Confirms the workspace has the required kitchen layout.
    ///
    /// # Errors
    ///
    /// Returns [`KitchenError`] when the root is inaccessible or required
    /// entries are missing.
    fn validate(&self) -> Result<(), KitchenError>;
}

/// Errors raised while locating or validating a kitchen.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum KitchenError {
    /// Raised when the kitchen root cannot be accessed.
    #[error("cannot access kitchen at {root}: {message}")]
    Access {
        /// Root path that failed to open.
        root: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a required kitchen entry is absent.
    #[error("{root} is not a kitchen: missing {missing}")]
    NotAKitchen {
        /// Root path that failed validation.
        root: Utf8PathBuf,
        /// Name of the missing entry.
        missing: String,
    },
}

/// Kitchen rooted at a concrete directory, usually the current one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirKitchen {
    root: Utf8PathBuf,
}

/// Entries that must exist before the pipeline starts.
const REQUIRED_ENTRIES: [&str; 2] = ["solo.rb", "cookbooks"];

impl DirKitchen {
    /// Creates a kitchen rooted at `root` without validating it yet.
    #[must_use]
    pub const fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Creates a kitchen rooted at the process's current directory.
    ///
    /// # Errors
    ///
    /// Returns [`KitchenError::Access`] when the current directory cannot be
    /// resolved or is not valid UTF-8.
    pub fn current_dir() -> Result<Self, KitchenError> {
        let cwd = std::env::current_dir().map_err(|err| KitchenError::Access {
            root: Utf8PathBuf::from("."),
            message: err.to_string(),
        })?;
        let root = Utf8PathBuf::from_path_buf(cwd).map_err(|path| KitchenError::Access {
            root: Utf8PathBuf::from("."),
            message: format!("current directory is not valid UTF-8: {}", path.display()),
        })?;
        Ok(Self::new(root))
    }
}

impl KitchenLocator for DirKitchen {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn validate(&self) -> Result<(), KitchenError> {
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority()).map_err(|err| {
            KitchenError::Access {
                root: self.root.clone(),
                message: err.to_string(),
            }
        })?;

        for entry in REQUIRED_ENTRIES {
            if !dir.exists(entry) {
                return Err(KitchenError::NotAKitchen {
                    root: self.root.clone(),
                    missing: entry.to_owned(),
                });
            }
        }
        Ok(())
    }
}
