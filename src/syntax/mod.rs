//! Local syntax validation of the kitchen before any network activity.
//!
//! Scripts are parse-checked through the local Ruby interpreter (`ruby -c`,
//! never executed); structured-data documents get a strict data-only JSON
//! parse so no type-driven construction can fire from embedded tags. Any
//! malformed file aborts the run.

use std::ffi::OsString;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use crate::shell::{CommandRunner, ShellError};

/// Errors raised while scanning or checking kitchen files.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SyntaxError {
    /// Raised when a script fails its parse-only check.
    #[error("syntax error in {path}")]
    Script {
        /// Offending file, relative to the kitchen root.
        path: Utf8PathBuf,
    },
    /// Raised when a structured-data document fails to parse.
    #[error("syntax error in {path}: {message}")]
    Data {
        /// Offending file, relative to the kitchen root.
        path: Utf8PathBuf,
        /// Parser's own message.
        message: String,
    },
    /// Raised when the workspace tree cannot be traversed or read.
    #[error("failed to scan {path}: {message}")]
    Walk {
        /// Path that could not be visited.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the local interpreter cannot be started.
    #[error(transparent)]
    Shell(#[from] ShellError),
}

/// Parse-checks every script and structured-data file under a kitchen.
#[derive(Clone, Debug)]
pub struct SyntaxValidator<R: CommandRunner> {
    ruby_bin: String,
    runner: R,
}

impl<R: CommandRunner> SyntaxValidator<R> {
    /// Creates a validator using `ruby_bin` for script checks.
    #[must_use]
    pub const fn new(ruby_bin: String, runner: R) -> Self {
        Self { ruby_bin, runner }
    }

    /// Scans the kitchen subtree and fails on the first malformed file.
    ///
    /// Scripts are checked before data documents; dot-entries are skipped at
    /// every level, matching how the kitchen is globbed for deployment.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] naming the first file that fails its check,
    /// or describing a traversal failure.
    pub fn check(&self, root: &Utf8Path, out: &mut impl Write) -> Result<(), SyntaxError> {
        writeln!(out, "Checking cookbook syntax...").ok();

        let files = collect_checked_files(root)?;
        debug!(
            "syntax scan found {} scripts and {} data files",
            files.scripts.len(),
            files.data.len()
        );

        for script in &files.scripts {
            self.check_script(root, script)?;
        }
        for document in &files.data {
            check_data_file(root, document)?;
        }
        Ok(())
    }

    fn check_script(&self, root: &Utf8Path, script: &Utf8Path) -> Result<(), SyntaxError> {
        let full_path = root.join(script);
        let args = [OsString::from("-c"), OsString::from(full_path.as_str())];
        let output = self.runner.run(&self.ruby_bin, &args)?;
        if output.is_success() {
            return Ok(());
        }
        Err(SyntaxError::Script {
            path: script.to_path_buf(),
        })
    }
}

/// Files subject to syntax checks, relative to the kitchen root.
#[derive(Debug, Default)]
struct CheckedFiles {
    scripts: Vec<Utf8PathBuf>,
    data: Vec<Utf8PathBuf>,
}

fn collect_checked_files(root: &Utf8Path) -> Result<CheckedFiles, SyntaxError> {
    let mut files = CheckedFiles::default();
    walk(root, Utf8Path::new(""), &mut files)?;
    files.scripts.sort();
    files.data.sort();
    Ok(files)
}

fn walk(root: &Utf8Path, relative: &Utf8Path, files: &mut CheckedFiles) -> Result<(), SyntaxError> {
    let current = if relative.as_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    };
    let entries = std::fs::read_dir(current.as_std_path()).map_err(|err| SyntaxError::Walk {
        path: relative.to_path_buf(),
        message: err.to_string(),
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|err| SyntaxError::Walk {
            path: relative.to_path_buf(),
            message: err.to_string(),
        })?;
        let raw_name = entry.file_name();
        let Some(name) = raw_name.to_str() else {
            return Err(SyntaxError::Walk {
                path: relative.to_path_buf(),
                message: format!("non-UTF-8 file name: {}", raw_name.to_string_lossy()),
            });
        };
        if name.starts_with('.') {
            continue;
        }

        let entry_relative = relative.join(name);
        let file_type = entry.file_type().map_err(|err| SyntaxError::Walk {
            path: entry_relative.clone(),
            message: err.to_string(),
        })?;

        if file_type.is_dir() {
            walk(root, &entry_relative, files)?;
        } else if name.ends_with(".rb") {
            files.scripts.push(entry_relative);
        } else if name.ends_with(".json") {
            files.data.push(entry_relative);
        }
    }
    Ok(())
}

/// Parses a JSON document as pure data, with no object construction from
/// embedded type tags.
fn check_data_file(root: &Utf8Path, document: &Utf8Path) -> Result<(), SyntaxError> {
    let full_path = root.join(document);
    let content =
        std::fs::read_to_string(full_path.as_std_path()).map_err(|err| SyntaxError::Walk {
            path: document.to_path_buf(),
            message: err.to_string(),
        })?;
    serde_json::from_str::<serde_json::Value>(&content).map_err(|err| SyntaxError::Data {
        path: document.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(())
}
