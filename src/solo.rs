//! Local `solo.rb` configuration reader.
//!
//! The kitchen's `solo.rb` is consumed remotely by chef-solo itself; this
//! module reads the small declarative subset the pipeline needs locally:
//! the file cache path that doubles as the remote deployment root, and the
//! cookbook path list whose first entry anchors the patch directory.
//! Settings outside that subset are ignored.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Remote cache path used when `solo.rb` does not set one.
pub const DEFAULT_FILE_CACHE_PATH: &str = "/var/chef-solo";

/// Values resolved from the kitchen's `solo.rb`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SoloConfig {
    /// Remote path the kitchen is mirrored to and chef-solo runs from.
    pub file_cache_path: String,
    /// Cookbook search path; the first entry anchors patch injection.
    pub cookbook_path: Vec<String>,
}

impl Default for SoloConfig {
    fn default() -> Self {
        Self {
            file_cache_path: DEFAULT_FILE_CACHE_PATH.to_owned(),
            cookbook_path: vec![format!("{DEFAULT_FILE_CACHE_PATH}/cookbooks")],
        }
    }
}

/// Errors raised while loading `solo.rb`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SoloConfigError {
    /// Raised when the file cannot be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Path that could not be read.
        path: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a recognised setting has an unparseable value.
    #[error("failed to parse {path} line {line}: {message}")]
    Parse {
        /// Path being parsed.
        path: String,
        /// One-based line number of the offending assignment.
        line: usize,
        /// Description of the problem.
        message: String,
    },
}

impl SoloConfig {
    /// Loads `solo.rb` from the kitchen root.
    ///
    /// # Errors
    ///
    /// Returns [`SoloConfigError`] when the file is unreadable or a
    /// recognised setting cannot be parsed.
    pub fn load(kitchen_root: &Utf8Path) -> Result<Self, SoloConfigError> {
        let display_path = kitchen_root.join("solo.rb");
        let dir = Dir::open_ambient_dir(kitchen_root, ambient_authority()).map_err(|err| {
            SoloConfigError::Read {
                path: display_path.to_string(),
                message: err.to_string(),
            }
        })?;
        let content = dir
            .read_to_string("solo.rb")
            .map_err(|err| SoloConfigError::Read {
                path: display_path.to_string(),
                message: err.to_string(),
            })?;
        Self::parse(&content, display_path.as_str())
    }

    /// Parses `solo.rb` content.
    ///
    /// # Errors
    ///
    /// Returns [`SoloConfigError::Parse`] when a recognised setting has an
    /// unparseable value.
    pub fn parse(content: &str, path: &str) -> Result<Self, SoloConfigError> {
        let mut config = Self::default();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            match key {
                "file_cache_path" => {
                    config.file_cache_path =
                        parse_string(value).ok_or_else(|| parse_error(path, index, value))?;
                }
                "cookbook_path" => {
                    config.cookbook_path =
                        parse_string_list(value).ok_or_else(|| parse_error(path, index, value))?;
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// First cookbook path entry, anchoring the remote patch directory.
    #[must_use]
    pub fn first_cookbook_path(&self) -> &str {
        self.cookbook_path
            .first()
            .map_or(DEFAULT_FILE_CACHE_PATH, String::as_str)
    }
}

fn parse_error(path: &str, index: usize, value: &str) -> SoloConfigError {
    SoloConfigError::Parse {
        path: path.to_owned(),
        line: index + 1,
        message: format!("expected a quoted string or string array, got `{}`", value.trim()),
    }
}

/// Strips matching single or double quotes from a Ruby string literal.
fn parse_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })?;
    Some(unquoted.to_owned())
}

/// Parses either a single string literal or a `[ "a", "b" ]` array.
fn parse_string_list(value: &str) -> Option<Vec<String>> {
    let trimmed = value.trim();
    let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return parse_string(trimmed).map(|single| vec![single]);
    };

    let mut entries = Vec::new();
    for part in inner.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        entries.push(parse_string(part)?);
    }
    if entries.is_empty() {
        return None;
    }
    Some(entries)
}
