//! Tool settings loaded via `ortho-config`.
//!
//! These are the local knobs of the deployment tool itself (binary paths,
//! ssh options, the Windows-target flag), distinct from the kitchen's own
//! `solo.rb`. Configuration is merged from defaults, configuration files,
//! and `SKILLET_*` environment variables.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Local tool settings for ssh, rsync, and the syntax-check interpreter.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "SKILLET")]
pub struct KitchenSettings {
    /// Path to the `rsync` executable.
    #[ortho_config(default = "rsync".to_owned())]
    pub rsync_bin: String,
    /// Path to the `ssh` executable.
    #[ortho_config(default = "ssh".to_owned())]
    pub ssh_bin: String,
    /// Path to the local `ruby` interpreter used for script syntax checks.
    #[ortho_config(default = "ruby".to_owned())]
    pub ruby_bin: String,
    /// Extra ssh arguments (for example `-o StrictHostKeyChecking=no`),
    /// embedded both in captured/streamed runs and in the rsync `--rsh`
    /// command. Whitespace-separated; may be empty.
    #[ortho_config(default = String::new())]
    pub ssh_options: String,
    /// Whether the established connection targets a Windows host whose
    /// rsync runs under a Cygwin layer. Remote paths embedded in locally
    /// constructed commands are rewritten to `/cygdrive` form when set.
    #[ortho_config(default = false)]
    pub windows_target: bool,
}

/// Errors raised when loading or validating the tool settings.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SettingsError {
    /// Indicates that parsing or merging configuration layers failed.
    #[error("settings parsing failed: {0}")]
    Parse(String),
    /// Raised when a required value is empty after trimming whitespace.
    #[error("missing {field}: set SKILLET_{env_suffix} or add {field} to skillet.toml", env_suffix = field.to_uppercase())]
    Invalid {
        /// Settings field that failed validation.
        field: String,
    },
}

impl KitchenSettings {
    /// Loads settings from defaults, configuration files, and environment
    /// variables, ignoring CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, SettingsError> {
        Self::load_from_iter([std::ffi::OsString::from("skillet")])
            .map_err(|err| SettingsError::Parse(err.to_string()))
    }

    /// Ensures the binary paths are present after trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when any required field is empty.
    pub fn validate(&self) -> Result<(), SettingsError> {
        Self::require_value(&self.rsync_bin, "rsync_bin")?;
        Self::require_value(&self.ssh_bin, "ssh_bin")?;
        Self::require_value(&self.ruby_bin, "ruby_bin")?;
        Ok(())
    }

    fn require_value(value: &str, field: &str) -> Result<(), SettingsError> {
        if value.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: field.to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn base_settings() -> KitchenSettings {
        KitchenSettings {
            rsync_bin: String::from("rsync"),
            ssh_bin: String::from("ssh"),
            ruby_bin: String::from("ruby"),
            ssh_options: String::new(),
            windows_target: false,
        }
    }

    #[rstest]
    fn validate_accepts_defaults(base_settings: KitchenSettings) {
        assert!(base_settings.validate().is_ok());
    }

    #[rstest]
    #[case("rsync_bin")]
    #[case("ssh_bin")]
    #[case("ruby_bin")]
    fn validate_rejects_empty_binaries(base_settings: KitchenSettings, #[case] field: &str) {
        let mut settings = base_settings;
        match field {
            "rsync_bin" => settings.rsync_bin = String::from("  "),
            "ssh_bin" => settings.ssh_bin = String::from("  "),
            _ => settings.ruby_bin = String::from("  "),
        }
        let err = settings.validate().expect_err("empty value should fail");
        assert!(
            matches!(err, SettingsError::Invalid { field: ref failed } if failed == field),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn validate_allows_empty_ssh_options(base_settings: KitchenSettings) {
        let settings = KitchenSettings {
            ssh_options: String::new(),
            ..base_settings
        };
        assert!(settings.validate().is_ok());
    }
}
