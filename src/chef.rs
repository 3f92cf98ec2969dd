//! Remote chef runtime version check.
//!
//! Before any transfer, the target host is probed for a chef gem matching
//! the supported constraint. The probe runs in captured mode; its output is
//! discarded and only the exit status matters.

use log::debug;
use thiserror::Error;

use crate::shell::ShellSession;

/// Gem version constraint the remote chef runtime must satisfy.
pub const CHEF_GEM_CONSTRAINT: &str = "~>0.10.4";

/// Errors raised by the remote version check.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ChefVersionError {
    /// Raised when the probe command cannot be executed at all.
    #[error("could not probe the chef gem on {host}: {message}")]
    Probe {
        /// Target host that could not be probed.
        host: String,
        /// Underlying failure description.
        message: String,
    },
    /// Raised when the installed chef gem misses the constraint.
    #[error(
        "the chef gem on {host} is out of date; run `skillet prepare {target}` to upgrade chef to {constraint}"
    )]
    OutOfDate {
        /// Target host with the stale runtime.
        host: String,
        /// Connection string for the suggested remediation command.
        target: String,
        /// Literal constraint the runtime must satisfy.
        constraint: String,
    },
}

/// Confirms the remote chef runtime satisfies [`CHEF_GEM_CONSTRAINT`].
///
/// # Errors
///
/// Returns [`ChefVersionError`] when the probe cannot run or the installed
/// gem misses the constraint.
pub fn check_chef_version<S: ShellSession>(session: &S) -> Result<(), ChefVersionError> {
    let command = format!("ruby -rubygems -e \"gem 'chef', '{CHEF_GEM_CONSTRAINT}'\"");
    debug!("probing chef gem with: {command}");

    let output = session.run(&command).map_err(|err| ChefVersionError::Probe {
        host: session.host().to_owned(),
        message: err.to_string(),
    })?;

    if output.is_success() {
        return Ok(());
    }
    Err(ChefVersionError::OutOfDate {
        host: session.host().to_owned(),
        target: session.connection_string(),
        constraint: CHEF_GEM_CONSTRAINT.to_owned(),
    })
}
