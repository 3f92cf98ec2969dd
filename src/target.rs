//! Target host resolution from the `[user@]host` CLI positional.
//!
//! The target is parsed once at startup and stays immutable for the whole
//! run; every place that needs connection arguments derives them from the
//! same value.

use thiserror::Error;

/// Remote host the kitchen is deployed to, with an optional login user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// Login user, when the positional carried a `user@` prefix.
    pub user: Option<String>,
    /// Hostname or address of the target machine.
    pub host: String,
}

/// Errors raised while parsing the target positional.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TargetError {
    /// Raised when the host part is empty.
    #[error("invalid target `{spec}`: host must not be empty")]
    EmptyHost {
        /// Original positional value.
        spec: String,
    },
    /// Raised when a `user@` prefix is present but empty.
    #[error("invalid target `{spec}`: user must not be empty")]
    EmptyUser {
        /// Original positional value.
        spec: String,
    },
}

impl Target {
    /// Parses a `[user@]host` specification.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when the host or a supplied user is empty.
    pub fn parse(spec: &str) -> Result<Self, TargetError> {
        let (user, host) = spec.split_once('@').map_or_else(
            || (None, spec),
            |(user, host)| (Some(user), host),
        );

        if let Some(name) = user
            && name.trim().is_empty()
        {
            return Err(TargetError::EmptyUser {
                spec: spec.to_owned(),
            });
        }
        if host.trim().is_empty() {
            return Err(TargetError::EmptyHost {
                spec: spec.to_owned(),
            });
        }

        Ok(Self {
            user: user.map(str::to_owned),
            host: host.to_owned(),
        })
    }

    /// Renders the `user@host` (or bare `host`) connection string used for
    /// ssh argv entries and rsync destinations.
    #[must_use]
    pub fn connection_string(&self) -> String {
        self.user.as_ref().map_or_else(
            || self.host.clone(),
            |user| format!("{user}@{}", self.host),
        )
    }
}
