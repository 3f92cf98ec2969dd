//! The deployment pipeline: validate, transfer, provision.
//!
//! `CookPipeline` sequences the fixed stage order: kitchen validation,
//! local syntax checks, `solo.rb` resolution, the remote chef version
//! probe, the delete-aware kitchen mirror, patch injection, and finally the
//! streamed chef-solo invocation. The first failing stage aborts the run;
//! remote side effects of completed stages persist.

use std::io::Write;

use log::debug;
use thiserror::Error;

use crate::chef::{ChefVersionError, check_chef_version};
use crate::kitchen::{KitchenError, KitchenLocator};
use crate::patches::{PatchError, inject_patches};
use crate::rvm;
use crate::settings::KitchenSettings;
use crate::shell::{CommandRunner, ShellError, ShellSession};
use crate::solo::{SoloConfig, SoloConfigError};
use crate::sync::{KitchenSyncer, SyncError};
use crate::syntax::{SyntaxError, SyntaxValidator};

/// Flags gating individual pipeline stages, immutable once parsed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PipelineOptions {
    /// Skip the remote chef gem version probe.
    pub skip_chef_check: bool,
    /// Stop after transfer stages; do not run chef-solo remotely.
    pub sync_only: bool,
    /// Skip the local syntax checks.
    pub skip_syntax_check: bool,
    /// Verbosity level; above the default adds debug logging to chef-solo.
    pub verbosity: u8,
    /// Node configuration file name; defaults to `nodes/<host>.json`.
    pub node_config: Option<String>,
}

/// Remote provisioning command assembled from typed fragments.
///
/// The preamble is nullable by design: its absence simply drops the `&&`
/// join rather than splicing conditional strings into the main command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteCommand {
    /// Optional environment bootstrap chained before the main command.
    pub preamble: Option<String>,
    /// The provisioning invocation itself.
    pub main: String,
}

impl RemoteCommand {
    /// Renders the final shell line, `&&`-chaining the preamble so its
    /// failure short-circuits the main command.
    #[must_use]
    pub fn render(&self) -> String {
        self.preamble.as_ref().map_or_else(
            || self.main.clone(),
            |preamble| format!("{preamble} && {}", self.main),
        )
    }
}

/// Errors that abort the pipeline, one variant per stage.
#[derive(Debug, Error)]
pub enum CookError {
    /// Raised before any stage when the workspace is not a kitchen.
    #[error("kitchen validation failed: {0}")]
    Kitchen(#[from] KitchenError),
    /// Raised by the local syntax stage; no network activity has happened.
    #[error("cookbook syntax check failed: {0}")]
    Syntax(#[from] SyntaxError),
    /// Raised when the kitchen's `solo.rb` cannot be resolved.
    #[error("failed to load solo.rb: {0}")]
    SoloConfig(#[from] SoloConfigError),
    /// Raised by the remote version probe.
    #[error(transparent)]
    ChefVersion(#[from] ChefVersionError),
    /// Raised by the kitchen mirror stage.
    #[error("kitchen sync failed: {0}")]
    Sync(#[from] SyncError),
    /// Raised by the patch injection stage.
    #[error("patch injection failed: {0}")]
    Patches(#[from] PatchError),
    /// Raised when the final provisioning command cannot be started.
    #[error("remote provisioning failed to start: {0}")]
    Remote(#[source] ShellError),
    /// Raised when the streamed session ends without an exit status.
    #[error("remote provisioning terminated without an exit status")]
    MissingExitCode,
}

/// Orchestrates the full deployment pipeline against one target host.
#[derive(Debug)]
pub struct CookPipeline<S, K, R> {
    session: S,
    kitchen: K,
    settings: KitchenSettings,
    options: PipelineOptions,
    runner: R,
}

impl<S, K, R> CookPipeline<S, K, R>
where
    S: ShellSession,
    K: KitchenLocator,
    R: CommandRunner + Clone,
{
    /// Creates a pipeline over the injected collaborators.
    ///
    /// `runner` executes local commands (syntax checks and rsync); remote
    /// execution goes through `session`.
    #[must_use]
    pub const fn new(
        session: S,
        kitchen: K,
        settings: KitchenSettings,
        options: PipelineOptions,
        runner: R,
    ) -> Self {
        Self {
            session,
            kitchen,
            settings,
            options,
            runner,
        }
    }

    /// Runs every stage in order and returns the process exit code.
    ///
    /// Progress lines (the syntax banner and the echoed rsync command) are
    /// written to `out`; the final provisioning output streams directly to
    /// the invoking terminal.
    ///
    /// # Errors
    ///
    /// Returns [`CookError`] naming the first stage that failed.
    pub fn run(&self, out: &mut impl Write) -> Result<i32, CookError> {
        self.kitchen.validate()?;

        if self.options.skip_syntax_check {
            debug!("skipping syntax checks");
        } else {
            SyntaxValidator::new(self.settings.ruby_bin.clone(), self.runner.clone())
                .check(self.kitchen.root(), out)?;
        }

        let solo = SoloConfig::load(self.kitchen.root())?;
        debug!("remote cache path: {}", solo.file_cache_path);

        if self.options.skip_chef_check {
            debug!("skipping chef version check");
        } else {
            check_chef_version(&self.session)?;
        }

        let syncer = KitchenSyncer::new(self.settings.rsync_bin.clone(), self.runner.clone());
        syncer.mirror(&self.session, self.kitchen.root(), &solo.file_cache_path, out)?;
        inject_patches(&self.session, &syncer, solo.first_cookbook_path())?;

        if self.options.sync_only {
            debug!("sync-only run; skipping remote provisioning");
            return Ok(0);
        }

        let command = self.provisioning_command(&solo);
        let rendered = command.render();
        debug!("provisioning command: {rendered}");
        let code = self.session.stream(&rendered).map_err(CookError::Remote)?;
        code.ok_or(CookError::MissingExitCode)
    }

    /// Node configuration file name, defaulting to `nodes/<host>.json`.
    #[must_use]
    pub fn node_config(&self) -> String {
        self.options
            .node_config
            .clone()
            .unwrap_or_else(|| format!("nodes/{}.json", self.session.host()))
    }

    fn provisioning_command(&self, solo: &SoloConfig) -> RemoteCommand {
        let cache = &solo.file_cache_path;
        let node = self.node_config();
        let mut main = format!("rvmsudo chef-solo -c {cache}/solo.rb -j {cache}/{node}");
        if self.options.verbosity > 0 {
            main.push_str(" -l debug");
        }
        RemoteCommand {
            preamble: Some(rvm::preamble(cache)),
            main,
        }
    }
}
