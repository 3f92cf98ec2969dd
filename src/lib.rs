//! Core library for the skillet kitchen deployment tool.
//!
//! The crate mirrors a local provisioning kitchen onto an already-reachable
//! host over ssh + rsync and triggers a local-mode chef-solo run there. The
//! pipeline is a fixed sequence of validation, transfer, and remote
//! execution stages; the first failing stage aborts the run.

pub mod chef;
pub mod cli;
pub mod cook;
pub mod kitchen;
pub mod patches;
pub mod rvm;
pub mod settings;
pub mod shell;
pub mod solo;
pub mod sync;
pub mod syntax;
pub mod target;
pub mod test_support;

pub use chef::{CHEF_GEM_CONSTRAINT, ChefVersionError, check_chef_version};
pub use cook::{CookError, CookPipeline, PipelineOptions, RemoteCommand};
pub use kitchen::{DirKitchen, KitchenError, KitchenLocator};
pub use patches::{PATCH_FILES, PATCH_SUBDIRECTORY, PatchError, inject_patches};
pub use settings::{KitchenSettings, SettingsError};
pub use shell::{
    CommandOutput, CommandRunner, PathTools, ProcessCommandRunner, ShellError, ShellSession,
    SshSession, StreamingCommandRunner,
};
pub use solo::{SoloConfig, SoloConfigError};
pub use sync::{KitchenSyncer, SyncError};
pub use syntax::{SyntaxError, SyntaxValidator};
pub use target::{Target, TargetError};
