//! Command-line interface definitions for the `skillet` binary.
//!
//! This module centralises the clap parser structures so both the main
//! binary and the build script can reuse them when generating the manual
//! page.

use clap::Parser;

/// Top-level CLI for the `skillet` binary.
#[derive(Debug, Parser)]
#[command(
    name = "skillet",
    about = "Deploy the current kitchen over ssh and run chef-solo on the target host",
    arg_required_else_help = true
)]
pub enum Cli {
    /// Upload the kitchen and trigger a chef-solo run.
    #[command(
        name = "cook",
        about = "Upload the kitchen and trigger a chef-solo run on [user@]host"
    )]
    Cook(CookCommand),
}

/// Arguments for the `skillet cook` subcommand.
#[derive(Debug, Parser)]
pub struct CookCommand {
    /// Target host, optionally prefixed with a login user.
    #[arg(value_name = "[USER@]HOST")]
    pub target: String,
    /// Node configuration file name; defaults to `nodes/<host>.json`.
    #[arg(value_name = "NODE_CONFIG")]
    pub node_config: Option<String>,
    /// Skip the version check on the remote chef gem.
    #[arg(long)]
    pub skip_chef_check: bool,
    /// Only sync the kitchen - do not run chef-solo.
    #[arg(long)]
    pub sync_only: bool,
    /// Skip the local Ruby and JSON syntax checks.
    #[arg(long)]
    pub skip_syntax_check: bool,
    /// Increase verbosity; chef-solo runs with debug logging when set.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
