//! Binary entry point for the skillet CLI.

use std::env;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use skillet::cli::{Cli, CookCommand};
use skillet::{
    CookError, CookPipeline, DirKitchen, KitchenSettings, PipelineOptions, ProcessCommandRunner,
    SshSession, Target, TargetError,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Cook(#[from] CookError),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Cook(command) => cook_command(command),
    }
}

fn cook_command(args: CookCommand) -> Result<i32, CliError> {
    if let Some(result) = fake_cook_from_env() {
        return result;
    }

    let settings =
        KitchenSettings::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    settings
        .validate()
        .map_err(|err| CliError::Config(err.to_string()))?;

    let target = Target::parse(&args.target)?;
    let session = SshSession::connect(&settings, target);
    let kitchen = DirKitchen::current_dir().map_err(CookError::from)?;

    let pipeline = CookPipeline::new(
        session,
        kitchen,
        settings,
        options_from(&args),
        ProcessCommandRunner,
    );
    let mut stdout = io::stdout();
    Ok(pipeline.run(&mut stdout)?)
}

fn options_from(args: &CookCommand) -> PipelineOptions {
    PipelineOptions {
        skip_chef_check: args.skip_chef_check,
        sync_only: args.sync_only,
        skip_syntax_check: args.skip_syntax_check,
        verbosity: args.verbose,
        node_config: args.node_config.clone(),
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

/// Behavioural-test escape hatch: short-circuits the pipeline with a fixed
/// outcome so CLI tests can observe exit-code and stream handling without a
/// reachable host.
fn fake_cook_from_env() -> Option<Result<i32, CliError>> {
    let mode = env::var("SKILLET_FAKE_COOK_MODE").ok()?;
    match mode.as_str() {
        "exit-0" => {
            writeln!(io::stdout(), "fake-stdout").ok();
            writeln!(io::stderr(), "fake-stderr").ok();
            Some(Ok(0))
        }
        "exit-7" => {
            writeln!(io::stdout(), "fake-stdout").ok();
            writeln!(io::stderr(), "fake-stderr").ok();
            Some(Ok(7))
        }
        "missing-exit" => Some(Err(CliError::Cook(CookError::MissingExitCode))),
        _ => None,
    }
}
