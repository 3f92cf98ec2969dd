//! Behavioural coverage for the deployment pipeline over scripted
//! collaborators and real temporary kitchens.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use skillet::test_support::{ScriptedRunner, ScriptedSession};
use skillet::{CookPipeline, KitchenSettings, PipelineOptions, Target};
use skillet::{DirKitchen, SyntaxValidator};
use std::fs;
use tempfile::TempDir;

struct Kitchen {
    root: Utf8PathBuf,
    _dir: TempDir,
}

impl Kitchen {
    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path()).expect("create parent directories");
        }
        fs::write(path.as_std_path(), contents).expect("write kitchen file");
    }
}

#[fixture]
fn kitchen() -> Kitchen {
    let dir = TempDir::new().expect("temp dir");
    let root =
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path should be UTF-8");
    let kitchen = Kitchen { root, _dir: dir };
    kitchen.write("solo.rb", "file_cache_path \"/tmp/chef-solo\"\n");
    fs::create_dir_all(kitchen.root.join("cookbooks").as_std_path()).expect("create cookbooks");
    kitchen
}

fn settings() -> KitchenSettings {
    KitchenSettings {
        rsync_bin: String::from("rsync"),
        ssh_bin: String::from("ssh"),
        ruby_bin: String::from("ruby"),
        ssh_options: String::new(),
        windows_target: false,
    }
}

fn target() -> Target {
    Target::parse("deploy@10.0.0.5").expect("target should parse")
}

fn pipeline(
    kitchen: &Kitchen,
    remote: &ScriptedSession,
    runner: &ScriptedRunner,
    options: PipelineOptions,
) -> CookPipeline<ScriptedSession, DirKitchen, ScriptedRunner> {
    CookPipeline::new(
        remote.clone(),
        DirKitchen::new(kitchen.root.clone()),
        settings(),
        options,
        runner.clone(),
    )
}

#[rstest]
fn malformed_script_stops_the_pipeline_with_zero_remote_commands(kitchen: Kitchen) {
    kitchen.write("cookbooks/app/recipes/default.rb", "package 'curl' do\n");
    let remote = ScriptedSession::new(target());
    let runner = ScriptedRunner::new();
    runner.push_failure(1);
    let mut out = Vec::new();

    let result = pipeline(&kitchen, &remote, &runner, PipelineOptions::default()).run(&mut out);

    assert!(result.is_err());
    assert_eq!(remote.remote_call_count(), 0);
}

#[rstest]
fn windows_target_sync_uses_cygdrive_paths(kitchen: Kitchen) {
    kitchen.write("solo.rb", "file_cache_path \"C:/chef\"\n");
    let remote = ScriptedSession::new(target()).windows();
    let runner = ScriptedRunner::new();
    runner.push_success(); // ruby -c solo.rb
    remote.push_run_output(Some(0), ""); // gem probe
    runner.push_success(); // mirror
    remote.push_run_output(Some(0), ""); // mkdir
    runner.push_success(); // patch copy 1
    runner.push_success(); // patch copy 2
    remote.push_stream_code(Some(0));
    let mut out = Vec::new();

    pipeline(&kitchen, &remote, &runner, PipelineOptions::default())
        .run(&mut out)
        .expect("pipeline should succeed");

    let sync_command = runner
        .invocations()
        .iter()
        .map(skillet::test_support::CommandInvocation::command_string)
        .find(|command| command.contains("--delete"))
        .expect("a mirror invocation should exist");
    assert!(
        sync_command.contains("/cygdrive/C/chef"),
        "sync command: {sync_command}"
    );
    assert!(
        !sync_command.contains("C:/chef"),
        "sync command: {sync_command}"
    );
}

#[rstest]
fn sync_only_runs_all_transfer_stages_and_exits_zero(kitchen: Kitchen) {
    let remote = ScriptedSession::new(target());
    let runner = ScriptedRunner::new();
    runner.push_success(); // ruby -c solo.rb
    remote.push_run_output(Some(0), ""); // gem probe
    runner.push_success(); // mirror
    remote.push_run_output(Some(0), ""); // mkdir
    runner.push_success(); // patch copy 1
    runner.push_success(); // patch copy 2
    let mut out = Vec::new();

    let options = PipelineOptions {
        sync_only: true,
        ..PipelineOptions::default()
    };
    let code = pipeline(&kitchen, &remote, &runner, options)
        .run(&mut out)
        .expect("sync-only run should succeed");

    assert_eq!(code, 0);
    assert!(remote.streamed_commands().is_empty());
    let commands: Vec<String> = runner
        .invocations()
        .iter()
        .map(skillet::test_support::CommandInvocation::command_string)
        .collect();
    assert!(
        commands.iter().any(|command| command.contains("--delete")),
        "commands: {commands:?}"
    );
    assert_eq!(
        remote.captured_commands().len(),
        2,
        "probe and mkdir should still run"
    );
}

#[rstest]
fn full_run_reports_the_echoed_sync_command_and_syntax_banner(kitchen: Kitchen) {
    let remote = ScriptedSession::new(target());
    let runner = ScriptedRunner::new();
    runner.push_success();
    remote.push_run_output(Some(0), "");
    runner.push_success();
    remote.push_run_output(Some(0), "");
    runner.push_success();
    runner.push_success();
    remote.push_stream_code(Some(0));
    let mut out = Vec::new();

    pipeline(&kitchen, &remote, &runner, PipelineOptions::default())
        .run(&mut out)
        .expect("pipeline should succeed");

    let progress = String::from_utf8(out).expect("utf8");
    assert!(
        progress.starts_with("Checking cookbook syntax...\n"),
        "progress: {progress}"
    );
    assert!(
        progress.contains("rsync -rl --rsh ssh"),
        "progress: {progress}"
    );
    assert!(
        progress.contains("deploy@10.0.0.5:/tmp/chef-solo"),
        "progress: {progress}"
    );
}

#[rstest]
fn final_command_contains_chef_solo_and_the_cache_path(kitchen: Kitchen) {
    let remote = ScriptedSession::new(target());
    let runner = ScriptedRunner::new();
    runner.push_success();
    remote.push_run_output(Some(0), "");
    runner.push_success();
    remote.push_run_output(Some(0), "");
    runner.push_success();
    runner.push_success();
    remote.push_stream_code(Some(0));
    let mut out = Vec::new();

    pipeline(&kitchen, &remote, &runner, PipelineOptions::default())
        .run(&mut out)
        .expect("pipeline should succeed");

    let streamed = remote.streamed_commands();
    let provisioning = streamed.first().expect("a provisioning command");
    assert!(provisioning.contains("chef-solo -c"), "streamed: {provisioning}");
    assert!(provisioning.contains("/tmp/chef-solo"), "streamed: {provisioning}");
    assert!(
        provisioning.contains("-j /tmp/chef-solo/nodes/10.0.0.5.json"),
        "streamed: {provisioning}"
    );
}

#[rstest]
fn syntax_stage_accepts_an_empty_workspace() {
    let dir = TempDir::new().expect("temp dir");
    let root =
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path should be UTF-8");
    let runner = ScriptedRunner::new();
    let mut out = Vec::new();

    SyntaxValidator::new(String::from("ruby"), runner.clone())
        .check(&root, &mut out)
        .expect("empty workspace should pass");

    assert!(runner.invocations().is_empty());
}
