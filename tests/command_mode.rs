mod common;

use std::path::PathBuf;
use std::time::Duration;

use tmplwatch::acquire::AcquisitionConfig;
use tmplwatch::errors::TmplwatchError;
use tmplwatch::exec::{CommandOutput, CommandRunner, RunFuture};
use tmplwatch::fs::mock::MockFileSystem;
use tmplwatch::resolver::ConfigResolver;

use common::{FULL_CONFIG, FakeCommandRunner, init_tracing, with_timeout};

#[tokio::test]
async fn stdout_of_templated_command_is_the_config() {
    init_tracing();
    let fs = MockFileSystem::new();
    let runner = FakeCommandRunner::with_stdout(FULL_CONFIG);
    let resolver = ConfigResolver::new(fs.clone(), runner.clone());

    let cfg = AcquisitionConfig::default()
        .with_templated_args("gen -t tpl/site.tpl -d items=file:///data/items.json -v");
    let resolved = with_timeout(resolver.resolve(&cfg)).await.unwrap();

    assert_eq!(resolved.document.len(), 2);
    assert_eq!(
        runner.calls(),
        vec![(
            "gen".to_string(),
            vec![
                "-t".to_string(),
                "tpl/site.tpl".to_string(),
                "-d".to_string(),
                "items=file:///data/items.json".to_string(),
                "-v".to_string(),
                "true".to_string(),
            ]
        )]
    );
    assert_eq!(
        resolved.config_deps,
        vec![PathBuf::from("tpl/site.tpl"), PathBuf::from("/data/items.json")]
    );
    assert!(fs.reads().is_empty(), "command mode must not read files");
}

#[tokio::test]
async fn config_file_is_passed_to_the_command() {
    init_tracing();
    let runner = FakeCommandRunner::with_stdout("watch: true");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner.clone());

    let cfg = AcquisitionConfig::default()
        .with_templated_args("gen -t a.tpl")
        .with_config_file("conf/app.yml");
    let resolved = resolver.resolve(&cfg).await.unwrap();

    let (program, argv) = &runner.calls()[0];
    assert_eq!(program, "gen");
    assert_eq!(argv, &["-t", "a.tpl", "-f", "conf/app.yml"]);
    assert_eq!(
        resolved.config_deps,
        vec![PathBuf::from("a.tpl"), PathBuf::from("conf/app.yml")]
    );
}

#[tokio::test]
async fn conflict_is_reported_before_any_io() {
    init_tracing();
    let fs = MockFileSystem::new();
    let runner = FakeCommandRunner::with_stdout("watch: true");
    let resolver = ConfigResolver::new(fs.clone(), runner.clone());

    let cfg = AcquisitionConfig::default()
        .with_templated_args("gen -f mine.yml")
        .with_config_file("conf/app.yml");
    let err = resolver.resolve(&cfg).await.unwrap_err();

    assert!(matches!(err, TmplwatchError::ConfigConflict { .. }), "{err:?}");
    assert_eq!(err.kind(), "config_conflict");
    assert!(runner.calls().is_empty());
    assert!(fs.reads().is_empty());
}

#[tokio::test]
async fn command_failure_is_an_acquisition_error() {
    init_tracing();
    let runner = FakeCommandRunner::failing("`gen` exited with status 2: boom");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner);

    let cfg = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");
    let err = resolver.resolve(&cfg).await.unwrap_err();

    match &err {
        TmplwatchError::CommandFailed { program, source } => {
            assert_eq!(program, "gen");
            assert!(source.to_string().contains("boom"));
        }
        other => panic!("expected command failure, got {other:?}"),
    }
    assert_eq!(err.kind(), "config_acquisition");
}

#[tokio::test]
async fn unparseable_stdout_is_a_yaml_error() {
    init_tracing();
    let runner = FakeCommandRunner::with_stdout("watch: [unclosed");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner);

    let cfg = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");
    let err = resolver.resolve(&cfg).await.unwrap_err();
    assert_eq!(err.kind(), "yaml");
}

#[tokio::test]
async fn templated_args_without_a_command_fail() {
    init_tracing();
    let runner = FakeCommandRunner::with_stdout("watch: true");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner.clone());

    let cfg = AcquisitionConfig::default().with_templated_args("-t a.tpl");
    let err = resolver.resolve(&cfg).await.unwrap_err();
    assert_eq!(err.kind(), "config_acquisition");
    assert!(runner.calls().is_empty());
}

/// Runner whose command never finishes.
struct HangingRunner;

impl CommandRunner for HangingRunner {
    fn run_capture<'a>(&'a self, _program: &'a str, _args: &'a [String]) -> RunFuture<'a> {
        Box::pin(std::future::pending::<anyhow::Result<CommandOutput>>())
    }
}

#[tokio::test]
async fn slow_acquisition_times_out() {
    init_tracing();
    let resolver = ConfigResolver::new(MockFileSystem::new(), HangingRunner)
        .with_acquire_timeout(Some(Duration::from_millis(50)));

    let cfg = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");
    let err = with_timeout(resolver.resolve(&cfg)).await.unwrap_err();

    assert!(matches!(err, TmplwatchError::ConfigAcquisition(_)), "{err:?}");
    assert!(err.to_string().contains("timed out"));
}
