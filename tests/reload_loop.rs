mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::tempdir;
use tokio::sync::mpsc;
use tmplwatch::acquire::AcquisitionConfig;
use tmplwatch::config::load_from_str;
use tmplwatch::fs::mock::MockFileSystem;
use tmplwatch::reload::{ReloadEvent, ReloadLoop, WatcherFactory};
use tmplwatch::resolver::{ConfigResolver, ResolvedConfig};
use tmplwatch::watch::spawn_dependency_watcher;

use common::{FakeCommandRunner, init_tracing, with_timeout};

fn changed() -> ReloadEvent {
    ReloadEvent::DependencyChanged(PathBuf::from("conf/app"))
}

#[tokio::test]
async fn failed_reload_keeps_last_known_good() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("conf/app.yml", "templates: [one.tpl]");
    let resolver = ConfigResolver::new(fs.clone(), FakeCommandRunner::new());
    let acquisition = AcquisitionConfig::default().with_config_file("conf/app.yml");

    let initial = resolver.resolve(&acquisition).await.unwrap();
    let (_tx, rx) = mpsc::channel(8);
    let mut reload_loop = ReloadLoop::new(resolver, acquisition, initial.clone(), rx);

    // Broken edit: the reload fails and the old document stays.
    fs.add_file("conf/app.yml", "templates: [one.tpl, one.tpl]");
    assert!(reload_loop.handle_event(changed()).await);
    assert_eq!(reload_loop.current(), &initial);
    assert_eq!(reload_loop.stats(), (0, 1));

    // Fixed edit: the new document replaces it.
    fs.add_file("conf/app.yml", "templates: [two.tpl]");
    assert!(reload_loop.handle_event(changed()).await);
    let paths: Vec<_> = reload_loop.current().document.items()[0]
        .template_paths()
        .map(str::to_string)
        .collect();
    assert_eq!(paths, vec!["two.tpl"]);
    assert_eq!(reload_loop.stats(), (1, 1));
}

#[tokio::test]
async fn queued_changes_are_coalesced_into_one_reload() {
    init_tracing();
    let runner = FakeCommandRunner::with_stdout("watch: true");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner.clone());
    let acquisition = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");

    let initial = resolver.resolve(&acquisition).await.unwrap();
    let (tx, rx) = mpsc::channel(8);
    let mut reload_loop = ReloadLoop::new(resolver, acquisition, initial, rx);

    tx.send(changed()).await.unwrap();
    tx.send(changed()).await.unwrap();
    assert!(reload_loop.handle_event(changed()).await);

    // One initial resolution plus a single reload.
    assert_eq!(runner.calls().len(), 2);
    assert_eq!(reload_loop.stats(), (1, 0));
}

#[tokio::test]
async fn shutdown_ends_the_loop_with_the_current_config() {
    init_tracing();
    let runner = FakeCommandRunner::new();
    runner.push_stdout("templates: [first.tpl]");
    runner.push_stdout("templates: [second.tpl]");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner.clone());
    let acquisition = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");

    let initial = resolver.resolve(&acquisition).await.unwrap();
    let (tx, rx) = mpsc::channel(8);
    let reload_loop = ReloadLoop::new(resolver, acquisition, initial, rx);

    let handle = tokio::spawn(reload_loop.run());
    tx.send(changed()).await.unwrap();
    // Let the loop pick up the change on its own before shutting down.
    with_timeout(async {
        while runner.calls().len() < 2 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await;
    tx.send(ReloadEvent::Shutdown).await.unwrap();

    let last = with_timeout(handle).await.unwrap().unwrap();
    let paths: Vec<_> = last.document.items()[0].template_paths().collect();
    assert_eq!(paths, vec!["second.tpl"]);
}

#[tokio::test]
async fn shutdown_wins_over_queued_changes() {
    init_tracing();
    let runner = FakeCommandRunner::with_stdout("watch: true");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner.clone());
    let acquisition = AcquisitionConfig::default().with_templated_args("gen -t a.tpl");

    let initial = resolver.resolve(&acquisition).await.unwrap();
    let (tx, rx) = mpsc::channel(8);
    let mut reload_loop = ReloadLoop::new(resolver, acquisition, initial, rx);

    tx.send(ReloadEvent::Shutdown).await.unwrap();
    assert!(!reload_loop.handle_event(changed()).await);
    assert_eq!(runner.calls().len(), 1);
}

/// Starting point whose dependency differs from what the next reload finds.
fn stale_config(dep: PathBuf) -> ResolvedConfig {
    ResolvedConfig {
        document: load_from_str("templates: [old.tpl]").unwrap(),
        config_deps: vec![dep],
    }
}

#[tokio::test]
async fn changed_dependencies_get_a_new_watcher() {
    init_tracing();
    let dir = tempdir().unwrap();
    let old_dep = dir.path().join("old.tpl");
    let new_dep = dir.path().join("new.tpl");

    let runner = FakeCommandRunner::with_stdout("templates: [new.tpl]");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner);
    let acquisition = AcquisitionConfig::default()
        .with_templated_args(format!("gen -t {}", new_dep.display()));

    let (tx, rx) = mpsc::channel(8);
    let mut reload_loop = ReloadLoop::new(resolver, acquisition, stale_config(old_dep.clone()), rx)
        .with_dependency_watching(tx)
        .unwrap();
    assert_eq!(reload_loop.watched_deps(), Some(&[old_dep][..]));

    reload_loop.reload().await.unwrap();
    assert_eq!(reload_loop.watched_deps(), Some(&[new_dep][..]));
}

#[tokio::test]
async fn watcher_failure_keeps_reload_and_previous_watcher() {
    init_tracing();
    let dir = tempdir().unwrap();
    let old_dep = dir.path().join("old.tpl");

    let runner = FakeCommandRunner::with_stdout("templates: [new.tpl]");
    let resolver = ConfigResolver::new(MockFileSystem::new(), runner);
    let acquisition = AcquisitionConfig::default().with_templated_args("gen -t conf/new.tpl");

    // First watcher starts normally; every replacement fails.
    let spawned = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&spawned);
    let factory: WatcherFactory = Arc::new(
        move |deps: &[PathBuf], tx: mpsc::Sender<ReloadEvent>| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                spawn_dependency_watcher(deps, tx)
            } else {
                Err(anyhow::anyhow!("inotify watch limit reached"))
            }
        },
    );

    let (tx, rx) = mpsc::channel(8);
    let mut reload_loop = ReloadLoop::new(resolver, acquisition, stale_config(old_dep.clone()), rx)
        .with_watcher_factory(factory)
        .with_dependency_watching(tx)
        .unwrap();

    reload_loop.reload().await.unwrap();

    assert_eq!(spawned.load(Ordering::SeqCst), 2);
    assert_eq!(reload_loop.stats(), (1, 0));
    assert_eq!(
        reload_loop.current().config_deps,
        vec![PathBuf::from("conf/new.tpl")]
    );
    let paths: Vec<_> = reload_loop.current().document.items()[0]
        .template_paths()
        .collect();
    assert_eq!(paths, vec!["new.tpl"]);
    assert_eq!(reload_loop.watched_deps(), Some(&[old_dep][..]));
}
