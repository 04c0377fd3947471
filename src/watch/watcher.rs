// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::reload::ReloadEvent;
use crate::watch::matching::{absolutize, dependency_matches, watch_dirs};

/// Handle for the dependency watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops watching and ends the forwarding task.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    deps: Arc<Vec<PathBuf>>,
}

impl WatcherHandle {
    /// Absolute dependency paths being watched.
    pub fn deps(&self) -> &[PathBuf] {
        &self.deps
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher for the given config dependencies.
///
/// The parent directory of each dependency is watched non-recursively.
/// Changes touching a dependency are sent as
/// [`ReloadEvent::DependencyChanged`] on `reload_tx`.
pub fn spawn_dependency_watcher(
    deps: &[PathBuf],
    reload_tx: mpsc::Sender<ReloadEvent>,
) -> Result<WatcherHandle> {
    let cwd = std::env::current_dir()?;
    let deps: Vec<PathBuf> = deps.iter().map(|d| absolutize(d, &cwd)).collect();
    let deps = Arc::new(deps);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("tmplwatch: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("tmplwatch: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for dir in watch_dirs(&deps) {
        match watcher.watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => debug!(?dir, "watching directory for config dependencies"),
            Err(err) => warn!(?dir, error = %err, "cannot watch dependency directory"),
        }
    }

    info!(deps = ?deps, "dependency watcher started");

    let forward_deps = Arc::clone(&deps);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in event.paths {
                if forward_deps.iter().any(|dep| dependency_matches(&path, dep)) {
                    if reload_tx
                        .send(ReloadEvent::DependencyChanged(path))
                        .await
                        .is_err()
                    {
                        debug!("reload channel closed; stopping dependency watcher");
                        return;
                    }
                }
            }
        }
        debug!("dependency watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        deps,
    })
}
