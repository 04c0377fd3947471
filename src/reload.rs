// src/reload.rs

//! Re-resolving configuration when its dependencies change.
//!
//! The loop consumes [`ReloadEvent`]s one at a time, so reloads never
//! overlap. A failed reload is logged and the last good configuration stays
//! in place.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::acquire::AcquisitionConfig;
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::resolver::{ConfigResolver, ResolvedConfig};
use crate::watch::{WatcherHandle, spawn_dependency_watcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    DependencyChanged(PathBuf),
    Shutdown,
}

/// Builds a dependency watcher for a set of config dependencies.
pub type WatcherFactory = Arc<
    dyn Fn(&[PathBuf], mpsc::Sender<ReloadEvent>) -> anyhow::Result<WatcherHandle>
        + Send
        + Sync,
>;

pub struct ReloadLoop<F, R> {
    resolver: ConfigResolver<F, R>,
    acquisition: AcquisitionConfig,
    current: ResolvedConfig,
    events: mpsc::Receiver<ReloadEvent>,
    /// Sender handed to the dependency watcher; `None` disables watching.
    watch_tx: Option<mpsc::Sender<ReloadEvent>>,
    watcher: Option<WatcherHandle>,
    spawn_watcher: WatcherFactory,
    reloads: u64,
    failures: u64,
}

impl<F, R> fmt::Debug for ReloadLoop<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadLoop")
            .field("acquisition", &self.acquisition)
            .field("reloads", &self.reloads)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl<F: FileSystem, R: CommandRunner> ReloadLoop<F, R> {
    pub fn new(
        resolver: ConfigResolver<F, R>,
        acquisition: AcquisitionConfig,
        initial: ResolvedConfig,
        events: mpsc::Receiver<ReloadEvent>,
    ) -> Self {
        Self {
            resolver,
            acquisition,
            current: initial,
            events,
            watch_tx: None,
            watcher: None,
            spawn_watcher: Arc::new(spawn_dependency_watcher),
            reloads: 0,
            failures: 0,
        }
    }

    /// Watch the current config dependencies, feeding changes into `tx`.
    ///
    /// The watcher is re-created whenever a reload changes the dependency set.
    pub fn with_dependency_watching(mut self, tx: mpsc::Sender<ReloadEvent>) -> Result<Self> {
        self.watch_tx = Some(tx);
        self.rewatch()?;
        Ok(self)
    }

    /// Replace how dependency watchers are built.
    pub fn with_watcher_factory(mut self, factory: WatcherFactory) -> Self {
        self.spawn_watcher = factory;
        self
    }

    /// Dependencies the active watcher covers, if watching.
    pub fn watched_deps(&self) -> Option<&[PathBuf]> {
        self.watcher.as_ref().map(WatcherHandle::deps)
    }

    /// Last successfully resolved configuration.
    pub fn current(&self) -> &ResolvedConfig {
        &self.current
    }

    /// `(successful reloads, failed reloads)` so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.reloads, self.failures)
    }

    /// Main loop. Returns the last good configuration on shutdown.
    pub async fn run(mut self) -> Result<ResolvedConfig> {
        info!("reload loop started");

        while let Some(event) = self.events.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }

        info!(reloads = self.reloads, failures = self.failures, "reload loop exiting");
        Ok(self.current)
    }

    /// Handle one event. Returns `false` when the loop should stop.
    pub async fn handle_event(&mut self, event: ReloadEvent) -> bool {
        let path = match event {
            ReloadEvent::Shutdown => return false,
            ReloadEvent::DependencyChanged(path) => path,
        };

        // Editors often emit several events per save; fold queued ones in.
        let mut coalesced = 0usize;
        while let Ok(pending) = self.events.try_recv() {
            match pending {
                ReloadEvent::Shutdown => return false,
                ReloadEvent::DependencyChanged(_) => coalesced += 1,
            }
        }

        info!(?path, coalesced, "config dependency changed; re-resolving");
        if let Err(err) = self.reload().await {
            warn!(
                kind = err.kind(),
                error = %err,
                "reload failed; keeping last known-good configuration"
            );
        }
        true
    }

    /// Re-resolve now. On failure the current configuration is kept.
    pub async fn reload(&mut self) -> Result<()> {
        let resolved = match self.resolver.resolve(&self.acquisition).await {
            Ok(resolved) => resolved,
            Err(err) => {
                self.failures += 1;
                return Err(err);
            }
        };

        let deps_changed = resolved.config_deps != self.current.config_deps;
        self.current = resolved;
        self.reloads += 1;
        info!(
            items = self.current.document.len(),
            deps_changed, "configuration reloaded"
        );

        if deps_changed {
            if let Err(err) = self.rewatch() {
                warn!(
                    error = %err,
                    deps = ?self.current.config_deps,
                    "cannot watch new config dependencies; still watching the previous set"
                );
            }
        }
        Ok(())
    }

    /// Start watching the current dependencies. The previous watcher is only
    /// dropped once its replacement exists.
    fn rewatch(&mut self) -> Result<()> {
        let Some(tx) = self.watch_tx.clone() else {
            return Ok(());
        };
        let handle = (self.spawn_watcher)(&self.current.config_deps, tx)?;
        debug!(?handle, "dependency watcher replaced");
        self.watcher = Some(handle);
        Ok(())
    }
}
