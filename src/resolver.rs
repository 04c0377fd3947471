// src/resolver.rs

//! Full resolution pipeline: acquire → parse → validate → normalize.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::acquire::{AcquisitionConfig, ConfigAcquirer};
use crate::config::loader::load_from_str;
use crate::config::model::ConfigDocument;
use crate::errors::{Result, TmplwatchError};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;

/// A resolved document plus the files whose change should trigger a new
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub document: ConfigDocument,
    pub config_deps: Vec<PathBuf>,
}

/// Resolves configuration end to end.
///
/// Each call is independent; overlapping calls are the caller's business.
#[derive(Debug, Clone)]
pub struct ConfigResolver<F, R> {
    acquirer: ConfigAcquirer<F, R>,
    acquire_timeout: Option<Duration>,
}

impl<F: FileSystem, R: CommandRunner> ConfigResolver<F, R> {
    pub fn new(fs: F, runner: R) -> Self {
        Self {
            acquirer: ConfigAcquirer::new(fs, runner),
            acquire_timeout: None,
        }
    }

    /// Bound the acquisition step; expiry is an acquisition failure.
    pub fn with_acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub async fn resolve(&self, cfg: &AcquisitionConfig) -> Result<ResolvedConfig> {
        let acquisition = self.acquirer.acquire(cfg);
        let acquired = match self.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, acquisition)
                .await
                .map_err(|_| {
                    TmplwatchError::ConfigAcquisition(format!(
                        "acquisition timed out after {limit:?}"
                    ))
                })??,
            None => acquisition.await?,
        };

        debug!(deps = ?acquired.config_deps, "resolving acquired configuration");
        let document = load_from_str(&acquired.config)?;

        info!(items = document.len(), "configuration resolved");
        Ok(ResolvedConfig {
            document,
            config_deps: acquired.config_deps,
        })
    }
}
