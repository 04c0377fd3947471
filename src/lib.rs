// src/lib.rs

pub mod acquire;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod reload;
pub mod report;
pub mod resolver;
pub mod watch;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, OutputFormat};
use crate::exec::RealCommandRunner;
use crate::fs::RealFileSystem;
use crate::reload::{ReloadEvent, ReloadLoop};
use crate::resolver::ConfigResolver;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - acquisition settings from CLI + environment
/// - the initial resolution (fatal on failure)
/// - dry-run / once reporting
/// - the dependency watcher and reload loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let acquisition = args.acquisition_config();
    info!(mode = ?acquisition.mode(), "resolving configuration");

    let resolver = ConfigResolver::new(RealFileSystem, RealCommandRunner::new())
        .with_acquire_timeout(args.acquire_timeout());
    let initial = resolver.resolve(&acquisition).await?;

    if args.dry_run {
        match args.format {
            OutputFormat::Summary => print!("{}", report::summarize(&initial)),
            OutputFormat::Yaml => print!("{}", report::to_yaml(&initial.document)?),
        }
        debug!("dry-run complete (not watching)");
        return Ok(());
    }

    if args.once {
        info!(
            items = initial.document.len(),
            deps = ?initial.config_deps,
            "resolved once; exiting"
        );
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<ReloadEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(ReloadEvent::Shutdown).await;
        });
    }

    let reload_loop =
        ReloadLoop::new(resolver, acquisition, initial, rx).with_dependency_watching(tx)?;
    let last = reload_loop.run().await?;
    debug!(items = last.document.len(), "shut down with last resolved configuration");
    Ok(())
}
