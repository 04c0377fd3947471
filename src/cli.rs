// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::acquire::AcquisitionConfig;

/// Command-line arguments for `tmplwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tmplwatch",
    version,
    about = "Resolve file-watch/template/fetch configuration and reload it when its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (`.yml`; a sibling `.yaml` is probed too).
    ///
    /// Overrides `TMPLWATCH_CONFIG`. Default: `tmplwatch.yml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Templated args naming a command whose stdout is the configuration.
    ///
    /// Overrides `TMPLWATCH_ARGS`.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Resolve once, report, and exit without watching.
    #[arg(long)]
    pub once: bool,

    /// Resolve, print the resolved configuration, and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for `--dry-run`.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Give up on an acquisition after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub acquire_timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TMPLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Acquisition settings: CLI flags first, then the environment.
    pub fn acquisition_config(&self) -> AcquisitionConfig {
        let env = AcquisitionConfig::from_env();
        AcquisitionConfig {
            templated_args: self.args.clone().or(env.templated_args),
            config_file: self.config.clone().or(env.config_file),
        }
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout.map(Duration::from_secs)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Yaml,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
