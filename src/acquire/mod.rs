// src/acquire/mod.rs

//! Configuration acquisition.
//!
//! Raw configuration text comes from one of two places:
//!
//! - **Command mode**: when templated args are set, they name an external
//!   command (plus flags) whose stdout is the configuration.
//! - **File mode**: otherwise the configuration is read from a
//!   `<name>.yaml` / `<name>.yml` file pair.
//!
//! Either way the result is the raw text plus the files that, when changed,
//! should trigger a new acquisition.
//!
//! ## Environment Variables
//! - `TMPLWATCH_ARGS` - templated args; enables command mode
//! - `TMPLWATCH_CONFIG` - config file path (file mode, or injected as `-f`)

pub mod argv;
pub mod command;
pub mod file;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::fs::FileSystem;

pub use argv::{ArgValue, ArgvBuilder, BuiltArgv, FlagValue, ParsedArgs, parse_args, split_args};

pub const ARGS_ENV: &str = "TMPLWATCH_ARGS";
pub const CONFIG_ENV: &str = "TMPLWATCH_CONFIG";

/// Config file used in file mode when none is configured.
pub const DEFAULT_CONFIG_PATH: &str = "tmplwatch.yml";

/// Where configuration should come from.
///
/// Built from the environment with [`AcquisitionConfig::from_env`] at the
/// edge of the program and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub templated_args: Option<String>,
    pub config_file: Option<PathBuf>,
}

/// Which acquisition branch a config selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionMode<'a> {
    Command {
        templated_args: &'a str,
        config_file: Option<&'a Path>,
    },
    File {
        config_file: &'a Path,
    },
}

impl AcquisitionConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            templated_args: get(ARGS_ENV),
            config_file: get(CONFIG_ENV).map(PathBuf::from),
        }
    }

    pub fn with_templated_args(mut self, args: impl Into<String>) -> Self {
        self.templated_args = Some(args.into());
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn mode(&self) -> AcquisitionMode<'_> {
        match &self.templated_args {
            Some(templated_args) => AcquisitionMode::Command {
                templated_args,
                config_file: self.config_file.as_deref(),
            },
            None => AcquisitionMode::File {
                config_file: self
                    .config_file
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_CONFIG_PATH)),
            },
        }
    }
}

/// Raw configuration text and the files it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    pub config: String,
    pub config_deps: Vec<PathBuf>,
}

/// Runs one acquisition against injected filesystem and process seams.
#[derive(Debug, Clone)]
pub struct ConfigAcquirer<F, R> {
    fs: F,
    runner: R,
}

impl<F: FileSystem, R: CommandRunner> ConfigAcquirer<F, R> {
    pub fn new(fs: F, runner: R) -> Self {
        Self { fs, runner }
    }

    pub async fn acquire(&self, cfg: &AcquisitionConfig) -> Result<Acquired> {
        let acquired = match cfg.mode() {
            AcquisitionMode::Command {
                templated_args,
                config_file,
            } => {
                debug!(mode = "command", templated_args, "acquiring configuration");
                let built = command::plan(templated_args, config_file)?;
                command::run(&self.runner, built).await?
            }
            AcquisitionMode::File { config_file } => {
                debug!(mode = "file", ?config_file, "acquiring configuration");
                file::read_config_pair(&self.fs, config_file)?
            }
        };

        info!(
            bytes = acquired.config.len(),
            deps = ?acquired.config_deps,
            "configuration acquired"
        );
        Ok(acquired)
    }
}
