// src/acquire/command.rs

//! Command mode: generate configuration by running an external command.

use std::path::Path;

use tracing::debug;

use super::Acquired;
use super::argv::{ArgValue, ArgvBuilder, BuiltArgv, FILE_FLAG, parse_args, split_args};
use crate::errors::{Result, TmplwatchError};
use crate::exec::CommandRunner;

/// Work out the command line to run, without running anything.
///
/// - Fails with a conflict if `config_file` is set and the templated args
///   already pass a file flag.
/// - Otherwise injects `config_file` as the file flag.
pub fn plan(templated_args: &str, config_file: Option<&Path>) -> Result<BuiltArgv> {
    let mut parsed = parse_args(split_args(templated_args)?);

    if let Some(file) = config_file {
        if parsed.has_flag(FILE_FLAG) {
            return Err(TmplwatchError::ConfigConflict {
                templated_args: templated_args.to_string(),
                config_file: file.to_path_buf(),
            });
        }
        debug!(?file, "injecting config file into templated args");
        parsed.add(FILE_FLAG, ArgValue::Str(file.to_string_lossy().into_owned()));
    }

    ArgvBuilder::build(&parsed)
}

/// Run a planned command and capture its stdout as the configuration.
pub async fn run<R: CommandRunner + ?Sized>(runner: &R, built: BuiltArgv) -> Result<Acquired> {
    let output = runner
        .run_capture(&built.program, &built.argv)
        .await
        .map_err(|err| TmplwatchError::CommandFailed {
            program: built.program.clone(),
            source: err.into(),
        })?;

    Ok(Acquired {
        config: output.stdout,
        config_deps: built.deps,
    })
}
