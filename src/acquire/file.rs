// src/acquire/file.rs

//! File mode: read configuration from a `<name>.yaml` / `<name>.yml` pair.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::Acquired;
use crate::errors::{Result, TmplwatchError};
use crate::fs::FileSystem;

/// `<stem>` + `.<ext>`, without touching dots already inside the stem.
fn with_suffix(stem: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Read the configuration for `config_file`.
///
/// The extension of `config_file` is ignored. `<dir>/<name>.yaml` is read
/// first and a missing file there is not an error; then `<dir>/<name>.yml` is
/// read and its content is what gets returned. The `.yaml` content never
/// reaches the caller, and a missing `.yml` is fatal even when the `.yaml`
/// exists. The single dependency is `<dir>/<name>` without an extension.
pub fn read_config_pair<F: FileSystem + ?Sized>(fs: &F, config_file: &Path) -> Result<Acquired> {
    let name = config_file.file_stem().ok_or_else(|| {
        TmplwatchError::ConfigAcquisition(format!(
            "config path {config_file:?} has no file name"
        ))
    })?;
    let stem = match config_file.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    };

    let yaml_path = with_suffix(&stem, "yaml");
    match fs.read_to_string(&yaml_path) {
        Ok(_) => warn!(
            path = ?yaml_path,
            "found .yaml config but only the .yml file is used; its content is ignored"
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?yaml_path, "no .yaml config file")
        }
        Err(source) => {
            return Err(TmplwatchError::ConfigRead {
                path: yaml_path,
                source,
            });
        }
    }

    let yml_path = with_suffix(&stem, "yml");
    let config = fs
        .read_to_string(&yml_path)
        .map_err(|source| TmplwatchError::ConfigRead {
            path: yml_path,
            source,
        })?;

    Ok(Acquired {
        config,
        config_deps: vec![stem],
    })
}
