// src/config/loader.rs

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::config::model::{ConfigDocument, ValidatedDocument};
use crate::config::normalize::normalize;
use crate::config::validate::validate;
use crate::errors::Result;

/// Parse raw YAML text and run schema validation.
///
/// This does **not** normalize shorthand; use [`load_from_str`] for the full
/// pipeline.
pub fn parse_and_validate(text: &str) -> Result<ValidatedDocument> {
    let raw: Value = serde_yaml::from_str(text)?;
    let validated = validate(&raw)?;
    Ok(validated)
}

/// Turn raw configuration text into the resolved document:
///
/// - Parses YAML.
/// - Validates the schema, collecting every violation.
/// - Applies defaults and normalizes shorthand entities.
/// - Compiles alias and output path templates.
pub fn load_from_str(text: &str) -> Result<ConfigDocument> {
    let validated = parse_and_validate(text)?;
    let document = normalize(validated)?;
    debug!(items = document.len(), "configuration document resolved");
    Ok(document)
}

/// Convenience for tests and tooling: load a document straight from a file,
/// bypassing acquisition.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigDocument> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(|source| {
        crate::errors::TmplwatchError::ConfigRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    })?;
    load_from_str(&text)
}
