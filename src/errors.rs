// src/errors.rs

//! Crate-wide error types.
//!
//! Every failure of the acquire → validate → normalize pipeline surfaces as a
//! single [`TmplwatchError`]. Callers that keep serving a previously resolved
//! document can use [`TmplwatchError::kind`] to log and decide.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::template::TemplateError;

/// One schema violation: dotted field path plus a human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "value {}", self.message)
        } else {
            write!(f, "\"{}\" {}", self.path, self.message)
        }
    }
}

/// All violations found while validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// True if any violation is reported at exactly `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.0.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.0.len())?;
        for violation in &self.0 {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Error, Debug)]
pub enum TmplwatchError {
    #[error(
        "conflicting configuration sources: templated args {templated_args:?} already pass a file flag \
         while config file {config_file:?} is also set"
    )]
    ConfigConflict {
        templated_args: String,
        config_file: PathBuf,
    },

    #[error("failed to acquire configuration: {0}")]
    ConfigAcquisition(String),

    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config command `{program}` failed: {source}")]
    CommandFailed {
        program: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("configuration is invalid: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid url {url:?}: {source}")]
    UrlParse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TmplwatchError {
    /// Short, stable name of the error kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TmplwatchError::ConfigConflict { .. } => "config_conflict",
            TmplwatchError::ConfigAcquisition(_)
            | TmplwatchError::ConfigRead { .. }
            | TmplwatchError::CommandFailed { .. } => "config_acquisition",
            TmplwatchError::Validation(_) => "validation",
            TmplwatchError::Template(_) => "template",
            TmplwatchError::UrlParse { .. } => "url_parse",
            TmplwatchError::Yaml(_) => "yaml",
            TmplwatchError::Other(_) => "other",
        }
    }
}

impl From<ValidationErrors> for TmplwatchError {
    fn from(errors: ValidationErrors) -> Self {
        TmplwatchError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, TmplwatchError>;
