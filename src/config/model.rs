// src/config/model.rs

//! Configuration data model.
//!
//! Two layers live here:
//!
//! - The *validated* layer ([`ValidatedDocument`] and friends): what the
//!   schema validator produces. Entities are still tagged with the shape
//!   they were written in ([`Entry::Shorthand`] or [`Entry::Full`]).
//! - The *canonical* layer ([`ConfigDocument`] and friends): what the
//!   normalizer produces and what the watcher consumes. Every entity has
//!   exactly one shape, defaults applied and templates compiled.
//!
//! A document looks like:
//!
//! ```yaml
//! - watch: true
//!   templates: [page.tpl]
//!   datasources:
//!     - https://example.com/feed.json
//!     - url: file:///data/items.json
//!       alias: item-[name]
//!   files:
//!     - input_path: page.tpl
//!       output_path: out/[name].html
//!   on_change: [make, reload]
//! ```

use serde::Serialize;

use super::template::{CompiledTemplate, TemplateContext, TemplateError};

// ---------------------------------------------------------------------------
// Validated layer
// ---------------------------------------------------------------------------

/// An entity as written in the document: a bare string or a full object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    Shorthand(String),
    Full(T),
}

/// `on_change` as written: a bare command array or a full object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnChangeInput {
    Shorthand(Vec<String>),
    Full(OnChangeSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDataSource {
    pub url: String,
    pub alias: Option<String>,
    pub on_change: Option<OnChangeInput>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFileSpec {
    pub input_path: String,
    pub output_path: Option<String>,
    pub left_delimiter: Option<String>,
    pub right_delimiter: Option<String>,
    pub on_change: Option<OnChangeInput>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilePathSpec {
    pub path: String,
    pub on_change: Option<OnChangeInput>,
    pub args: Option<Vec<String>>,
}

/// One config item after validation, with defaults for missing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedItem {
    pub watch: bool,
    pub dependencies: Vec<Entry<RawFilePathSpec>>,
    pub templates: Vec<Entry<RawFilePathSpec>>,
    pub datasources: Vec<Entry<RawDataSource>>,
    pub files: Vec<Entry<RawFileSpec>>,
    pub on_change: Option<OnChangeInput>,
    pub args: Option<Vec<String>>,
}

/// Non-empty list of validated items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument {
    pub(crate) items: Vec<ValidatedItem>,
}

impl ValidatedDocument {
    pub fn items(&self) -> &[ValidatedItem] {
        &self.items
    }
}

// ---------------------------------------------------------------------------
// Canonical layer
// ---------------------------------------------------------------------------

/// Command to run after a watched change, and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnChangeSpec {
    pub command: Vec<String>,
    pub stdout: bool,
    pub stderr: bool,
}

impl OnChangeSpec {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            stdout: false,
            stderr: true,
        }
    }
}

impl From<OnChangeInput> for OnChangeSpec {
    fn from(input: OnChangeInput) -> Self {
        match input {
            OnChangeInput::Shorthand(command) => OnChangeSpec::new(command),
            OnChangeInput::Full(spec) => spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_change: Option<OnChangeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Filesystem path, set only for `file:` urls.
    #[serde(skip)]
    pub path: Option<String>,

    /// Compiled `alias`, set only when `path` is set and an alias was given.
    #[serde(skip)]
    pub make_alias: Option<CompiledTemplate>,
}

impl DataSource {
    pub fn is_file(&self) -> bool {
        self.path.is_some()
    }

    /// Render this source's alias for one matched item.
    pub fn render_alias<C: TemplateContext + ?Sized>(
        &self,
        ctx: &C,
    ) -> Result<String, TemplateError> {
        self.make_alias
            .as_ref()
            .map(|tpl| tpl.render(ctx))
            .ok_or_else(|| TemplateError::MissingAlias {
                url: self.url.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSpec {
    pub input_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_change: Option<OnChangeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    #[serde(skip)]
    pub make_output_path: Option<CompiledTemplate>,
}

impl FileSpec {
    /// Render the output path for one rendered template, if configured.
    pub fn render_output_path<C: TemplateContext + ?Sized>(&self, ctx: &C) -> Option<String> {
        self.make_output_path.as_ref().map(|tpl| tpl.render(ctx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePathSpec {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_change: Option<OnChangeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

/// One fully normalized config item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigItem {
    pub watch: bool,
    pub dependencies: Vec<FilePathSpec>,
    pub templates: Vec<FilePathSpec>,
    pub datasources: Vec<DataSource>,
    pub files: Vec<FileSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_change: Option<OnChangeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

impl ConfigItem {
    /// Data sources backed by a local file, in document order.
    pub fn file_data_sources(&self) -> Vec<&DataSource> {
        self.datasources.iter().filter(|ds| ds.is_file()).collect()
    }

    /// Remote data sources, in document order.
    pub fn other_data_sources(&self) -> Vec<&DataSource> {
        self.datasources.iter().filter(|ds| !ds.is_file()).collect()
    }

    pub fn dependency_paths(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.path.as_str())
    }

    pub fn template_paths(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.path.as_str())
    }
}

/// The resolved configuration handed to the watcher. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    items: Vec<ConfigItem>,
}

impl ConfigDocument {
    pub(crate) fn new_unchecked(items: Vec<ConfigItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ConfigItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ConfigDocument {
    type Item = &'a ConfigItem;
    type IntoIter = std::slice::Iter<'a, ConfigItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ConfigDocument {
    type Item = ConfigItem;
    type IntoIter = std::vec::IntoIter<ConfigItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
