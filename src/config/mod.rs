// src/config/mod.rs

//! Configuration validation and normalization.
//!
//! Responsibilities:
//! - Define the document model, both as validated and canonical (`model.rs`).
//! - Compile bracket placeholder templates (`template.rs`).
//! - Validate a parsed YAML document against the schema (`validate.rs`).
//! - Normalize shorthand entities into canonical ones (`normalize.rs`).
//! - Tie the steps together for raw text (`loader.rs`).

pub mod loader;
pub mod model;
pub mod normalize;
pub mod template;
pub mod validate;

pub use loader::{load_from_path, load_from_str, parse_and_validate};
pub use model::{
    ConfigDocument, ConfigItem, DataSource, Entry, FilePathSpec, FileSpec, OnChangeInput,
    OnChangeSpec, ValidatedDocument, ValidatedItem,
};
pub use normalize::normalize;
pub use template::{CompiledTemplate, TemplateContext, TemplateError};
pub use validate::validate;
