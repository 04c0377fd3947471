// src/report.rs

//! Human-readable and YAML renderings of a resolved configuration.

use std::fmt::Write;

use crate::config::model::{ConfigDocument, OnChangeSpec};
use crate::errors::Result;
use crate::resolver::ResolvedConfig;

fn on_change_text(spec: &OnChangeSpec) -> String {
    format!(
        "{:?} (stdout={}, stderr={})",
        spec.command, spec.stdout, spec.stderr
    )
}

/// Summary printed by `--dry-run`.
pub fn summarize(resolved: &ResolvedConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, resolved);
    out
}

fn write_summary(out: &mut String, resolved: &ResolvedConfig) -> std::fmt::Result {
    writeln!(out, "tmplwatch dry-run")?;
    writeln!(out, "  config deps: {:?}", resolved.config_deps)?;
    writeln!(out)?;

    let document = &resolved.document;
    writeln!(out, "items ({}):", document.len())?;
    for (i, item) in document.iter().enumerate() {
        writeln!(out, "  - item {i}")?;
        writeln!(out, "      watch: {}", item.watch)?;
        if !item.dependencies.is_empty() {
            let paths: Vec<_> = item.dependency_paths().collect();
            writeln!(out, "      dependencies: {paths:?}")?;
        }
        if !item.templates.is_empty() {
            let paths: Vec<_> = item.template_paths().collect();
            writeln!(out, "      templates: {paths:?}")?;
        }
        for ds in item.file_data_sources() {
            let path = ds.path.as_deref().unwrap_or_default();
            match &ds.make_alias {
                Some(alias) => writeln!(out, "      file datasource: {path} (alias: {alias})")?,
                None => writeln!(out, "      file datasource: {path}")?,
            }
        }
        for ds in item.other_data_sources() {
            writeln!(out, "      remote datasource: {}", ds.url)?;
        }
        for file in &item.files {
            match &file.make_output_path {
                Some(output) => writeln!(out, "      file: {} -> {output}", file.input_path)?,
                None => writeln!(out, "      file: {}", file.input_path)?,
            }
        }
        if let Some(ref on_change) = item.on_change {
            writeln!(out, "      on_change: {}", on_change_text(on_change))?;
        }
        if let Some(ref args) = item.args {
            writeln!(out, "      args: {args:?}")?;
        }
    }
    Ok(())
}

/// Canonical YAML form of the document (derived fields omitted).
pub fn to_yaml(document: &ConfigDocument) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}
