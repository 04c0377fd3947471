// src/config/normalize.rs

//! Shorthand normalization: validated document → canonical document.
//!
//! This is the only place that branches on the shape an entity was written
//! in. Everything downstream sees the canonical structs from
//! [`crate::config::model`].

use url::Url;

use crate::config::model::{
    ConfigDocument, ConfigItem, DataSource, Entry, FilePathSpec, FileSpec, OnChangeInput,
    OnChangeSpec, RawDataSource, RawFilePathSpec, RawFileSpec, ValidatedDocument, ValidatedItem,
};
use crate::config::template::CompiledTemplate;
use crate::errors::{Result, TmplwatchError};

impl TryFrom<ValidatedDocument> for ConfigDocument {
    type Error = TmplwatchError;

    fn try_from(doc: ValidatedDocument) -> std::result::Result<Self, Self::Error> {
        normalize(doc)
    }
}

/// Normalize every item of a validated document.
pub fn normalize(doc: ValidatedDocument) -> Result<ConfigDocument> {
    let items = doc
        .items
        .into_iter()
        .map(normalize_item)
        .collect::<Result<Vec<_>>>()?;
    Ok(ConfigDocument::new_unchecked(items))
}

fn normalize_item(item: ValidatedItem) -> Result<ConfigItem> {
    let datasources = item
        .datasources
        .into_iter()
        .map(data_source)
        .collect::<Result<Vec<_>>>()?;
    let files = item
        .files
        .into_iter()
        .map(file_spec)
        .collect::<Result<Vec<_>>>()?;

    Ok(ConfigItem {
        watch: item.watch,
        dependencies: item.dependencies.into_iter().map(file_path_spec).collect(),
        templates: item.templates.into_iter().map(file_path_spec).collect(),
        datasources,
        files,
        on_change: on_change(item.on_change),
        args: item.args,
    })
}

fn on_change(input: Option<OnChangeInput>) -> Option<OnChangeSpec> {
    input.map(OnChangeSpec::from)
}

fn data_source(entry: Entry<RawDataSource>) -> Result<DataSource> {
    let raw = match entry {
        Entry::Shorthand(url) => RawDataSource {
            url,
            ..Default::default()
        },
        Entry::Full(raw) => raw,
    };

    let parsed = Url::parse(&raw.url).map_err(|source| TmplwatchError::UrlParse {
        url: raw.url.clone(),
        source,
    })?;
    let path = (parsed.scheme() == "file").then(|| parsed.path().to_string());

    // Aliases only apply to file sources; remote sources are fetched by url.
    let make_alias = match (&path, &raw.alias) {
        (Some(_), Some(alias)) => Some(CompiledTemplate::compile(alias.as_str())?),
        _ => None,
    };

    Ok(DataSource {
        url: raw.url,
        alias: raw.alias,
        on_change: on_change(raw.on_change),
        args: raw.args,
        path,
        make_alias,
    })
}

fn file_spec(entry: Entry<RawFileSpec>) -> Result<FileSpec> {
    let raw = match entry {
        Entry::Shorthand(input_path) => RawFileSpec {
            input_path,
            ..Default::default()
        },
        Entry::Full(raw) => raw,
    };

    let make_output_path = raw
        .output_path
        .as_deref()
        .map(CompiledTemplate::compile)
        .transpose()?;

    Ok(FileSpec {
        input_path: raw.input_path,
        output_path: raw.output_path,
        left_delimiter: raw.left_delimiter,
        right_delimiter: raw.right_delimiter,
        on_change: on_change(raw.on_change),
        args: raw.args,
        make_output_path,
    })
}

fn file_path_spec(entry: Entry<RawFilePathSpec>) -> FilePathSpec {
    let raw = match entry {
        Entry::Shorthand(path) => RawFilePathSpec {
            path,
            ..Default::default()
        },
        Entry::Full(raw) => raw,
    };

    FilePathSpec {
        path: raw.path,
        on_change: on_change(raw.on_change),
        args: raw.args,
    }
}
