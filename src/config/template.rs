// src/config/template.rs

//! Bracket placeholder templates used for data source aliases and file
//! output paths.
//!
//! A template such as `"out/[name].txt"` is compiled once into a
//! [`CompiledTemplate`] and can then be rendered any number of times against
//! different contexts:
//!
//! ```
//! use std::collections::HashMap;
//! use tmplwatch::config::template::CompiledTemplate;
//!
//! let tpl = CompiledTemplate::compile("out-[name].txt").unwrap();
//! let ctx = HashMap::from([("name", "a")]);
//! assert_eq!(tpl.render(&ctx), "out-a.txt");
//! ```
//!
//! A key missing from the context renders as an empty string.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+?)\]").expect("placeholder pattern is valid"));

static UNTERMINATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\w*$").expect("unterminated pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template {template:?} has an unterminated placeholder at byte {offset}")]
    Unterminated { template: String, offset: usize },

    #[error("template {template:?} has an empty placeholder `[]` at byte {offset}")]
    EmptyPlaceholder { template: String, offset: usize },

    #[error("data source {url:?} has no alias template")]
    MissingAlias { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled placeholder template.
///
/// Equality compares the template source, so two independently compiled
/// templates of the same text are equal.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn compile(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();

        if let Some(offset) = source.find("[]") {
            return Err(TemplateError::EmptyPlaceholder {
                template: source,
                offset,
            });
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&source) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(caps[1].to_string()));
            last = whole.end();
        }

        let tail = &source[last..];
        if let Some(m) = UNTERMINATED.find(tail) {
            let offset = last + m.start();
            return Err(TemplateError::Unterminated {
                template: source,
                offset,
            });
        }
        if !tail.is_empty() {
            segments.push(Segment::Literal(tail.to_string()));
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render<C: TemplateContext + ?Sized>(&self, ctx: &C) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = ctx.lookup(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

impl PartialEq for CompiledTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledTemplate {}

impl fmt::Display for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Named values a template renders against.
pub trait TemplateContext {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl<K, V> TemplateContext for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
{
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

impl<K, V> TemplateContext for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

/// Free-function form of [`CompiledTemplate::compile`].
pub fn compile(template: &str) -> Result<CompiledTemplate, TemplateError> {
    CompiledTemplate::compile(template)
}
