// src/config/validate.rs

//! Schema validation of a parsed YAML document.
//!
//! Validation walks the whole document and collects every violation instead
//! of stopping at the first one. On success it returns a
//! [`ValidatedDocument`] with defaults applied and unknown keys dropped.

use serde_yaml::{Mapping, Value};

use crate::config::model::{
    Entry, OnChangeInput, OnChangeSpec, RawDataSource, RawFilePathSpec, RawFileSpec,
    ValidatedDocument, ValidatedItem,
};
use crate::errors::{ValidationErrors, Violation};

/// Validate a parsed document.
///
/// A single item (mapping) at the top level is accepted and wrapped into a
/// one-element document.
pub fn validate(raw: &Value) -> Result<ValidatedDocument, ValidationErrors> {
    let mut validator = Validator::default();
    let items = validator.document(raw);

    match items {
        Some(items) if validator.errors.is_empty() => Ok(ValidatedDocument { items }),
        _ => Err(validator.errors),
    }
}

/// Value a uniqueness check compares for one array element.
///
/// A bare string stands for `{ <field>: string }`, so both shapes compare on
/// the same identifying value.
fn identity_of<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    match value {
        Value::String(_) => Some(value),
        Value::Mapping(map) => map.get(field),
        _ => None,
    }
}

/// Comparator over array elements keyed by `field`, shorthand aware.
pub fn same_by(field: &str) -> impl Fn(&Value, &Value) -> bool + '_ {
    move |a, b| match (identity_of(a, field), identity_of(b, field)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn child(parent: &str, key: impl std::fmt::Display) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

type FullParser<T> = fn(&mut Validator, &str, &Mapping) -> Option<T>;

#[derive(Default)]
struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    fn fail<T>(&mut self, path: &str, message: impl Into<String>) -> Option<T> {
        self.errors.push(Violation::new(path, message));
        None
    }

    fn document(&mut self, raw: &Value) -> Option<Vec<ValidatedItem>> {
        match raw {
            Value::Sequence(seq) if seq.is_empty() => {
                self.fail("", "must contain at least 1 item")
            }
            Value::Sequence(seq) => {
                let items: Vec<Option<ValidatedItem>> = seq
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.item(&i.to_string(), v))
                    .collect();
                items.into_iter().collect()
            }
            Value::Mapping(_) => self.item("", raw).map(|item| vec![item]),
            _ => self.fail(
                "",
                "must be a config item or an array of config items",
            ),
        }
    }

    fn item(&mut self, path: &str, value: &Value) -> Option<ValidatedItem> {
        let Value::Mapping(map) = value else {
            return self.fail(path, "must be an object");
        };

        let watch = self.optional_bool(path, map, "watch", false);
        let dependencies =
            self.entries(path, map, "dependencies", "path", Self::file_path_spec);
        let templates = self.entries(path, map, "templates", "path", Self::file_path_spec);
        let datasources = self.entries(path, map, "datasources", "url", Self::data_source);
        let files = self.entries(path, map, "files", "input_path", Self::file_spec);
        let on_change = self.optional_on_change(path, map);
        let args = self.optional_string_array(path, map, "args");

        Some(ValidatedItem {
            watch: watch?,
            dependencies: dependencies?,
            templates: templates?,
            datasources: datasources?,
            files: files?,
            on_change: on_change?,
            args: args?,
        })
    }

    /// Validate an array of shorthand-or-object entities, unique by `id_field`.
    fn entries<T>(
        &mut self,
        parent: &str,
        map: &Mapping,
        field: &str,
        id_field: &str,
        full: FullParser<T>,
    ) -> Option<Vec<Entry<T>>> {
        let path = child(parent, field);
        let Some(value) = map.get(field) else {
            return Some(Vec::new());
        };
        let Value::Sequence(seq) = value else {
            return self.fail(&path, "must be an array");
        };

        let mut entries = Vec::with_capacity(seq.len());
        let mut ok = true;
        for (i, element) in seq.iter().enumerate() {
            let element_path = child(&path, i);
            let entry = match element {
                Value::String(s) if s.is_empty() => {
                    self.fail(&element_path, "is not allowed to be empty")
                }
                Value::String(s) => Some(Entry::Shorthand(s.clone())),
                Value::Mapping(m) => full(self, &element_path, m).map(Entry::Full),
                _ => self.fail(&element_path, "must be a string or an object"),
            };
            match entry {
                Some(entry) => entries.push(entry),
                None => ok = false,
            }
        }

        let same = same_by(id_field);
        for (j, later) in seq.iter().enumerate() {
            if seq[..j].iter().any(|earlier| same(earlier, later)) {
                ok = false;
                self.errors.push(Violation::new(
                    child(&path, j),
                    format!("contains a duplicate value for \"{id_field}\""),
                ));
            }
        }

        ok.then_some(entries)
    }

    fn file_path_spec(&mut self, path: &str, map: &Mapping) -> Option<RawFilePathSpec> {
        let file_path = self.required_string(path, map, "path");
        let on_change = self.optional_on_change(path, map);
        let args = self.optional_string_array(path, map, "args");

        Some(RawFilePathSpec {
            path: file_path?,
            on_change: on_change?,
            args: args?,
        })
    }

    fn data_source(&mut self, path: &str, map: &Mapping) -> Option<RawDataSource> {
        let url = self.required_string(path, map, "url").and_then(|url| {
            match url::Url::parse(&url) {
                Ok(_) => Some(url),
                Err(_) => self.fail(&child(path, "url"), "must be a valid uri"),
            }
        });
        let alias = self.optional_string(path, map, "alias");
        let on_change = self.optional_on_change(path, map);
        let args = self.optional_string_array(path, map, "args");

        Some(RawDataSource {
            url: url?,
            alias: alias?,
            on_change: on_change?,
            args: args?,
        })
    }

    fn file_spec(&mut self, path: &str, map: &Mapping) -> Option<RawFileSpec> {
        let input_path = self.required_string(path, map, "input_path");
        let output_path = self.optional_string(path, map, "output_path");
        let left_delimiter = self.optional_string(path, map, "left_delimiter");
        let right_delimiter = self.optional_string(path, map, "right_delimiter");
        let on_change = self.optional_on_change(path, map);
        let args = self.optional_string_array(path, map, "args");

        Some(RawFileSpec {
            input_path: input_path?,
            output_path: output_path?,
            left_delimiter: left_delimiter?,
            right_delimiter: right_delimiter?,
            on_change: on_change?,
            args: args?,
        })
    }

    fn optional_on_change(&mut self, parent: &str, map: &Mapping) -> Option<Option<OnChangeInput>> {
        let path = child(parent, "on_change");
        match map.get("on_change") {
            None => Some(None),
            Some(v @ Value::Sequence(_)) => self
                .string_array(&path, v, 1)
                .map(|command| Some(OnChangeInput::Shorthand(command))),
            Some(Value::Mapping(m)) => {
                let command = match m.get("command") {
                    None => self.fail(&child(&path, "command"), "is required"),
                    Some(v) => self.string_array(&child(&path, "command"), v, 1),
                };
                let stdout = self.optional_bool(&path, m, "stdout", false);
                let stderr = self.optional_bool(&path, m, "stderr", true);
                Some(Some(OnChangeInput::Full(OnChangeSpec {
                    command: command?,
                    stdout: stdout?,
                    stderr: stderr?,
                })))
            }
            Some(_) => self.fail(&path, "must be an array or an object"),
        }
    }

    fn string_array(&mut self, path: &str, value: &Value, min: usize) -> Option<Vec<String>> {
        let Value::Sequence(seq) = value else {
            return self.fail(path, "must be an array");
        };
        if seq.len() < min {
            return self.fail(path, format!("must contain at least {min} item(s)"));
        }

        let strings: Vec<Option<String>> = seq
            .iter()
            .enumerate()
            .map(|(i, v)| self.string(&child(path, i), v))
            .collect();
        strings.into_iter().collect()
    }

    fn string(&mut self, path: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) if s.is_empty() => self.fail(path, "is not allowed to be empty"),
            Value::String(s) => Some(s.clone()),
            _ => self.fail(path, "must be a string"),
        }
    }

    fn required_string(&mut self, parent: &str, map: &Mapping, key: &str) -> Option<String> {
        let path = child(parent, key);
        match map.get(key) {
            None => self.fail(&path, "is required"),
            Some(v) => self.string(&path, v),
        }
    }

    fn optional_string(
        &mut self,
        parent: &str,
        map: &Mapping,
        key: &str,
    ) -> Option<Option<String>> {
        match map.get(key) {
            None => Some(None),
            Some(v) => self.string(&child(parent, key), v).map(Some),
        }
    }

    fn optional_string_array(
        &mut self,
        parent: &str,
        map: &Mapping,
        key: &str,
    ) -> Option<Option<Vec<String>>> {
        match map.get(key) {
            None => Some(None),
            Some(v) => self.string_array(&child(parent, key), v, 0).map(Some),
        }
    }

    fn optional_bool(&mut self, parent: &str, map: &Mapping, key: &str, default: bool) -> Option<bool> {
        match map.get(key) {
            None => Some(default),
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => self.fail(&child(parent, key), "must be a boolean"),
        }
    }
}
