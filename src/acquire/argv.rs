// src/acquire/argv.rs

//! Templated-args handling for command mode.
//!
//! The templated-args string is split into shell-like tokens, parsed into a
//! flag map plus positionals, and then rebuilt into the argument vector for
//! the config-generating command. While rebuilding, flags that point at
//! files are collected as config dependencies:
//!
//! - `-t <path>` and `-f <path>` contribute their value.
//! - `-d <alias>=<url>` contributes the url's path when the url scheme starts
//!   with `file`.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::errors::{Result, TmplwatchError};

/// Flag that carries the config file path.
pub const FILE_FLAG: &str = "f";

/// A single flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

/// A flag seen once, or repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Single(ArgValue),
    Multiple(Vec<ArgValue>),
}

impl FlagValue {
    pub fn values(&self) -> &[ArgValue] {
        match self {
            FlagValue::Single(v) => std::slice::from_ref(v),
            FlagValue::Multiple(vs) => vs,
        }
    }

    fn push(&mut self, value: ArgValue) {
        match self {
            FlagValue::Single(first) => {
                *self = FlagValue::Multiple(vec![first.clone(), value]);
            }
            FlagValue::Multiple(vs) => vs.push(value),
        }
    }
}

/// Parsed flags (in first-seen order) and positional tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    flags: Vec<(String, FlagValue)>,
    positionals: Vec<String>,
}

impl ParsedArgs {
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Record a flag occurrence; repeats accumulate into a sequence.
    pub fn add(&mut self, name: impl Into<String>, value: ArgValue) {
        let name = name.into();
        match self.flags.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => existing.push(value),
            None => self.flags.push((name, FlagValue::Single(value))),
        }
    }

    pub fn flags(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }
}

/// Split a templated-args string into tokens.
///
/// Supports single quotes (literal), double quotes (with `\"` and `\\`
/// escapes) and backslash escapes outside quotes.
pub fn split_args(input: &str) -> Result<Vec<String>> {
    #[derive(PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote = Quote::None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => current.push('\\'),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_token = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_token = true;
                }
                '\\' => {
                    // A trailing backslash has nothing to escape; keep it.
                    current.push(chars.next().unwrap_or('\\'));
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(TmplwatchError::ConfigAcquisition(format!(
            "unterminated quote in templated args: {input:?}"
        )));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn looks_like_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn takes_value(next: Option<&String>) -> bool {
    next.is_some_and(|n| !n.starts_with('-') || n == "-" || looks_like_number(n))
}

/// Parse tokens with conventional CLI rules.
///
/// - `--name=value`, `--name value`, `--name` (boolean), `--no-name` (false)
/// - `-k value`, `-k=value`, `-kVALUE` when `VALUE` starts with a non-word
///   character or is a number, grouped booleans `-abc` (the last letter may
///   take the next token as its value)
/// - `--` ends flag parsing; everything else is positional
pub fn parse_args<I, S>(tokens: I) -> ParsedArgs
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
    let mut parsed = ParsedArgs::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let next = tokens.get(i + 1);

        if token == "--" {
            parsed.positionals.extend(tokens[i + 1..].iter().cloned());
            break;
        } else if let Some(body) = token.strip_prefix("--") {
            if let Some((name, value)) = body.split_once('=') {
                parsed.add(name, value.into());
            } else if let Some(name) = body.strip_prefix("no-") {
                parsed.add(name, ArgValue::Bool(false));
            } else if takes_value(next) {
                parsed.add(body, ArgValue::Str(tokens[i + 1].clone()));
                i += 1;
            } else {
                parsed.add(body, ArgValue::Bool(true));
            }
        } else if token.len() > 1 && token.starts_with('-') && !looks_like_number(token) {
            i += parse_short_group(&token[1..], next, &mut parsed);
        } else {
            parsed.positionals.push(token.clone());
        }

        i += 1;
    }

    parsed
}

/// Parse the body of a `-abc` token. Returns how many extra tokens were
/// consumed (0 or 1).
fn parse_short_group(body: &str, next: Option<&String>, parsed: &mut ParsedArgs) -> usize {
    let letters: Vec<(usize, char)> = body.char_indices().collect();

    for (j, &(offset, letter)) in letters.iter().enumerate() {
        let rest = &body[offset + letter.len_utf8()..];
        if rest.is_empty() {
            // Last letter: may take the following token.
            if takes_value(next) {
                if let Some(value) = next {
                    parsed.add(letter.to_string(), ArgValue::Str(value.clone()));
                    return 1;
                }
            }
            parsed.add(letter.to_string(), ArgValue::Bool(true));
            return 0;
        }

        if let Some(value) = rest.strip_prefix('=') {
            parsed.add(letter.to_string(), value.into());
            return 0;
        }
        if letter.is_alphabetic() && looks_like_number(rest) {
            parsed.add(letter.to_string(), rest.into());
            return 0;
        }
        let next_char = letters.get(j + 1).map(|&(_, c)| c);
        if next_char.is_some_and(|c| !(c.is_alphanumeric() || c == '_')) {
            parsed.add(letter.to_string(), rest.into());
            return 0;
        }
        parsed.add(letter.to_string(), ArgValue::Bool(true));
    }

    0
}

/// Result of rebuilding the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArgv {
    /// Command to execute (first positional).
    pub program: String,
    /// `-<flag> <value>` pairs for the command.
    pub argv: Vec<String>,
    /// Files the generated config depends on, deduplicated, first-seen order.
    pub deps: Vec<PathBuf>,
}

/// Rebuilds a command line from parsed flags and extracts dependencies.
#[derive(Debug, Default)]
pub struct ArgvBuilder {
    argv: Vec<String>,
    deps: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl ArgvBuilder {
    pub fn build(parsed: &ParsedArgs) -> Result<BuiltArgv> {
        let Some(program) = parsed.positionals().first() else {
            return Err(TmplwatchError::ConfigAcquisition(
                "templated args do not name a command to run".to_string(),
            ));
        };
        if parsed.positionals().len() > 1 {
            debug!(
                ignored = ?&parsed.positionals()[1..],
                "extra positional arguments are not passed to the config command"
            );
        }

        let mut builder = ArgvBuilder::default();
        for (name, value) in parsed.flags() {
            for v in value.values() {
                builder.push(name, v);
            }
        }

        if builder.argv.is_empty() {
            return Err(TmplwatchError::ConfigAcquisition(format!(
                "templated args give no flags to pass to `{program}`"
            )));
        }

        Ok(BuiltArgv {
            program: program.clone(),
            argv: builder.argv,
            deps: builder.deps,
        })
    }

    fn push(&mut self, name: &str, value: &ArgValue) {
        self.argv.push(format!("-{name}"));
        self.argv.push(value.to_string());

        if let Some(dep) = dependency_of(name, value) {
            if self.seen.insert(dep.clone()) {
                self.deps.push(dep);
            }
        }
    }
}

/// Dependency path contributed by one flag occurrence, if any.
pub fn dependency_of(flag: &str, value: &ArgValue) -> Option<PathBuf> {
    let ArgValue::Str(value) = value else {
        return None;
    };
    match flag {
        "t" | "f" => Some(PathBuf::from(value)),
        "d" => {
            let (_, target) = value.split_once('=')?;
            let url = Url::parse(target).ok()?;
            if !url.scheme().starts_with("file") {
                return None;
            }
            // Decoded local path when there is one; remote hosts keep the raw path.
            Some(
                url.to_file_path()
                    .unwrap_or_else(|()| PathBuf::from(url.path())),
            )
        }
        _ => None,
    }
}
