//! Placeholder resolution for attribute values.
//!
//! Attribute values may reference the environment or other files:
//!
//! ```text
//! model:
//!   configuration:
//!     api_key: ${env:OPENAI_API_KEY}
//!     endpoint: ${env:ENDPOINT:https://localhost:8080}
//!   parameters: ${file:parameters.json}
//! ```
//!
//! [`normalize`] walks sequences and mappings recursively and substitutes every
//! string leaf that is exactly one placeholder. [`normalize_async`] is the same
//! walk with file reads suspending instead of blocking; both share
//! [`Placeholder::parse`] and the environment lookup so they cannot drift.
//!
//! Files pulled in through `${file:...}` are normalized against the *original*
//! base location, not the directory of the loaded file.

use crate::error::{PromptyError, Result};
use crate::fs::{parse_structured, read_file, read_file_async};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};


/// A parsed `${scope:...}` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    /// `${env:NAME}` or `${env:NAME:default}`.
    Env {
        name: &'a str,
        default: Option<&'a str>,
    },
    /// `${file:relative/path.json}`.
    File { path: &'a str },
}

impl<'a> Placeholder<'a> {
    /// Parse a string leaf.
    ///
    /// Returns `Ok(None)` when the (trimmed) string is not wrapped in `${` `}`.
    /// A wrapped string with an unknown scope or an empty name is an
    /// [`PromptyError::InvalidReference`].
    pub fn parse(text: &'a str) -> Result<Option<Self>> {
        let trimmed = text.trim();
        let Some(inner) = trimmed
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return Ok(None);
        };

        let invalid = || PromptyError::InvalidReference(trimmed.to_string());
        let (scope, rest) = inner.split_once(':').ok_or_else(invalid)?;

        match scope {
            "env" => {
                let (name, default) = match rest.split_once(':') {
                    Some((name, default)) => (name, Some(default).filter(|d| !d.is_empty())),
                    None => (rest, None),
                };
                if name.is_empty() {
                    return Err(invalid());
                }
                Ok(Some(Placeholder::Env { name, default }))
            }
            "file" if !rest.is_empty() => Ok(Some(Placeholder::File { path: rest })),
            _ => Err(invalid()),
        }
    }
}

/// Resolve an environment placeholder.
fn resolve_env(name: &str, default: Option<&str>, env_required: bool) -> Result<Value> {
    match std::env::var(name) {
        Ok(value) => Ok(Value::String(value)),
        Err(_) => match default {
            Some(default) => Ok(Value::String(default.to_string())),
            None if env_required => Err(PromptyError::MissingVariable(name.to_string())),
            None => Ok(Value::String(String::new())),
        },
    }
}

/// Values loaded from a referenced file: containers are walked, scalars kept as-is.
fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn file_path(base: &Path, reference: &str) -> PathBuf {
    base.join(reference)
}

/// Resolve every placeholder inside `value`, blocking on file reads.
///
/// * `base` - directory that `${file:...}` references are relative to
/// * `env_required` - whether an unset variable without a default is an error
///   (otherwise it resolves to the empty string)
///
/// Fails fast: the first unresolvable placeholder aborts the whole walk.
pub fn normalize(value: &Value, base: &Path, env_required: bool) -> Result<Value> {
    match value {
        Value::String(text) => match Placeholder::parse(text)? {
            Some(Placeholder::Env { name, default }) => resolve_env(name, default, env_required),
            Some(Placeholder::File { path }) => {
                let path = file_path(base, path);
                let loaded = parse_structured(&path, &read_file(&path)?)?;
                if is_container(&loaded) {
                    normalize(&loaded, base, env_required)
                } else {
                    Ok(loaded)
                }
            }
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| normalize(item, base, env_required))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => normalize_map(map, base, env_required).map(Value::Object),
        _ => Ok(value.clone()),
    }
}

/// [`normalize`] over a mapping, keeping the mapping type.
pub fn normalize_map(
    map: &Map<String, Value>,
    base: &Path,
    env_required: bool,
) -> Result<Map<String, Value>> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), normalize(value, base, env_required)?)))
        .collect()
}

/// Resolve every placeholder inside `value`, suspending on file reads.
///
/// Behaves exactly like [`normalize`]; entries are resolved in order, one at a time.
pub fn normalize_async<'a>(
    value: &'a Value,
    base: &'a Path,
    env_required: bool,
) -> BoxFuture<'a, Result<Value>> {
    async move {
        match value {
            Value::String(text) => match Placeholder::parse(text)? {
                Some(Placeholder::Env { name, default }) => {
                    resolve_env(name, default, env_required)
                }
                Some(Placeholder::File { path }) => {
                    let path = file_path(base, path);
                    let loaded = parse_structured(&path, &read_file_async(&path).await?)?;
                    if is_container(&loaded) {
                        normalize_async(&loaded, base, env_required).await
                    } else {
                        Ok(loaded)
                    }
                }
                None => Ok(value.clone()),
            },
            Value::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(normalize_async(item, base, env_required).await?);
                }
                Ok(Value::Array(resolved))
            }
            Value::Object(map) => normalize_map_async(map, base, env_required)
                .await
                .map(Value::Object),
            _ => Ok(value.clone()),
        }
    }
    .boxed()
}

/// [`normalize_async`] over a mapping, keeping the mapping type.
pub async fn normalize_map_async(
    map: &Map<String, Value>,
    base: &Path,
    env_required: bool,
) -> Result<Map<String, Value>> {
    let mut resolved = Map::new();
    for (key, value) in map {
        resolved.insert(key.clone(), normalize_async(value, base, env_required).await?);
    }
    Ok(resolved)
}
