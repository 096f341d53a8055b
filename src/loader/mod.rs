//! Loading definitions from disk.
//!
//! A load reads the document, resolves placeholders in its attributes against
//! the file's directory, layers the attributes over the selected `prompty.json`
//! connection, and then, if a `base` is declared, loads that base (relative to
//! the child) and inherits from it. Any failure along the way aborts the whole
//! load.
//!
//! Each load carries the chain of files currently being loaded; a base that
//! refers back into the chain is rejected with [`PromptyError::CyclicBase`].

use crate::config::{DEFAULT_CONNECTION, load_global_config, load_global_config_async};
use crate::definition::{Content, ModelSettings, Prompty, TemplateSettings, param_hoisting};
use crate::document::PromptyDocument;
use crate::error::{PromptyError, Result};
use crate::normalize::{normalize_map, normalize_map_async};
use crate::registry::NOOP;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Load a definition file, resolving its base chain.
///
/// Relative paths resolve against the current directory. `connection` selects
/// the `prompty.json` profile for this file; bases always use the default one.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), connection = %connection))]
pub fn load(path: impl AsRef<Path>, connection: &str) -> Result<Prompty> {
    let path = absolute(path.as_ref())?;
    load_chain(&path, connection, &mut Vec::new())
}

/// [`load`] without blocking.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), connection = %connection))]
pub async fn load_async(path: impl AsRef<Path>, connection: &str) -> Result<Prompty> {
    let path = absolute(path.as_ref())?;
    load_chain_async(path, connection, &mut Vec::new()).await
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| PromptyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn canonical_error(path: &Path, source: std::io::Error) -> PromptyError {
    if source.kind() == ErrorKind::NotFound {
        PromptyError::NotFound(path.to_path_buf())
    } else {
        PromptyError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Record `canonical` in the chain, failing if it is already being loaded.
fn enter(chain: &mut Vec<PathBuf>, canonical: PathBuf, path: &Path) -> Result<()> {
    if chain.contains(&canonical) {
        return Err(PromptyError::CyclicBase(path.to_path_buf()));
    }
    chain.push(canonical);
    Ok(())
}

fn directory(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

fn load_chain(path: &Path, connection: &str, chain: &mut Vec<PathBuf>) -> Result<Prompty> {
    let canonical = std::fs::canonicalize(path).map_err(|e| canonical_error(path, e))?;
    enter(chain, canonical, path)?;
    tracing::debug!(path = %path.display(), depth = chain.len(), "loading definition");

    let dir = directory(path);
    let document = PromptyDocument::load(path)?;
    let attributes = normalize_map(&document.attributes, dir, true)?;
    let global_config = normalize_map(&load_global_config(dir, connection)?, dir, true)?;

    let prompty = Prompty::load_raw(
        attributes,
        Content::from(document.body),
        path.to_path_buf(),
        &global_config,
    )?;

    let prompty = match prompty.base.clone() {
        Some(base) => {
            let base = load_chain(&dir.join(base), DEFAULT_CONNECTION, chain)?;
            prompty.hoist_base(base)
        }
        None => prompty,
    };

    chain.pop();
    Ok(prompty)
}

fn load_chain_async<'a>(
    path: PathBuf,
    connection: &'a str,
    chain: &'a mut Vec<PathBuf>,
) -> BoxFuture<'a, Result<Prompty>> {
    async move {
        let canonical = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| canonical_error(&path, e))?;
        enter(chain, canonical, &path)?;
        tracing::debug!(path = %path.display(), depth = chain.len(), "loading definition");

        let dir = directory(&path);
        let document = PromptyDocument::load_async(&path).await?;
        let attributes = normalize_map_async(&document.attributes, dir, true).await?;
        let config = load_global_config_async(dir, connection).await?;
        let global_config = normalize_map_async(&config, dir, true).await?;

        let prompty = Prompty::load_raw(
            attributes,
            Content::from(document.body),
            path.clone(),
            &global_config,
        )?;

        let prompty = match prompty.base.clone() {
            Some(base) => {
                let base = load_chain_async(dir.join(base), DEFAULT_CONNECTION, chain).await?;
                prompty.hoist_base(base)
            }
            None => prompty,
        };

        chain.pop();
        Ok(prompty)
    }
    .boxed()
}

/// Build a definition for programmatic use, without a file.
///
/// The template is the pass-through `NOOP` pair, so `content` reaches the
/// executor unchanged. `configuration` is layered over the `connection`
/// profile of the nearest `prompty.json` above `base_dir`, and the result is
/// normalized against `base_dir`.
#[tracing::instrument(skip_all, fields(api = %api, connection = %connection))]
pub fn headless(
    api: &str,
    content: impl Into<Content>,
    configuration: &Map<String, Value>,
    parameters: &Map<String, Value>,
    connection: &str,
    base_dir: &Path,
) -> Result<Prompty> {
    let global_config = load_global_config(base_dir, connection)?;
    let configuration = normalize_map(
        &param_hoisting(configuration, &global_config),
        base_dir,
        true,
    )?;
    Ok(headless_prompty(api, content.into(), configuration, parameters))
}

/// [`headless`] without blocking.
#[tracing::instrument(skip_all, fields(api = %api, connection = %connection))]
pub async fn headless_async(
    api: &str,
    content: impl Into<Content>,
    configuration: &Map<String, Value>,
    parameters: &Map<String, Value>,
    connection: &str,
    base_dir: &Path,
) -> Result<Prompty> {
    let content = content.into();
    let global_config = load_global_config_async(base_dir, connection).await?;
    let configuration = normalize_map_async(
        &param_hoisting(configuration, &global_config),
        base_dir,
        true,
    )
    .await?;
    Ok(headless_prompty(api, content, configuration, parameters))
}

fn headless_prompty(
    api: &str,
    content: Content,
    configuration: Map<String, Value>,
    parameters: &Map<String, Value>,
) -> Prompty {
    Prompty {
        model: ModelSettings {
            api: api.to_string(),
            configuration,
            parameters: parameters.clone(),
            ..ModelSettings::default()
        },
        template: TemplateSettings {
            format: NOOP.to_string(),
            parser: NOOP.to_string(),
            nonce: None,
        },
        content,
        ..Prompty::default()
    }
}
