//! On-disk prompt documents.
//!
//! A document is YAML frontmatter delimited by `---` lines followed by the
//! content body:
//!
//! ```text
//! ---
//! name: Basic Prompt
//! model:
//!   api: chat
//! ---
//! system:
//! You are a helpful assistant.
//! ```
//!
//! This module only splits the two halves; interpreting them is the job of
//! [`Prompty::load_raw`](crate::definition::Prompty::load_raw).

use crate::error::{PromptyError, Result};
use crate::fs::{read_file, read_file_async};
use serde_json::{Map, Value};
use std::path::Path;


/// A document split into attributes and body.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptyDocument {
    /// The frontmatter as a JSON mapping (empty when there is no frontmatter).
    pub attributes: Map<String, Value>,
    /// Everything after the closing `---`, with original line endings.
    pub body: String,
}

impl PromptyDocument {
    /// Load a document from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::parse(&read_file(path)?).map_err(|e| with_path(e, path))
    }

    /// Load a document from disk without blocking.
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::parse(&read_file_async(path).await?).map_err(|e| with_path(e, path))
    }

    /// Parse a document from its text.
    ///
    /// Both LF and CRLF line endings are supported; the body keeps its
    /// original line endings. Text that does not start with `---` is a
    /// body-only document.
    ///
    /// ```
    /// use prompty::document::PromptyDocument;
    ///
    /// let doc = PromptyDocument::parse("---\nname: test\n---\nuser: hi\n").unwrap();
    /// assert_eq!(doc.attributes["name"], "test");
    /// assert_eq!(doc.body, "user: hi\n");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let normalized = content.replace("\r\n", "\n");

        if !normalized.starts_with("---") {
            return Ok(Self {
                attributes: Map::new(),
                body: content.to_string(),
            });
        }

        let (frontmatter, body_start) = extract_frontmatter(&normalized, content)?;

        let attributes = match serde_yaml::from_str::<Value>(&frontmatter).map_err(|e| {
            PromptyError::Parse {
                path: Default::default(),
                message: format!("invalid frontmatter: {}", e),
            }
        })? {
            Value::Null => Map::new(),
            Value::Object(attributes) => attributes,
            _ => {
                return Err(PromptyError::Parse {
                    path: Default::default(),
                    message: "frontmatter must be a mapping".to_string(),
                });
            }
        };

        let body = content.get(body_start..).unwrap_or_default().to_string();

        Ok(Self { attributes, body })
    }
}

/// Attach the file path to a parse error raised before the path was known.
fn with_path(err: PromptyError, path: &Path) -> PromptyError {
    match err {
        PromptyError::Parse { message, .. } => PromptyError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    }
}

/// Extract the frontmatter YAML and the byte offset where the body starts.
fn extract_frontmatter(normalized: &str, original: &str) -> Result<(String, usize)> {
    let incomplete = |message: &str| PromptyError::Parse {
        path: Default::default(),
        message: message.to_string(),
    };

    let first_newline = normalized
        .find('\n')
        .ok_or_else(|| incomplete("frontmatter is incomplete"))?;

    let rest = &normalized[first_newline + 1..];
    let (frontmatter, closing_len) = if rest.starts_with("---") {
        // Empty frontmatter: the closing delimiter directly follows the opening one.
        (String::new(), 3)
    } else {
        let closing_pos = rest
            .find("\n---")
            .ok_or_else(|| incomplete("missing closing '---' frontmatter delimiter"))?;
        (rest[..closing_pos].to_string(), closing_pos + 4)
    };

    let normalized_body_start = first_newline + 1 + closing_len;
    let body_start = find_original_position(original, normalized_body_start);

    // Skip the newline after the closing delimiter if present.
    let remaining = original.get(body_start..).unwrap_or_default();
    let body_start = if remaining.starts_with("\r\n") {
        body_start + 2
    } else if remaining.starts_with('\n') {
        body_start + 1
    } else {
        body_start
    };

    Ok((frontmatter, body_start))
}

/// Map a byte offset in the LF-normalized text back to the original text.
fn find_original_position(original: &str, normalized_pos: usize) -> usize {
    let bytes = original.as_bytes();
    let mut orig_pos = 0;
    let mut norm_pos = 0;

    while norm_pos < normalized_pos && orig_pos < bytes.len() {
        if bytes[orig_pos] == b'\r' && bytes.get(orig_pos + 1) == Some(&b'\n') {
            orig_pos += 2;
        } else {
            orig_pos += 1;
        }
        norm_pos += 1;
    }

    orig_pos
}
