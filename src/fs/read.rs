//! Blocking and async file reads plus structured-document parsing.

use crate::error::{PromptyError, Result};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Read a UTF-8 file, blocking the calling thread.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| read_error(path, e))
}

/// Read a UTF-8 file, suspending on the tokio reactor.
pub async fn read_file_async<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, source: std::io::Error) -> PromptyError {
    if source.kind() == ErrorKind::NotFound {
        PromptyError::NotFound(path.to_path_buf())
    } else {
        PromptyError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parse file contents as a structured document.
///
/// `.yaml` / `.yml` files are parsed as YAML; anything else as JSON.
pub fn parse_structured(path: &Path, content: &str) -> Result<Value> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| PromptyError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(content).map_err(|e| PromptyError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        let err = read_file(&path).unwrap_err();
        assert!(matches!(err, PromptyError::NotFound(p) if p == path));
    }

    #[tokio::test]
    async fn missing_file_is_not_found_async() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        let err = read_file_async(&path).await.unwrap_err();
        assert!(matches!(err, PromptyError::NotFound(p) if p == path));
    }

    #[test]
    fn parses_json_and_yaml_by_extension() {
        let value = parse_structured(Path::new("data.json"), r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));

        let value = parse_structured(Path::new("data.yaml"), "a:\n  - 1\n  - 2\n").unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));

        let value = parse_structured(Path::new("data.YML"), "name: x").unwrap();
        assert_eq!(value, json!({"name": "x"}));
    }

    #[test]
    fn parse_failure_names_the_file() {
        let err = parse_structured(Path::new("broken.json"), "{not json").unwrap_err();
        assert!(matches!(err, PromptyError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
