//! Tests for global configuration.

use crate::config::{
    CONFIG_FILE_NAME, DEFAULT_CONNECTION, GlobalConfig, load_global_config,
    load_global_config_async,
};
use crate::error::PromptyError;
use crate::test_support::write_file;
use serde_json::{Value, json};
use tempfile::TempDir;

#[test]
fn test_default_config_is_empty() {
    let config = GlobalConfig::default();
    assert!(config.connections.is_empty());
    assert!(config.connection(DEFAULT_CONNECTION).is_empty());
}

#[test]
fn test_parse_connections() {
    let json = r#"
{
  "default": {"type": "azure_openai", "azure_deployment": "gpt-35-turbo"},
  "local": {"type": "openai", "base_url": "http://localhost:11434/v1"}
}
"#;
    let config = GlobalConfig::from_json(json).unwrap();

    assert_eq!(config.connections.len(), 2);
    assert_eq!(
        Value::Object(config.connection("default")),
        json!({"type": "azure_openai", "azure_deployment": "gpt-35-turbo"})
    );
    assert_eq!(config.connection("local")["type"], json!("openai"));
    assert!(config.connection("missing").is_empty());
}

#[test]
fn test_parse_empty_object() {
    let config = GlobalConfig::from_json("{}").unwrap();
    assert!(config.connections.is_empty());
}

#[test]
fn test_validate_connection_must_be_object() {
    let result = GlobalConfig::from_json(r#"{"default": "azure"}"#);

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("'default'"));
    assert!(err.to_string().contains("must be an object"));
}

#[test]
fn test_validate_connection_name_must_not_be_empty() {
    let result = GlobalConfig::from_json(r#"{" ": {}}"#);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("cannot be empty"));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), CONFIG_FILE_NAME, "{ nope");

    let err = GlobalConfig::load(&path).unwrap_err();
    assert!(matches!(err, PromptyError::Parse { path: ref p, .. } if *p == path));
}

#[test]
fn test_discover_walks_up_to_nearest_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(root, CONFIG_FILE_NAME, r#"{"default": {"level": "root"}}"#);
    write_file(root, "team/prompty.json", r#"{"default": {"level": "team"}}"#);
    std::fs::create_dir_all(root.join("team/prompts/deep")).unwrap();

    let found = GlobalConfig::discover(&root.join("team/prompts/deep")).unwrap();
    assert_eq!(found, root.join("team").join(CONFIG_FILE_NAME));

    let found = GlobalConfig::discover(root).unwrap();
    assert_eq!(found, root.join(CONFIG_FILE_NAME));
}

#[test]
fn test_load_global_config_selects_connection() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        CONFIG_FILE_NAME,
        r#"{"default": {"type": "azure"}, "other": {"type": "openai"}}"#,
    );

    let config = load_global_config(temp_dir.path(), "other").unwrap();
    assert_eq!(Value::Object(config), json!({"type": "openai"}));

    let config = load_global_config(temp_dir.path(), "absent").unwrap();
    assert!(config.is_empty());
}

#[test]
fn test_load_global_config_without_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();

    // Ancestors of the temp dir may hold a stray prompty.json; only check the
    // fixture directory has nothing of its own by using an unknown connection.
    let config = load_global_config(&temp_dir.path().join("a/b"), "prompty-test-absent").unwrap();
    assert!(config.is_empty());
}

#[tokio::test]
async fn test_async_matches_blocking() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        CONFIG_FILE_NAME,
        r#"{"default": {"type": "azure", "key": "${env:KEY}"}}"#,
    );
    std::fs::create_dir_all(temp_dir.path().join("nested")).unwrap();
    let dir = temp_dir.path().join("nested");

    let blocking = load_global_config(&dir, DEFAULT_CONNECTION).unwrap();
    let suspending = load_global_config_async(&dir, DEFAULT_CONNECTION)
        .await
        .unwrap();
    assert_eq!(blocking, suspending);
    // Placeholders are left for the caller to normalize.
    assert_eq!(suspending["key"], json!("${env:KEY}"));
}
