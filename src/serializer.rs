//! Serialization of generated documents to YAML and writing them to disk.
//!
//! YAML output is written in block style with keys in insertion order. It never
//! contains anchors or aliases: every shared sub-tree is written out in full,
//! including sub-trees that were aliases (`*name`) in the input document, since
//! the loader already resolved them into independent copies.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize document to YAML")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Removes `dir` with everything in it and recreates it empty.
///
/// # Errors
///
/// Returns an error if the directory cannot be removed or created.
pub fn reset_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        debug!("Removing existing output directory: {}", dir.display());
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;
    use tempfile::TempDir;

    fn create_test_document() -> Value {
        serde_yaml::from_str(
            r#"
            swagger: '2.0'
            info:
              title: Test API
              version: 1.0.0
            paths:
              /pets:
                get:
                  responses:
                    '200':
                      description: ok
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.starts_with("swagger:"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("/pets:"));
        assert!(yaml.contains("description: ok"));
    }

    #[test]
    fn test_serialize_yaml_keeps_key_order() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        let swagger = yaml.find("swagger:").unwrap();
        let info = yaml.find("info:").unwrap();
        let paths = yaml.find("paths:").unwrap();
        assert!(swagger < info && info < paths);
    }

    #[test]
    fn test_aliases_are_expanded() {
        let doc: Value = serde_yaml::from_str(
            r#"
            shared: &headers
              X-Id:
                type: string
            first: *headers
            second: *headers
            "#,
        )
        .unwrap();

        let yaml = serialize_yaml(&doc).unwrap();

        assert!(!yaml.contains('&'));
        assert!(!yaml.contains('*'));
        assert_eq!(yaml.matches("X-Id:").count(), 3);

        let reloaded: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded, doc);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_reset_output_dir_empties_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        write_to_file("stale", &out.join("old.yaml")).unwrap();

        reset_output_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_output_dir_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("fresh");

        reset_output_dir(&out).unwrap();

        assert!(out.is_dir());
    }
}
