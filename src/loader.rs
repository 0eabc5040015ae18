use anyhow::{Context, Result};
use log::debug;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Input format of a spec file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Infers the format from the path: anything containing `.json` is JSON,
    /// everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        if path.to_string_lossy().contains(".json") {
            InputFormat::Json
        } else {
            InputFormat::Yaml
        }
    }
}

/// Loads a spec file into a generic document tree.
///
/// JSON files are deserialized through `serde_json` directly into a
/// [`serde_yaml::Value`], so both formats end up in the same tree type with
/// their original key order.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON/YAML.
pub fn load_document(path: &Path) -> Result<Value> {
    debug!("Loading spec document: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    parse_document(&content, InputFormat::from_path(path))
        .with_context(|| format!("Failed to parse spec document: {}", path.display()))
}

/// Parses document text in the given format.
pub fn parse_document(content: &str, format: InputFormat) -> Result<Value> {
    let doc: Value = match format {
        InputFormat::Json => serde_json::from_str(content).context("Invalid JSON")?,
        InputFormat::Yaml => serde_yaml::from_str(content).context("Invalid YAML")?,
    };
    Ok(doc)
}
