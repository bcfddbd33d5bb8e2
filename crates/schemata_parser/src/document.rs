//! Loading YAML, TOML and JSON documents.

use schemata_core::SchemaError;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading documents.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// The document loaded but is not a valid schema
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Parse a YAML document.
///
/// # Example
///
/// ```rust
/// use schemata_parser::parse_yaml;
///
/// let value = parse_yaml("type: string\nminlength: 2\n").unwrap();
/// assert_eq!(value["minlength"], 2);
/// ```
pub fn parse_yaml(content: &str) -> Result<Value> {
    let value: Value = serde_yaml_ng::from_str(content)?;
    Ok(value)
}

/// Parse a TOML document.
///
/// TOML has no `null`, so TOML documents can only express non-null data.
///
/// # Example
///
/// ```rust
/// use schemata_parser::parse_toml;
///
/// let value = parse_toml("type = \"map\"\n[schema.name]\ntype = \"string\"\n").unwrap();
/// assert_eq!(value["schema"]["name"]["type"], "string");
/// ```
pub fn parse_toml(content: &str) -> Result<Value> {
    let value: Value = toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(value)
}

/// Parse a JSON document.
pub fn parse_json(content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(content)?;
    Ok(value)
}

/// Detect the document format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `DocumentFormat::Yaml`
/// * `.toml` → `DocumentFormat::Toml`
/// * `.json` → `DocumentFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DocumentFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(DocumentFormat::Yaml),
        "toml" => Ok(DocumentFormat::Toml),
        "json" => Ok(DocumentFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a document from a file with automatic format detection.
///
/// ```no_run
/// use schemata_parser::parse_file;
/// use std::path::Path;
///
/// let schema = parse_file(Path::new("schemas/person.yml")).unwrap();
/// println!("Loaded schema of type {}", schema["type"]);
/// ```
pub fn parse_file(path: &Path) -> Result<Value> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading document");

    match format {
        DocumentFormat::Yaml => parse_yaml(&content),
        DocumentFormat::Toml => parse_toml(&content),
        DocumentFormat::Json => parse_json(&content),
    }
}
