//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats,
//! check and convert serialized documents, and write them to files.

use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiDocument;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format for a serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Map a format name to a format; `yaml` and `yml` select YAML, anything else JSON
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Serialize `doc` in this format
    pub fn serialize(&self, doc: &OpenApiDocument) -> Result<String> {
        match self {
            Self::Json => serialize_json(doc),
            Self::Yaml => serialize_yaml(doc),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes an OpenAPI document to YAML format.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
///
/// # Returns
///
/// Returns the YAML string representation of the document.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use swag_gen::openapi_builder::OpenApiBuilder;
/// use swag_gen::serializer::serialize_yaml;
///
/// let builder = OpenApiBuilder::new("User API", "1.0.0", None);
/// let yaml = serialize_yaml(builder.build()).unwrap();
/// assert!(yaml.contains("title: User API"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
///
/// # Returns
///
/// Returns the JSON string representation of the document, indented for readability.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Check that `data` is a non-empty, well-formed JSON document
pub fn validate_json(data: &str) -> Result<()> {
    if data.trim().is_empty() {
        return Err(Error::InvalidArgument("JSON data cannot be empty".to_string()));
    }
    serde_json::from_str::<serde_json::Value>(data)?;
    Ok(())
}

/// Check that `data` is a non-empty, well-formed YAML document
pub fn validate_yaml(data: &str) -> Result<()> {
    if data.trim().is_empty() {
        return Err(Error::InvalidArgument("YAML data cannot be empty".to_string()));
    }
    serde_yaml::from_str::<serde_yaml::Value>(data)?;
    Ok(())
}

/// Convert a JSON document to YAML
pub fn json_to_yaml(json: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(serde_yaml::to_string(&value)?)
}

/// Convert a YAML document to pretty-printed JSON
pub fn yaml_to_json(yaml: &str) -> Result<String> {
    let value: serde_json::Value = serde_yaml::from_str(yaml)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Serializes `doc` and writes it to `<dir>/<base_name>.<json|yaml>`.
///
/// The directory is created if needed.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if `base_name` is empty, serialization fails, or the file cannot be
/// written.
pub fn write_document(
    doc: &OpenApiDocument,
    dir: &Path,
    base_name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    if base_name.trim().is_empty() {
        return Err(Error::InvalidArgument("filename cannot be empty".to_string()));
    }

    let content = format.serialize(doc)?;
    let path = dir.join(format!("{}.{}", base_name, format.extension()));
    write_to_file(&content, &path)?;
    Ok(path)
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent directories are
/// created as needed.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use crate::openapi_builder::OpenApiBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Helper function to create a small OpenAPI document for testing
    fn create_test_document() -> OpenApiDocument {
        let mut builder = OpenApiBuilder::new("Test API", "1.0.0", Some("A test API".to_string()));
        builder.add_endpoint(&Endpoint::new("GET", "/users")).unwrap();
        builder.add_endpoint(&Endpoint::new("POST", "/users")).unwrap();
        builder.add_endpoint(&Endpoint::new("GET", "/posts")).unwrap();
        builder.into_document()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("paths:"));
        assert!(yaml.contains("/users:"));
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  "));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.0");
        assert_eq!(parsed["info"]["title"], "Test API");
    }

    #[test]
    fn test_json_yaml_round_trip_preserves_info_and_paths() {
        let doc = create_test_document();

        let json = serialize_json(&doc).unwrap();
        let yaml = json_to_yaml(&json).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["info"]["title"].as_str(), Some("Test API"));
        assert_eq!(value["info"]["version"].as_str(), Some("1.0.0"));
        let paths = value["paths"].as_mapping().unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_yaml_to_json_back_to_document() {
        let doc = create_test_document();
        let json = yaml_to_json(&serialize_yaml(&doc).unwrap()).unwrap();
        let back: OpenApiDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_validate() {
        assert!(validate_json(r#"{"openapi": "3.0.0"}"#).is_ok());
        assert!(validate_json("").is_err());
        assert!(validate_json("{not json").is_err());

        assert!(validate_yaml("openapi: 3.0.0\n").is_ok());
        assert!(validate_yaml("   ").is_err());
        assert!(validate_yaml("key: [unclosed").is_err());
    }

    #[test]
    fn test_output_format_from_name() {
        assert_eq!(OutputFormat::from_name("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_name("YML"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_name("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_name("xml"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_name(""), OutputFormat::Json);
    }

    #[test]
    fn test_write_document() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("docs");
        let doc = create_test_document();

        let json_path = write_document(&doc, &out_dir, "swagger", OutputFormat::Json).unwrap();
        assert_eq!(json_path, out_dir.join("swagger.json"));
        validate_json(&fs::read_to_string(&json_path).unwrap()).unwrap();

        let yaml_path = write_document(&doc, &out_dir, "swagger", OutputFormat::Yaml).unwrap();
        assert_eq!(yaml_path, out_dir.join("swagger.yaml"));
        validate_yaml(&fs::read_to_string(&yaml_path).unwrap()).unwrap();
    }

    #[test]
    fn test_write_document_rejects_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        let err = write_document(&create_test_document(), temp_dir.path(), "", OutputFormat::Json)
            .unwrap_err();
        assert!(err.to_string().contains("filename cannot be empty"));
    }

    #[test]
    fn test_write_to_file_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
