//! Generator configuration, stored as YAML.
//!
//! ```yaml
//! project:
//!   name: User Service
//!   version: 1.0.0
//!   description: ''
//! parser:
//!   path: ./api
//!   exclude: [vendor, node_modules, .git, test, tests]
//!   max_concurrent: 4
//! output:
//!   path: ./docs
//!   format: json
//! swagger:
//!   title: User Service
//!   version: 1.0.0
//!   description: ''
//!   basePath: /api/v1
//! ```

use crate::error::{Error, Result};
use crate::scanner::{DEFAULT_EXCLUDES, DEFAULT_MAX_CONCURRENT};
use crate::serializer::{self, OutputFormat};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name used when the configuration is written next to the generated document
pub const CONFIG_FILE_NAME: &str = "swag-gen.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Root of the Go sources to scan
    pub path: String,
    /// Directory names skipped while scanning
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the document is written to
    pub path: String,
    /// `json`, `yaml` or `yml`
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "basePath", default, skip_serializing_if = "String::is_empty")]
    pub base_path: String,
}

fn check_format(format: &str) -> Result<()> {
    match format {
        "json" | "yaml" | "yml" => Ok(()),
        _ => Err(Error::InvalidConfig(
            "output format must be json or yaml".to_string(),
        )),
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{} cannot be empty", what)));
    }
    Ok(())
}

impl Config {
    /// Create a configuration with default parser, output and swagger sections
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let version = version.into();
        let description = description.into();

        Self {
            project: ProjectConfig {
                name: name.clone(),
                version: version.clone(),
                description: description.clone(),
            },
            parser: ParserConfig {
                path: "./api".to_string(),
                exclude: default_excludes(),
                max_concurrent: DEFAULT_MAX_CONCURRENT,
            },
            output: OutputConfig {
                path: "./docs".to_string(),
                format: "json".to_string(),
            },
            swagger: SwaggerConfig {
                title: name,
                version,
                description,
                base_path: "/api/v1".to_string(),
            },
        }
    }

    /// Check every section; the first problem found is returned
    pub fn validate(&self) -> Result<()> {
        require(&self.project.name, "project name")?;
        require(&self.project.version, "project version")?;
        require(&self.parser.path, "parser path")?;
        if self.parser.max_concurrent == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        require(&self.output.path, "output path")?;
        check_format(&self.output.format)?;
        require(&self.swagger.title, "swagger title")?;
        require(&self.swagger.version, "swagger version")?;
        Ok(())
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Write the configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        serializer::write_to_file(&self.to_yaml()?, path)
    }

    pub fn set_project_info(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.project.name = name.into();
        self.project.version = version.into();
        self.project.description = description.into();
    }

    pub fn set_parser_path(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        require(&path, "parser path")?;
        self.parser.path = path;
        Ok(())
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        require(&path, "output path")?;
        self.output.path = path;
        Ok(())
    }

    pub fn set_output_format(&mut self, format: impl Into<String>) -> Result<()> {
        let format = format.into();
        check_format(&format)?;
        self.output.format = format;
        Ok(())
    }

    pub fn set_swagger_info(
        &mut self,
        title: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.swagger.title = title.into();
        self.swagger.version = version.into();
        self.swagger.description = description.into();
    }

    pub fn set_swagger_base_path(&mut self, base_path: impl Into<String>) {
        self.swagger.base_path = base_path.into();
    }

    /// Add a directory name to skip; empty names and duplicates are ignored
    pub fn add_exclude_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !path.is_empty() && !self.parser.exclude.contains(&path) {
            self.parser.exclude.push(path);
        }
    }

    /// Remove a directory name from the exclusion list
    pub fn remove_exclude_path(&mut self, path: &str) {
        self.parser.exclude.retain(|p| p != path);
    }

    pub fn exclude_paths(&self) -> &[String] {
        &self.parser.exclude
    }

    /// The configured output format
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_name(&self.output.format)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("API Documentation", "1.0.0", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_new_fills_defaults() {
        let config = Config::new("User Service", "2.1.0", "users");

        assert_eq!(config.project.name, "User Service");
        assert_eq!(config.parser.path, "./api");
        assert_eq!(config.parser.exclude, vec!["vendor", "node_modules", ".git", "test", "tests"]);
        assert_eq!(config.parser.max_concurrent, 4);
        assert_eq!(config.output.path, "./docs");
        assert_eq!(config.output.format, "json");
        assert_eq!(config.swagger.title, "User Service");
        assert_eq!(config.swagger.version, "2.1.0");
        assert_eq!(config.swagger.base_path, "/api/v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases: Vec<(fn(&mut Config), &str)> = vec![
            (|c| c.project.name.clear(), "project name cannot be empty"),
            (|c| c.project.version.clear(), "project version cannot be empty"),
            (|c| c.parser.path.clear(), "parser path cannot be empty"),
            (|c| c.parser.max_concurrent = 0, "max_concurrent"),
            (|c| c.output.path.clear(), "output path cannot be empty"),
            (|c| c.output.format = "xml".to_string(), "output format must be json or yaml"),
            (|c| c.swagger.title.clear(), "swagger title cannot be empty"),
            (|c| c.swagger.version.clear(), "swagger version cannot be empty"),
        ];

        for (mutate, expected) in cases {
            let mut config = Config::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected '{}' in '{}'",
                expected,
                err
            );
        }
    }

    #[test]
    fn test_setters_validate_input() {
        let mut config = Config::default();

        assert!(config.set_parser_path("").is_err());
        assert!(config.set_output_path("").is_err());
        assert!(config.set_output_format("toml").is_err());

        config.set_parser_path("./src").unwrap();
        config.set_output_path("./out").unwrap();
        config.set_output_format("yml").unwrap();

        assert_eq!(config.parser.path, "./src");
        assert_eq!(config.output.path, "./out");
        assert_eq!(config.output_format(), OutputFormat::Yaml);
    }

    #[test]
    fn test_exclude_paths() {
        let mut config = Config::default();
        config.add_exclude_path("internal");
        config.add_exclude_path("internal");
        config.add_exclude_path("");
        config.remove_exclude_path("vendor");

        assert_eq!(
            config.exclude_paths(),
            &["node_modules", ".git", "test", "tests", "internal"]
        );
    }

    #[test]
    fn test_explicit_empty_exclude_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        for dir in DEFAULT_EXCLUDES {
            config.remove_exclude_path(dir);
        }
        config.save(&path).unwrap();

        assert!(Config::load(&path).unwrap().exclude_paths().is_empty());
    }

    #[test]
    fn test_info_setters() {
        let mut config = Config::default();
        config.set_project_info("Billing", "3.0.0", "invoices");
        config.set_swagger_info("Billing API", "3.0.1", "public surface");

        assert_eq!(config.project.name, "Billing");
        assert_eq!(config.project.version, "3.0.0");
        assert_eq!(config.project.description, "invoices");
        assert_eq!(config.swagger.title, "Billing API");
        assert_eq!(config.swagger.version, "3.0.1");
        assert_eq!(config.swagger.description, "public surface");
        assert!(config.validate().is_ok());

        config.set_swagger_info("", "3.0.1", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_uses_base_path_key() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("basePath: /api/v1"));
        assert!(yaml.contains("max_concurrent: 4"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs").join(CONFIG_FILE_NAME);

        let mut config = Config::new("Shop", "0.3.0", "");
        config.set_swagger_base_path("");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_yaml_applies_field_defaults() {
        let config = Config::from_yaml(
            "project: {name: a, version: '1'}\n\
             parser: {path: ./api}\n\
             output: {path: ./docs, format: yaml}\n\
             swagger: {title: A, version: '1'}\n",
        )
        .unwrap();

        assert_eq!(config.parser.max_concurrent, 4);
        assert_eq!(config.parser.exclude, vec!["vendor", "node_modules", ".git", "test", "tests"]);
        assert!(config.swagger.base_path.is_empty());
        assert!(config.validate().is_ok());
    }
}
