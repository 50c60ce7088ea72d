//! Configuration file loading and validation
//!
//! ```yaml
//! dsn: postgres://localhost/app
//! schemas:
//!   public:
//!     include_views: true
//!     ignore: [schema_migrations]
//!     output:
//!       dest: src/db
//!       package: crate::db
//!       emit_serialization_tags: true
//! ```

use crate::error::{GenError, Result};
use indexmap::IndexMap;
use pggen_schema::codegen::GenerationOptions;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dsn: String,
    /// Schemas in declaration order
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default, alias = "includeViews")]
    pub include_views: bool,
    #[serde(default)]
    pub ignore: Vec<String>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dest: PathBuf,
    #[serde(default)]
    pub package: String,
    #[serde(default, alias = "emitSerializationTags")]
    pub emit_serialization_tags: bool,
}

impl OutputConfig {
    fn validate(&self, schema: &str) -> Result<()> {
        if self.dest.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(GenError::Configuration(format!(
                "$.schemas.{}.output.dest must be present and not be blank",
                schema
            )));
        }

        if self.package.trim().is_empty() {
            return Err(GenError::Configuration(format!(
                "$.schemas.{}.output.package must be present and not be blank",
                schema
            )));
        }

        if syn::parse_str::<syn::Path>(self.package.trim()).is_err() {
            return Err(GenError::Configuration(format!(
                "$.schemas.{}.output.package must be a Rust module path, got [{}]",
                schema, self.package
            )));
        }

        Ok(())
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::new(self.package.trim())
            .with_serialization_tags(self.emit_serialization_tags)
    }
}

impl SchemaConfig {
    fn validate(&self, name: &str) -> Result<()> {
        match &self.output {
            Some(output) => output.validate(name),
            None => Err(GenError::Configuration(format!(
                "$.schemas.{}.output must be present",
                name
            ))),
        }
    }

    /// Case-insensitive match against the ignore list
    pub fn should_ignore(&self, relation: &str) -> bool {
        let relation = relation.to_lowercase();
        self.ignore
            .iter()
            .any(|ignored| ignored.to_lowercase() == relation)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.dsn.trim().is_empty() {
            return Err(GenError::Configuration(
                "$.dsn must be present and not be blank".to_string(),
            ));
        }

        if self.schemas.is_empty() {
            return Err(GenError::Configuration(
                "$.schemas must be present and not be empty".to_string(),
            ));
        }

        // Schemas writing to the same dest share one support module, and so
        // one package path.
        let mut packages: HashMap<&Path, (&str, &str)> = HashMap::new();
        for (name, schema) in &self.schemas {
            schema.validate(name)?;

            if let Some(output) = &schema.output {
                let package = output.package.trim();
                let (first, shared) = *packages
                    .entry(output.dest.as_path())
                    .or_insert((name.as_str(), package));
                if shared != package {
                    return Err(GenError::Configuration(format!(
                        "$.schemas.{}.output.package must be [{}] to share dest [{}] with schema [{}]",
                        name,
                        shared,
                        output.dest.display(),
                        first
                    )));
                }
            }
        }

        Ok(())
    }

    /// Load and validate a JSON (`.json`) or YAML (`.yaml`, `.yml`) file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Configuration(format!("failed to read file [{}]: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        let config: Config = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                GenError::Configuration(format!(
                    "failed to decode file [{}] as JSON: {}",
                    path.display(),
                    e
                ))
            })?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                GenError::Configuration(format!(
                    "failed to decode file [{}] as YAML: {}",
                    path.display(),
                    e
                ))
            })?,
            _ => {
                return Err(GenError::Configuration(format!(
                    "[{}] must be a JSON (.json) or YAML (.yaml, .yml) file",
                    path.display()
                )))
            }
        };

        config.validate()?;
        log::debug!(
            "Loaded configuration from [{}] with {} schema(s)",
            path.display(),
            config.schemas.len()
        );
        Ok(config)
    }
}
