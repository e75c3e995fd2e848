//! Project configuration (`gantry.toml`)
//!
//! The project file names the project, points at its source and output
//! directories, and carries model configuration: a `[model-defaults]` block
//! applied to every model and `[models.<name>]` blocks overriding single
//! models.

use crate::compile::model::{ModelConfig, ModelConfigPatch};
use crate::compile::source::is_valid_name;
use crate::error::GantryError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Project file name, resolved against the project directory
pub const PROJECT_FILE: &str = "gantry.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Project name; doubles as the package name for its models
    pub name: String,
    /// Directories searched for model sources, relative to the project
    #[serde(default = "default_source_paths")]
    pub source_paths: Vec<String>,
    /// Directories searched for analysis sources (compiled but never wrapped
    /// in DDL)
    #[serde(default)]
    pub analysis_paths: Vec<String>,
    /// Output directory for compiled artifacts
    #[serde(default = "default_target_path")]
    pub target_path: String,
    /// Directory holding dependency projects
    #[serde(default = "default_modules_path")]
    pub modules_path: String,
    /// Configuration applied to every model unless overridden
    #[serde(default)]
    pub model_defaults: ModelConfig,
    /// Per-model overrides, keyed by model name
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfigPatch>,
}

fn default_source_paths() -> Vec<String> {
    vec!["models".to_string()]
}

fn default_target_path() -> String {
    "target".to_string()
}

fn default_modules_path() -> String {
    "modules".to_string()
}

impl ProjectConfig {
    /// Load and validate `<project_dir>/gantry.toml`.
    pub fn load(project_dir: &Path) -> Result<Self, GantryError> {
        let path = project_dir.join(PROJECT_FILE);
        if !path.exists() {
            return Err(GantryError::Config(format!(
                "Project file not found: {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(&path)?;
        let project: ProjectConfig = toml::from_str(&raw).map_err(|e| {
            GantryError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        project.validate()?;
        Ok(project)
    }

    fn validate(&self) -> Result<(), GantryError> {
        if !is_valid_name(&self.name) {
            return Err(GantryError::Config(format!(
                "Invalid project name '{}': names must start with a letter or underscore \
                 and contain only letters, digits and underscores",
                self.name
            )));
        }
        Ok(())
    }

    /// Effective configuration for `model_name`: the project defaults with
    /// the model's override block (if any) applied on top.
    pub fn model_config(&self, model_name: &str) -> ModelConfig {
        match self.models.get(model_name) {
            Some(patch) => patch.apply(&self.model_defaults),
            None => self.model_defaults.clone(),
        }
    }

    /// The override block for `model_name`, if one is configured.
    ///
    /// Used when this project is the entry point and needs to override
    /// models defined by dependency projects.
    pub fn model_patch(&self, model_name: &str) -> Option<&ModelConfigPatch> {
        self.models.get(model_name)
    }
}
