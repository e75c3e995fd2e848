//! Model types and per-model configuration

use crate::compile::error::CompileError;
use crate::compile::source::ModelSource;
use crate::compile::BUILD_DIR;
use crate::config::TargetProfile;
use crate::relation::Relation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a model is materialized in the warehouse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    #[default]
    Table,
    View,
}

impl Materialization {
    pub fn name(&self) -> &'static str {
        match self {
            Materialization::Table => "table",
            Materialization::View => "view",
        }
    }
}

impl fmt::Display for Materialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Effective configuration for one model after defaults and overrides merge
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub enabled: bool,
    pub materialized: Materialization,
    /// Session-scoped table; only meaningful for table materializations
    pub temporary: bool,
    /// Redshift sort key columns
    pub sort: Vec<String>,
    /// Redshift distribution key column
    pub dist: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            enabled: true,
            materialized: Materialization::Table,
            temporary: false,
            sort: Vec::new(),
            dist: None,
        }
    }
}

impl ModelConfig {
    /// Reject combinations the creators cannot express.
    pub fn validate(&self, model_name: &str) -> Result<(), CompileError> {
        if self.materialized == Materialization::View {
            if self.temporary {
                return Err(CompileError::InvalidConfig {
                    model: model_name.to_string(),
                    reason: "'temporary' applies only to table materializations".to_string(),
                });
            }
            if self.dist.is_some() || !self.sort.is_empty() {
                return Err(CompileError::InvalidConfig {
                    model: model_name.to_string(),
                    reason: "'sort' and 'dist' apply only to table materializations".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Override block for a single model; unset fields inherit the defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfigPatch {
    pub enabled: Option<bool>,
    pub materialized: Option<Materialization>,
    pub temporary: Option<bool>,
    pub sort: Option<Vec<String>>,
    pub dist: Option<String>,
}

impl ModelConfigPatch {
    /// Apply this patch on top of `base`, returning the merged configuration.
    pub fn apply(&self, base: &ModelConfig) -> ModelConfig {
        ModelConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            materialized: self.materialized.unwrap_or(base.materialized),
            temporary: self.temporary.unwrap_or(base.temporary),
            sort: self.sort.clone().unwrap_or_else(|| base.sort.clone()),
            dist: self.dist.clone().or_else(|| base.dist.clone()),
        }
    }
}

/// A model ready for compilation: source plus merged configuration
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    /// Owning package (project name)
    pub package: String,
    /// Path relative to the source directory the model was found under
    pub rel_path: PathBuf,
    pub raw_sql: String,
    pub checksum: String,
    pub config: ModelConfig,
}

impl Model {
    pub fn from_source(source: ModelSource, package: impl Into<String>, config: ModelConfig) -> Self {
        Model {
            name: source.name,
            package: package.into(),
            rel_path: source.rel_path,
            raw_sql: source.raw_sql,
            checksum: source.checksum,
            config,
        }
    }

    /// Fully qualified name: package, source subdirectories, model name.
    pub fn fqn(&self) -> Vec<String> {
        fqn_parts(&self.package, &self.rel_path, &self.name)
    }

    /// Dotted form of [`Model::fqn`], used as the graph node key.
    pub fn fqn_string(&self) -> String {
        self.fqn().join(".")
    }

    /// Artifact path relative to the target directory.
    pub fn build_path(&self) -> PathBuf {
        PathBuf::from(BUILD_DIR)
            .join(&self.package)
            .join(&self.rel_path)
    }

    /// The relation this model materializes into.
    ///
    /// Temporary models get a bare relation: the engine resolves them against
    /// the session schema, so a qualifier would name the wrong object.
    /// Permanent models are qualified with the target's database and schema;
    /// an empty schema is treated as absent.
    pub fn relation(&self, target: &TargetProfile) -> Relation {
        if self.config.temporary {
            return Relation::bare(self.name.clone());
        }
        let schema = if target.schema.is_empty() {
            None
        } else {
            Some(target.schema.clone())
        };
        Relation::new(target.database.clone(), schema, self.name.clone())
    }
}

/// Fully qualified name parts: package, source subdirectories, file stem.
/// Models and analyses are both named this way.
pub(crate) fn fqn_parts(package: &str, rel_path: &Path, name: &str) -> Vec<String> {
    let mut parts = vec![package.to_string()];
    if let Some(parent) = rel_path.parent() {
        for component in parent.components() {
            parts.push(component.as_os_str().to_string_lossy().to_string());
        }
    }
    parts.push(name.to_string());
    parts
}

/// Find a model by name, optionally constrained to a package.
///
/// Without a package constraint the name must be unique across all packages;
/// zero matches and multiple matches are both errors.
pub fn find_model<'a>(
    models: &'a [Model],
    name: &str,
    package: Option<&str>,
) -> Result<&'a Model, CompileError> {
    let matches: Vec<&Model> = models
        .iter()
        .filter(|m| m.name == name && package.map_or(true, |p| m.package == p))
        .collect();

    match matches.len() {
        0 => Err(CompileError::ModelNotFound {
            name: name.to_string(),
            package: package.map(|p| p.to_string()),
        }),
        1 => Ok(matches[0]),
        _ => Err(CompileError::AmbiguousModel {
            name: name.to_string(),
            packages: matches.iter().map(|m| m.package.clone()).collect(),
        }),
    }
}
