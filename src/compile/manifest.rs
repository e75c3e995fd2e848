//! Compile manifest
//!
//! A JSON summary of everything a compile produced: one entry per model in
//! execution order, plus the target settings the statements were rendered
//! against. Each run gets a fresh invocation id and timestamp.

use crate::compile::compiler::CompiledModel;
use crate::compile::model::Materialization;
use crate::config::{ProjectConfig, TargetProfile};
use crate::engine::Engine;
use crate::error::GantryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: String,
    pub invocation_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub engine: Engine,
    pub database: Option<String>,
    pub schema: String,
    pub models: Vec<ManifestEntry>,
}

/// One compiled model in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub package: String,
    pub fqn: String,
    pub materialized: Materialization,
    pub temporary: bool,
    pub checksum: String,
    /// Artifact path relative to the target directory
    pub build_path: String,
    /// Fully qualified names of direct dependencies
    pub depends_on: Vec<String>,
}

impl Manifest {
    /// Build a manifest for one compile run. `models` must already be in
    /// execution order.
    pub fn new(
        project: &ProjectConfig,
        target: &TargetProfile,
        models: &[CompiledModel],
    ) -> Self {
        Manifest {
            project: project.name.clone(),
            invocation_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            engine: target.engine,
            database: target.database.clone(),
            schema: target.schema.clone(),
            models: models.iter().map(ManifestEntry::from_compiled).collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), GantryError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ManifestEntry {
    fn from_compiled(model: &CompiledModel) -> Self {
        ManifestEntry {
            name: model.name.clone(),
            package: model.package.clone(),
            fqn: model.fqn.clone(),
            materialized: model.materialized,
            temporary: model.temporary,
            checksum: model.checksum.clone(),
            build_path: model.build_path.to_string_lossy().to_string(),
            depends_on: model.depends_on.clone(),
        }
    }
}
