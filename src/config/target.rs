//! Target profile: the ambient warehouse connection settings
//!
//! The profile names the engine, the default database/schema that compiled
//! relations are qualified with, and the identifier quoting policy. It is
//! ambient configuration: models never declare it, and the compiler threads
//! it through explicitly rather than reading it from global state.

use crate::engine::Engine;
use crate::error::GantryError;
use crate::relation::{quote_ident, Quoting};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Target profile file name, resolved against the project directory
pub const TARGET_FILE: &str = "target.toml";

/// Environment variable prefix for profile overrides
/// (e.g. `GANTRY__TARGET__SCHEMA=staging`)
const ENV_PREFIX: &str = "GANTRY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetProfile {
    pub engine: Engine,
    pub database: Option<String>,
    /// Default schema for compiled relations and for session schema routing.
    /// May be left empty; compilation does not pre-validate it.
    pub schema: String,
    pub quoting: Quoting,
}

impl Default for TargetProfile {
    fn default() -> Self {
        TargetProfile {
            engine: Engine::default(),
            database: None,
            schema: String::new(),
            quoting: Quoting::default(),
        }
    }
}

impl TargetProfile {
    /// Load the target profile from `<project_dir>/target.toml`, overlaying
    /// `GANTRY__TARGET__*` environment variables. Both sources are optional;
    /// with neither present the default profile is returned.
    pub fn load(project_dir: &Path) -> Result<Self, GantryError> {
        let file = project_dir.join(TARGET_FILE);

        // Build configuration by reading the TOML file (optional) and environment variables
        let builder = Config::builder()
            .add_source(File::from(file.clone()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        // Try to build the configuration, handling an unreadable file
        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // If the file existed but was unreadable (parse error, permission issue, etc.), warn and retry with env only
                if file.exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        file.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<TargetProfile>("target") {
            Ok(profile) => Ok(profile),
            // Neither file section nor env vars present: run with defaults
            Err(ConfigError::NotFound(_)) => Ok(TargetProfile::default()),
            Err(e) => Err(GantryError::Config(format!(
                "Target profile could not be loaded from file or environment: {}",
                e
            ))),
        }
    }

    /// The default schema rendered per the profile's quoting policy, ready
    /// to splice into a statement.
    pub fn default_schema_rendered(&self) -> String {
        if self.quoting.schema {
            quote_ident(&self.schema)
        } else {
            self.schema.clone()
        }
    }
}
