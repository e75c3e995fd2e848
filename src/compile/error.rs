//! Compilation-specific error types

use crate::GantryError;

/// Compilation-specific errors
#[derive(Debug)]
pub enum CompileError {
    /// Underlying project error (configuration or I/O)
    Project(GantryError),
    /// Source discovery error
    Source(String),
    /// Two models in the same package share a name
    DuplicateModel {
        name: String,
        package: String,
        paths: Vec<String>,
    },
    /// ref() names a model that does not exist
    ModelNotFound {
        name: String,
        package: Option<String>,
    },
    /// Unqualified ref() matches models in several packages
    AmbiguousModel { name: String, packages: Vec<String> },
    /// ref() names a model that is disabled
    DisabledModelRef { model: String, referenced: String },
    /// ref() call that does not match a recognized form
    MalformedRef(String),
    /// Model file stem is not usable as an identifier
    InvalidModelName(String),
    /// Contradictory model configuration
    InvalidConfig { model: String, reason: String },
    /// Dependency cycle between models
    CircularDependency(Vec<String>),
    /// Failed to write a compiled artifact
    WriteFailed { path: String, detail: String },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Project(e) => write!(f, "Project error: {}", e),
            CompileError::Source(msg) => write!(f, "Source discovery error: {}", msg),
            CompileError::DuplicateModel {
                name,
                package,
                paths,
            } => {
                write!(
                    f,
                    "Found multiple models named '{}' in package '{}':\n  - {}\n\
                     Model names must be unique within a package.",
                    name,
                    package,
                    paths.join("\n  - ")
                )
            }
            CompileError::ModelNotFound { name, package } => match package {
                Some(package) => {
                    write!(
                        f,
                        "No model named '{}' in package '{}'.\n\
                         Suggestion: Check the ref() spelling and the package name",
                        name, package
                    )
                }
                None => {
                    write!(
                        f,
                        "No model named '{}' in any package.\n\
                         Suggestion: Check the ref() spelling or add the model file",
                        name
                    )
                }
            },
            CompileError::AmbiguousModel { name, packages } => {
                write!(
                    f,
                    "Model reference '{}' is ambiguous: found in packages {}.\n\
                     Suggestion: Use the two-argument form ref('<package>', '{}')",
                    name,
                    packages.join(", "),
                    name
                )
            }
            CompileError::DisabledModelRef { model, referenced } => {
                write!(
                    f,
                    "Model '{}' references '{}', which is disabled.\n\
                     Suggestion: Enable '{}' in the project file or remove the ref()",
                    model, referenced, referenced
                )
            }
            CompileError::MalformedRef(snippet) => {
                write!(
                    f,
                    "Malformed ref() near: {}\n\
                     Suggestion: Use {{{{ ref('model') }}}} or {{{{ ref('package', 'model') }}}} \
                     with quoted arguments",
                    snippet
                )
            }
            CompileError::InvalidModelName(name) => {
                write!(
                    f,
                    "Invalid model name '{}': file stems must start with a letter or \
                     underscore and contain only letters, digits and underscores",
                    name
                )
            }
            CompileError::InvalidConfig { model, reason } => {
                write!(f, "Invalid configuration for model '{}': {}", model, reason)
            }
            CompileError::CircularDependency(models) => {
                write!(
                    f,
                    "Circular dependency detected between models: {}",
                    models.join(", ")
                )
            }
            CompileError::WriteFailed { path, detail } => {
                write!(f, "Failed to write artifact {}: {}", path, detail)
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<GantryError> for CompileError {
    fn from(error: GantryError) -> Self {
        CompileError::Project(error)
    }
}
