//! Model compilation pipeline
//!
//! Everything between a directory of `.sql` sources and a target directory
//! of executable statement artifacts: discovery, configuration merging,
//! ref() resolution, dependency ordering, statement emission, and artifact
//! writing.

pub mod compiler;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod model;
pub mod refs;
pub mod source;

pub use compiler::{
    artifact_body, validate_unique_names, CompileOutput, CompileSummary, CompiledAnalysis,
    CompiledModel, Compiler,
};
pub use error::CompileError;
pub use graph::DependencyGraph;
pub use manifest::{Manifest, ManifestEntry};
pub use model::{find_model, Materialization, Model, ModelConfig, ModelConfigPatch};
pub use refs::{extract_refs, render_refs, RefCall};
pub use source::{calculate_checksum, discover_sources, is_valid_name, ModelSource};

/// Subdirectory of the target directory holding model artifacts
pub const BUILD_DIR: &str = "build";

/// Subdirectory of the target directory holding compiled analyses
pub const ANALYSIS_DIR: &str = "analysis";

/// Dependency graph artifact name
pub const GRAPH_FILE: &str = "graph-build.json";

/// Manifest artifact name
pub const MANIFEST_FILE: &str = "manifest.json";
