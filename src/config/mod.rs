//! Configuration loading
//!
//! Two sources with different shapes: the project file (`gantry.toml`,
//! required, project layout and model settings) and the target profile
//! (`target.toml` plus environment overlay, optional, warehouse settings).

pub mod project;
pub mod target;

pub use project::ProjectConfig;
pub use target::TargetProfile;
