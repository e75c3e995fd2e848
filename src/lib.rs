//! # Gantry
//!
//! SQL model compiler: turns a project of `SELECT` statements into ordered,
//! executable DDL for the configured warehouse engine.
//!
//! Models reference each other with `{{ ref('name') }}`; gantry resolves the
//! references, orders the models dependencies-first, and emits one statement
//! artifact per model plus a dependency graph and manifest.

pub mod compile;
pub mod config;
pub mod engine;
pub mod error;
pub mod relation;

pub use compile::{CompileError, Compiler};
pub use config::{ProjectConfig, TargetProfile};
pub use engine::{Engine, TableCreator};
pub use error::GantryError;
pub use relation::{Quoting, Relation};
