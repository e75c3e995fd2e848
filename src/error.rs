//! Root error type shared across the crate
//!
//! Compilation-specific failures live in [`crate::compile::CompileError`];
//! this type covers the concerns underneath it (filesystem access and
//! configuration resolution).

use std::fmt;

/// Gantry error type
#[derive(Debug)]
pub enum GantryError {
    /// Filesystem error while reading sources or writing artifacts
    Io(std::io::Error),
    /// Configuration error from the project file or target profile
    Config(String),
    /// Other errors
    Other(String),
}

impl fmt::Display for GantryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GantryError::Io(e) => {
                write!(f, "I/O error: {e}")
            }
            GantryError::Config(s) => {
                write!(f, "Configuration error: {s}")
            }
            GantryError::Other(s) => {
                write!(f, "Error: {s}")
            }
        }
    }
}

impl std::error::Error for GantryError {}

impl From<std::io::Error> for GantryError {
    fn from(err: std::io::Error) -> Self {
        GantryError::Io(err)
    }
}

impl From<config::ConfigError> for GantryError {
    fn from(err: config::ConfigError) -> Self {
        GantryError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GantryError {
    fn from(err: serde_json::Error) -> Self {
        GantryError::Other(format!("JSON serialization error: {err}"))
    }
}
