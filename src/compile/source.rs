//! Model source discovery
//!
//! Walks a source directory for `.sql` files and captures their content and
//! checksum. Discovery is per-directory; attaching sources to a package is
//! the compiler's job.

use crate::compile::error::CompileError;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Names must be usable as bare SQL identifiers
static VALID_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"));

/// Directories never descended into during discovery
const SKIP_DIRS: &[&str] = &["target", "node_modules"];

/// Whether `name` is acceptable as a model or project name
pub fn is_valid_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

/// Represents a discovered model source file
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Model name, taken from the file stem
    pub name: String,

    /// Full path to the source file
    pub path: PathBuf,

    /// Path relative to the source directory it was found under
    pub rel_path: PathBuf,

    /// Raw SQL content with refs still unresolved
    pub raw_sql: String,

    /// SHA-256 checksum of the file content
    pub checksum: String,
}

/// Calculate the SHA-256 checksum of model source text
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();
    format!("{:x}", hash)
}

/// Discover all model sources under a directory
///
/// Scans `source_dir` recursively for `.sql` files, skipping hidden
/// directories and build output. A missing directory yields an empty list;
/// a file whose stem is not a valid identifier is an error.
///
/// Results are sorted by relative path so discovery order is deterministic.
pub fn discover_sources(source_dir: &Path) -> Result<Vec<ModelSource>, CompileError> {
    if !source_dir.exists() {
        log::warn!("Source directory does not exist: {}", source_dir.display());
        return Ok(Vec::new());
    }

    if !source_dir.is_dir() {
        return Err(CompileError::Source(format!(
            "Source path is not a directory: {}",
            source_dir.display()
        )));
    }

    let mut sources = Vec::new();
    walk_dir(source_dir, source_dir, &mut sources)?;

    sources.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    Ok(sources)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    sources: &mut Vec<ModelSource>,
) -> Result<(), CompileError> {
    let entries = fs::read_dir(current).map_err(|e| {
        CompileError::Source(format!(
            "Failed to read source directory {}: {}",
            current.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            CompileError::Source(format!("Failed to read directory entry: {}", e))
        })?;

        let path = entry.path();

        if path.is_dir() {
            let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if dir_name.starts_with('.') || SKIP_DIRS.contains(&dir_name) {
                continue;
            }
            walk_dir(root, &path, sources)?;
            continue;
        }

        // Only process .sql files
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CompileError::Source(format!("Invalid filename: {}", path.display()))
            })?
            .to_string();

        if !is_valid_name(&name) {
            return Err(CompileError::InvalidModelName(name));
        }

        let raw_sql = fs::read_to_string(&path).map_err(|e| {
            CompileError::Source(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let checksum = calculate_checksum(&raw_sql);

        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_path_buf();

        sources.push(ModelSource {
            name,
            path,
            rel_path,
            raw_sql,
            checksum,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_model(dir: &Path, rel: &str, sql: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, sql).unwrap();
    }

    #[test]
    fn test_discovers_sql_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "orders.sql", "SELECT 1");
        write_model(dir.path(), "staging/stg_orders.sql", "SELECT 2");
        write_model(dir.path(), "README.md", "not a model");

        let sources = discover_sources(dir.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "orders");
        assert_eq!(sources[0].rel_path, PathBuf::from("orders.sql"));
        assert_eq!(sources[1].name, "stg_orders");
        assert_eq!(sources[1].rel_path, PathBuf::from("staging/stg_orders.sql"));
        assert_eq!(sources[1].raw_sql, "SELECT 2");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sources = discover_sources(&dir.path().join("missing")).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), ".cache/hidden.sql", "SELECT 1");
        write_model(dir.path(), "target/built.sql", "SELECT 1");
        write_model(dir.path(), "orders.sql", "SELECT 1");

        let sources = discover_sources(dir.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "orders");
    }

    #[test]
    fn test_rejects_invalid_model_name() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), "bad-name.sql", "SELECT 1");

        let err = discover_sources(dir.path()).unwrap_err();
        match err {
            CompileError::InvalidModelName(name) => assert_eq!(name, "bad-name"),
            other => panic!("Expected InvalidModelName, got: {:?}", other),
        }
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(
            calculate_checksum("SELECT 1"),
            calculate_checksum("SELECT 1")
        );
        assert_ne!(
            calculate_checksum("SELECT 1"),
            calculate_checksum("SELECT 2")
        );
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("orders"));
        assert!(is_valid_name("_orders"));
        assert!(is_valid_name("orders_v2"));
        assert!(!is_valid_name("2orders"));
        assert!(!is_valid_name("bad-name"));
        assert!(!is_valid_name("bad name"));
        assert!(!is_valid_name(""));
    }
}
