//! Human-readable output formatting

use gantry::compile::Materialization;
use std::path::Path;

/// Render `path` relative to `base` when possible, falling back to the full
/// path. Keeps output short when artifacts live under the project directory.
pub fn display_path(path: &Path, base: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Count with a naively pluralized noun: "1 model", "3 models"
pub fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Short label for how a model materializes
pub fn materialization_label(materialized: Materialization, temporary: bool) -> &'static str {
    match (materialized, temporary) {
        (Materialization::View, _) => "view",
        (Materialization::Table, false) => "table",
        (Materialization::Table, true) => "temporary table",
    }
}
