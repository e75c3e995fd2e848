//! Relation identifiers and quoting policy
//!
//! A relation is a table or view addressed by name with optional schema and
//! database qualifiers. Rendering applies the per-part quoting policy from
//! the target profile; nothing here validates that the parts exist in the
//! warehouse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-part identifier quoting policy
///
/// Every part defaults to unquoted. Quoted parts are wrapped in ANSI double
/// quotes with embedded quotes doubled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quoting {
    pub database: bool,
    pub schema: bool,
    pub identifier: bool,
}

/// Wrap an identifier in ANSI double quotes, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn render_part(part: &str, quote: bool) -> String {
    if quote {
        quote_ident(part)
    } else {
        part.to_string()
    }
}

/// A database relation: the target of a CREATE TABLE or CREATE VIEW
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub identifier: String,
}

impl Relation {
    pub fn new(
        database: Option<String>,
        schema: Option<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Relation {
            database,
            schema,
            identifier: identifier.into(),
        }
    }

    /// A relation with no qualifiers. Session-scoped objects are addressed
    /// this way: the engine resolves them against the session schema, so a
    /// qualifier would name the wrong object.
    pub fn bare(identifier: impl Into<String>) -> Self {
        Relation::new(None, None, identifier)
    }

    pub fn with_schema(schema: impl Into<String>, identifier: impl Into<String>) -> Self {
        Relation::new(None, Some(schema.into()), identifier)
    }

    /// Render the dotted form with `quoting` applied part by part.
    ///
    /// Absent qualifiers are simply omitted. A database qualifier only
    /// renders together with a schema: bare `database.identifier` would be
    /// read by the engine as schema.identifier.
    pub fn render(&self, quoting: &Quoting) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(schema) = &self.schema {
            if let Some(database) = &self.database {
                parts.push(render_part(database, quoting.database));
            }
            parts.push(render_part(schema, quoting.schema));
        }
        parts.push(render_part(&self.identifier, quoting.identifier));
        parts.join(".")
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&Quoting::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_unquoted_by_default() {
        let relation = Relation::new(
            Some("analytics".to_string()),
            Some("public".to_string()),
            "orders",
        );
        assert_eq!(relation.render(&Quoting::default()), "analytics.public.orders");
    }

    #[test]
    fn test_render_bare_identifier() {
        let relation = Relation::bare("orders_tmp");
        assert_eq!(relation.render(&Quoting::default()), "orders_tmp");
    }

    #[test]
    fn test_render_schema_only() {
        let relation = Relation::with_schema("staging", "orders");
        assert_eq!(relation.render(&Quoting::default()), "staging.orders");
    }

    #[test]
    fn test_render_omits_database_without_schema() {
        let relation = Relation::new(Some("analytics".to_string()), None, "orders");
        assert_eq!(relation.render(&Quoting::default()), "orders");
    }

    #[test]
    fn test_render_quotes_selected_parts() {
        let relation = Relation::new(None, Some("staging".to_string()), "orders");
        let quoting = Quoting {
            database: false,
            schema: false,
            identifier: true,
        };
        assert_eq!(relation.render(&quoting), "staging.\"orders\"");
    }

    #[test]
    fn test_render_quotes_all_parts() {
        let relation = Relation::new(
            Some("analytics".to_string()),
            Some("public".to_string()),
            "orders",
        );
        let quoting = Quoting {
            database: true,
            schema: true,
            identifier: true,
        };
        assert_eq!(relation.render(&quoting), "\"analytics\".\"public\".\"orders\"");
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_display_uses_default_quoting() {
        let relation = Relation::with_schema("raw", "orders");
        assert_eq!(relation.to_string(), "raw.orders");
    }
}
