//! Session schema routing for temporary tables
//!
//! Some engines place temporary objects in a session-specific schema instead
//! of the schema named on the statement. On those engines an unqualified
//! temporary table would land somewhere later statements cannot predict, so
//! the session must first be pointed at the configured default schema.
//!
//! `SessionSchemaRouter` wraps any [`TableCreator`] and prepends the
//! schema-set statement when (and only when) a temporary table is created.
//! The wrapped creator's statements pass through untouched.

use crate::engine::creator::TableCreator;
use crate::relation::Relation;

/// Decorator that pins the session schema before temporary table creation
pub struct SessionSchemaRouter {
    inner: Box<dyn TableCreator>,
    /// Default schema from the target profile, already rendered per the
    /// profile's quoting policy. May be empty; no validation happens here.
    default_schema: String,
}

impl SessionSchemaRouter {
    pub fn new(inner: Box<dyn TableCreator>, default_schema: impl Into<String>) -> Self {
        SessionSchemaRouter {
            inner,
            default_schema: default_schema.into(),
        }
    }

    /// The statement that points the session at the configured schema.
    ///
    /// Built from ambient configuration only; the relation being created
    /// never contributes to it.
    fn schema_set_statement(&self) -> String {
        format!("USE SCHEMA {}", self.default_schema)
    }
}

impl TableCreator for SessionSchemaRouter {
    fn create_table_as(&self, temporary: bool, relation: &Relation, query: &str) -> Vec<String> {
        let mut statements = Vec::with_capacity(2);
        if temporary {
            statements.push(self.schema_set_statement());
        }
        statements.extend(self.inner.create_table_as(temporary, relation, query));
        statements
    }

    fn create_view_as(&self, relation: &Relation, query: &str) -> Vec<String> {
        self.inner.create_view_as(relation, query)
    }
}
