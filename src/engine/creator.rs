//! `TableCreator` trait - the statement emission seam
//!
//! Everything that turns a model into DDL goes through this trait, so engine
//! quirks can be layered on by wrapping one creator in another without the
//! inner creator knowing.

use crate::relation::Relation;

/// Emits the ordered SQL statements that materialize a query result.
///
/// Implementations must be pure: the same inputs always produce the same
/// statements, and emitting them performs no I/O.
pub trait TableCreator {
    /// Statements that create `relation` as a table holding the result of
    /// `query`. `temporary` requests a session-scoped table.
    fn create_table_as(&self, temporary: bool, relation: &Relation, query: &str) -> Vec<String>;

    /// Statements that create `relation` as a view over `query`.
    fn create_view_as(&self, relation: &Relation, query: &str) -> Vec<String>;
}

/// DDL keyword for a table creation, honoring the temporary flag
pub(crate) fn table_keyword(temporary: bool) -> &'static str {
    if temporary {
        "CREATE TEMPORARY TABLE"
    } else {
        "CREATE TABLE"
    }
}
