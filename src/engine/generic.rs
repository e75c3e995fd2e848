//! Generic create-as-select emission
//!
//! The baseline dialect shared by every engine: a single CTAS or
//! CREATE VIEW statement with the defining query in parentheses.

use crate::engine::creator::{table_keyword, TableCreator};
use crate::relation::{Quoting, Relation};

/// Creator producing plain ANSI-style `CREATE ... AS (...)` statements
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCreator {
    quoting: Quoting,
}

impl GenericCreator {
    pub fn new(quoting: Quoting) -> Self {
        GenericCreator { quoting }
    }
}

impl TableCreator for GenericCreator {
    fn create_table_as(&self, temporary: bool, relation: &Relation, query: &str) -> Vec<String> {
        vec![format!(
            "{} {} AS ({})",
            table_keyword(temporary),
            relation.render(&self.quoting),
            query
        )]
    }

    fn create_view_as(&self, relation: &Relation, query: &str) -> Vec<String> {
        vec![format!(
            "CREATE VIEW {} AS ({})",
            relation.render(&self.quoting),
            query
        )]
    }
}
