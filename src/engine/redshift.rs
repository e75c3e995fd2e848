//! Redshift create-as-select emission
//!
//! Extends the generic statement shape with DISTKEY/SORTKEY storage
//! qualifiers, which Redshift accepts between the relation name and `AS`.

use crate::engine::creator::{table_keyword, TableCreator};
use crate::engine::generic::GenericCreator;
use crate::relation::{quote_ident, Quoting, Relation};

/// Creator producing Redshift CTAS statements with storage qualifiers
#[derive(Debug, Clone)]
pub struct RedshiftCreator {
    inner: GenericCreator,
    quoting: Quoting,
    sort: Vec<String>,
    dist: Option<String>,
}

impl RedshiftCreator {
    pub fn new(quoting: Quoting, sort: Vec<String>, dist: Option<String>) -> Self {
        RedshiftCreator {
            inner: GenericCreator::new(quoting),
            quoting,
            sort,
            dist,
        }
    }

    fn render_column(&self, column: &str) -> String {
        if self.quoting.identifier {
            quote_ident(column)
        } else {
            column.to_string()
        }
    }

    /// `DISTKEY (...) SORTKEY (...)` section, or empty when unconfigured
    fn storage_qualifiers(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dist) = &self.dist {
            parts.push(format!("DISTKEY ({})", self.render_column(dist)));
        }
        if !self.sort.is_empty() {
            let columns: Vec<String> = self.sort.iter().map(|c| self.render_column(c)).collect();
            parts.push(format!("SORTKEY ({})", columns.join(", ")));
        }
        parts.join(" ")
    }
}

impl TableCreator for RedshiftCreator {
    fn create_table_as(&self, temporary: bool, relation: &Relation, query: &str) -> Vec<String> {
        let qualifiers = self.storage_qualifiers();
        if qualifiers.is_empty() {
            return self.inner.create_table_as(temporary, relation, query);
        }
        vec![format!(
            "{} {} {} AS ({})",
            table_keyword(temporary),
            relation.render(&self.quoting),
            qualifiers,
            query
        )]
    }

    fn create_view_as(&self, relation: &Relation, query: &str) -> Vec<String> {
        self.inner.create_view_as(relation, query)
    }
}
