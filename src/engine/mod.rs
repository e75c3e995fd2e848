//! Engine dialects and statement creation
//!
//! Each supported engine maps to a [`TableCreator`] assembled from the same
//! small set of parts: the generic creator, optional dialect extensions, and
//! the session schema router for engines that need it. Engine quirks are
//! expressed as capability flags on [`Engine`], so the dispatch stays
//! declarative.

pub mod creator;
pub mod generic;
pub mod redshift;
pub mod router;

pub use creator::TableCreator;
pub use generic::GenericCreator;
pub use redshift::RedshiftCreator;
pub use router::SessionSchemaRouter;

use crate::compile::model::ModelConfig;
use crate::config::TargetProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported warehouse engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Postgres,
    Redshift,
    Snowflake,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::Redshift => "redshift",
            Engine::Snowflake => "snowflake",
        }
    }

    /// Whether the engine ignores qualifiers on temporary objects and places
    /// them in a session-specific schema instead.
    pub fn places_temp_objects_in_session_schema(&self) -> bool {
        matches!(self, Engine::Snowflake)
    }

    /// Build the statement creator for one model on this engine.
    ///
    /// `config` supplies per-model storage settings (Redshift dist/sort);
    /// `target` supplies the quoting policy and the default schema used by
    /// the session router.
    pub fn creator(&self, target: &TargetProfile, config: &ModelConfig) -> Box<dyn TableCreator> {
        let base: Box<dyn TableCreator> = match self {
            Engine::Redshift => Box::new(RedshiftCreator::new(
                target.quoting,
                config.sort.clone(),
                config.dist.clone(),
            )),
            _ => Box::new(GenericCreator::new(target.quoting)),
        };
        if self.places_temp_objects_in_session_schema() {
            Box::new(SessionSchemaRouter::new(
                base,
                target.default_schema_rendered(),
            ))
        } else {
            base
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;

    fn profile(engine: Engine, schema: &str) -> TargetProfile {
        TargetProfile {
            engine,
            schema: schema.to_string(),
            ..TargetProfile::default()
        }
    }

    #[test]
    fn test_postgres_temporary_has_no_schema_set() {
        let target = profile(Engine::Postgres, "staging");
        let creator = Engine::Postgres.creator(&target, &ModelConfig::default());
        let statements = creator.create_table_as(true, &Relation::bare("t"), "SELECT 1");
        assert_eq!(
            statements,
            vec!["CREATE TEMPORARY TABLE t AS (SELECT 1)".to_string()]
        );
    }

    #[test]
    fn test_snowflake_temporary_sets_session_schema() {
        let target = profile(Engine::Snowflake, "staging");
        let creator = Engine::Snowflake.creator(&target, &ModelConfig::default());
        let statements = creator.create_table_as(true, &Relation::bare("t"), "SELECT 1");
        assert_eq!(
            statements,
            vec![
                "USE SCHEMA staging".to_string(),
                "CREATE TEMPORARY TABLE t AS (SELECT 1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_snowflake_permanent_matches_generic() {
        let target = profile(Engine::Snowflake, "staging");
        let creator = Engine::Snowflake.creator(&target, &ModelConfig::default());
        let statements = creator.create_table_as(
            false,
            &Relation::with_schema("analytics", "orders"),
            "SELECT 1",
        );
        assert_eq!(
            statements,
            vec!["CREATE TABLE analytics.orders AS (SELECT 1)".to_string()]
        );
    }

    #[test]
    fn test_redshift_uses_storage_qualifiers() {
        let target = profile(Engine::Redshift, "public");
        let config = ModelConfig {
            sort: vec!["created_at".to_string()],
            dist: Some("customer_id".to_string()),
            ..ModelConfig::default()
        };
        let creator = Engine::Redshift.creator(&target, &config);
        let statements = creator.create_table_as(false, &Relation::bare("orders"), "SELECT 1");
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE orders DISTKEY (customer_id) SORTKEY (created_at) AS (SELECT 1)"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(Engine::Postgres.name(), "postgres");
        assert_eq!(Engine::Redshift.name(), "redshift");
        assert_eq!(Engine::Snowflake.name(), "snowflake");
    }

    #[test]
    fn test_only_snowflake_routes_session_schema() {
        assert!(!Engine::Postgres.places_temp_objects_in_session_schema());
        assert!(!Engine::Redshift.places_temp_objects_in_session_schema());
        assert!(Engine::Snowflake.places_temp_objects_in_session_schema());
    }

    #[test]
    fn test_engine_deserializes_from_lowercase() {
        #[derive(serde::Deserialize)]
        struct Holder {
            engine: Engine,
        }
        let holder: Holder = toml::from_str("engine = \"snowflake\"").unwrap();
        assert_eq!(holder.engine, Engine::Snowflake);
    }
}
