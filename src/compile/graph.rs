//! Model dependency graph
//!
//! Tracks which models depend on which, produces a dependencies-first
//! ordering, and round-trips through the graph artifact written alongside
//! compiled models. Ordered collections keep every traversal deterministic,
//! so repeated compiles write identical artifacts.

use crate::compile::error::CompileError;
use crate::error::GantryError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Dependency graph over fully qualified model names
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// node -> the nodes it depends on
    edges: BTreeMap<String, BTreeSet<String>>,
}

/// Serialized form of the graph artifact
#[derive(Debug, Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<String>,
    /// (node, depends_on) pairs
    edges: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, node: &str) {
        self.edges.entry(node.to_string()).or_default();
    }

    /// Record that `node` depends on `depends_on`. Both endpoints are added
    /// as nodes.
    pub fn add_dependency(&mut self, node: &str, depends_on: &str) {
        self.add_node(depends_on);
        self.edges
            .entry(node.to_string())
            .or_default()
            .insert(depends_on.to_string());
    }

    pub fn nodes(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Direct dependencies of `node`, sorted.
    pub fn dependencies_of(&self, node: &str) -> Vec<String> {
        self.edges
            .get(node)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Topological ordering: dependencies first, dependents last.
    ///
    /// Ties break alphabetically so the ordering is stable across runs. A
    /// cycle is reported with its (sorted) member nodes; nodes that are
    /// merely stuck behind the cycle are not named.
    pub fn dependency_order(&self) -> Result<Vec<String>, CompileError> {
        // Build reverse edges and in-degrees: if A depends on B, then B has A as a dependent
        let mut reverse: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();

        for (node, deps) in &self.edges {
            in_degree.insert(node, deps.len());
            reverse.entry(node).or_default();
        }
        for (node, deps) in &self.edges {
            for dep in deps {
                reverse.entry(dep.as_str()).or_default().push(node);
            }
        }

        // Nodes with no dependencies can be built first
        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();

        let mut result = Vec::with_capacity(self.edges.len());

        while let Some(current) = ready.pop_first() {
            result.push(current.to_string());

            if let Some(dependents) = reverse.get(current) {
                for &dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(dependent);
                        }
                    }
                }
            }
        }

        if result.len() != self.edges.len() {
            let remaining: BTreeSet<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(node, _)| *node)
                .collect();
            return Err(CompileError::CircularDependency(
                self.cycle_members(&remaining),
            ));
        }

        Ok(result)
    }

    /// Narrow the unordered leftovers of a failed ordering down to the nodes
    /// that actually sit on a cycle: those that can reach themselves through
    /// other unordered nodes.
    fn cycle_members(&self, remaining: &BTreeSet<&str>) -> Vec<String> {
        let mut members = Vec::new();
        for &node in remaining {
            let mut pending = vec![node];
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            let mut cyclic = false;
            'walk: while let Some(current) = pending.pop() {
                if let Some(deps) = self.edges.get(current) {
                    for dep in deps {
                        let dep = dep.as_str();
                        if !remaining.contains(dep) {
                            continue;
                        }
                        if dep == node {
                            cyclic = true;
                            break 'walk;
                        }
                        if seen.insert(dep) {
                            pending.push(dep);
                        }
                    }
                }
            }
            if cyclic {
                members.push(node.to_string());
            }
        }
        members
    }

    /// Topological ordering restricted to `roots` and their transitive
    /// dependents, dependencies still first.
    ///
    /// Roots missing from the graph are ignored. A cycle anywhere in the
    /// graph is reported, reachable from a root or not.
    pub fn dependency_order_for(
        &self,
        roots: &BTreeSet<String>,
    ) -> Result<Vec<String>, CompileError> {
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (node, deps) in &self.edges {
            for dep in deps {
                dependents.entry(dep.as_str()).or_default().push(node);
            }
        }

        let mut keep: BTreeSet<&str> = BTreeSet::new();
        let mut pending: Vec<&str> = roots
            .iter()
            .map(|root| root.as_str())
            .filter(|root| self.edges.contains_key(*root))
            .collect();
        while let Some(node) = pending.pop() {
            if !keep.insert(node) {
                continue;
            }
            if let Some(nodes) = dependents.get(node) {
                pending.extend(nodes.iter().copied());
            }
        }

        Ok(self
            .dependency_order()?
            .into_iter()
            .filter(|node| keep.contains(node.as_str()))
            .collect())
    }

    /// Write the graph artifact as JSON.
    pub fn write_graph(&self, path: &Path) -> Result<(), GantryError> {
        let file = GraphFile {
            nodes: self.nodes(),
            edges: self
                .edges
                .iter()
                .flat_map(|(node, deps)| {
                    deps.iter().map(move |dep| (node.clone(), dep.clone()))
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a graph artifact written by [`DependencyGraph::write_graph`].
    pub fn read_graph(path: &Path) -> Result<Self, GantryError> {
        let raw = fs::read_to_string(path)?;
        let file: GraphFile = serde_json::from_str(&raw)?;
        let mut graph = DependencyGraph::new();
        for node in &file.nodes {
            graph.add_node(node);
        }
        for (node, dep) in &file.edges {
            graph.add_dependency(node, dep);
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_order_simple_chain() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.orders", "jaffle.stg_orders");
        graph.add_dependency("jaffle.revenue", "jaffle.orders");

        let order = graph.dependency_order().unwrap();
        assert_eq!(
            order,
            vec![
                "jaffle.stg_orders".to_string(),
                "jaffle.orders".to_string(),
                "jaffle.revenue".to_string(),
            ]
        );
    }

    #[test]
    fn test_dependency_order_is_deterministic() {
        let mut graph = DependencyGraph::new();
        graph.add_node("jaffle.c");
        graph.add_node("jaffle.a");
        graph.add_node("jaffle.b");

        let order = graph.dependency_order().unwrap();
        assert_eq!(
            order,
            vec![
                "jaffle.a".to_string(),
                "jaffle.b".to_string(),
                "jaffle.c".to_string(),
            ]
        );
    }

    #[test]
    fn test_dependency_order_diamond() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.top", "jaffle.left");
        graph.add_dependency("jaffle.top", "jaffle.right");
        graph.add_dependency("jaffle.left", "jaffle.base");
        graph.add_dependency("jaffle.right", "jaffle.base");

        let order = graph.dependency_order().unwrap();
        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(position("jaffle.base") < position("jaffle.left"));
        assert!(position("jaffle.base") < position("jaffle.right"));
        assert!(position("jaffle.left") < position("jaffle.top"));
        assert!(position("jaffle.right") < position("jaffle.top"));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.a", "jaffle.b");
        graph.add_dependency("jaffle.b", "jaffle.a");
        graph.add_node("jaffle.c");

        let err = graph.dependency_order().unwrap_err();
        match err {
            CompileError::CircularDependency(nodes) => {
                assert_eq!(nodes, vec!["jaffle.a".to_string(), "jaffle.b".to_string()]);
            }
            other => panic!("Expected CircularDependency, got: {:?}", other),
        }
    }

    #[test]
    fn test_cycle_error_excludes_blocked_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.a", "jaffle.b");
        graph.add_dependency("jaffle.b", "jaffle.a");
        // revenue is stuck behind the cycle but is not part of it
        graph.add_dependency("jaffle.revenue", "jaffle.a");

        let err = graph.dependency_order().unwrap_err();
        match err {
            CompileError::CircularDependency(nodes) => {
                assert_eq!(nodes, vec!["jaffle.a".to_string(), "jaffle.b".to_string()]);
            }
            other => panic!("Expected CircularDependency, got: {:?}", other),
        }
    }

    #[test]
    fn test_dependency_order_for_includes_transitive_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.orders", "jaffle.stg_orders");
        graph.add_dependency("jaffle.revenue", "jaffle.orders");
        graph.add_dependency("jaffle.customers", "jaffle.stg_customers");

        let roots = BTreeSet::from(["jaffle.orders".to_string()]);
        let order = graph.dependency_order_for(&roots).unwrap();
        assert_eq!(
            order,
            vec!["jaffle.orders".to_string(), "jaffle.revenue".to_string()]
        );
    }

    #[test]
    fn test_dependency_order_for_ignores_unknown_roots() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.orders", "jaffle.stg_orders");

        let roots = BTreeSet::from([
            "jaffle.missing".to_string(),
            "jaffle.stg_orders".to_string(),
        ]);
        let order = graph.dependency_order_for(&roots).unwrap();
        assert_eq!(
            order,
            vec!["jaffle.stg_orders".to_string(), "jaffle.orders".to_string()]
        );
    }

    #[test]
    fn test_dependencies_of() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.orders", "jaffle.stg_orders");
        graph.add_dependency("jaffle.orders", "jaffle.stg_payments");

        assert_eq!(
            graph.dependencies_of("jaffle.orders"),
            vec![
                "jaffle.stg_orders".to_string(),
                "jaffle.stg_payments".to_string(),
            ]
        );
        assert!(graph.dependencies_of("jaffle.stg_orders").is_empty());
        assert!(graph.dependencies_of("unknown").is_empty());
    }

    #[test]
    fn test_graph_file_round_trip() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("jaffle.orders", "jaffle.stg_orders");
        graph.add_node("jaffle.lonely");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph-build.json");
        graph.write_graph(&path).unwrap();

        let loaded = DependencyGraph::read_graph(&path).unwrap();
        assert_eq!(loaded.nodes(), graph.nodes());
        assert_eq!(
            loaded.dependencies_of("jaffle.orders"),
            graph.dependencies_of("jaffle.orders")
        );
        assert_eq!(
            loaded.dependency_order().unwrap(),
            graph.dependency_order().unwrap()
        );
    }
}
