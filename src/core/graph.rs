//! core::graph
//!
//! Directed relationship graph over entities.
//!
//! # Architecture
//!
//! Nodes are entity names (folded for case-insensitive identity), edges
//! run source -> target per relationship definition. The graph is built
//! fresh from a model for each validation pass; it holds names only,
//! never references into the model.
//!
//! # Invariants
//!
//! - The graph must be acyclic; any cycle (of any length) is a
//!   validation error.

use std::collections::{HashMap, HashSet};

use crate::core::model::Model;
use crate::core::naming::fold;

/// A representative edge of a detected cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEdge {
    /// Source entity (original casing).
    pub source: String,
    /// Target entity (original casing).
    pub target: String,
}

/// The relationship graph derived from a model.
#[derive(Debug, Default)]
pub struct RelationshipGraph {
    /// Folded node name -> original-cased display name.
    display: HashMap<String, String>,
    /// Folded source -> folded targets (insertion order preserved per
    /// source so reports are deterministic).
    edges: HashMap<String, Vec<String>>,
    /// Node visit order, for deterministic traversal.
    order: Vec<String>,
}

impl RelationshipGraph {
    /// Build the graph from a model.
    ///
    /// Edges to unknown targets are still recorded; cycle detection only
    /// follows edges between known nodes, and the unknown-target case is
    /// reported separately by validation.
    pub fn from_model(model: &Model) -> Self {
        let mut graph = Self::default();
        for entity in &model.entities {
            graph.add_node(&entity.name);
        }
        for entity in &model.entities {
            for rel in entity.sorted_relationships() {
                graph.add_edge(&entity.name, &rel.target);
            }
        }
        graph
    }

    fn add_node(&mut self, name: &str) {
        let key = fold(name);
        if !self.display.contains_key(&key) {
            self.display.insert(key.clone(), name.to_string());
            self.order.push(key);
        }
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        let source = fold(source);
        let target = fold(target);
        let targets = self.edges.entry(source).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    /// Find cycles, returning one representative edge per detected cycle.
    ///
    /// Standard DFS back-edge detection: a node on the current path that
    /// is reached again closes a cycle. Cycles of any length are caught;
    /// the two-node case is not special.
    pub fn find_cycles(&self) -> Vec<CycleEdge> {
        let mut visited = HashSet::new();
        let mut path = HashSet::new();
        let mut cycles = Vec::new();

        for node in &self.order {
            self.visit(node, &mut visited, &mut path, &mut cycles);
        }
        cycles
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        path: &mut HashSet<String>,
        cycles: &mut Vec<CycleEdge>,
    ) {
        if visited.contains(node) {
            return;
        }
        visited.insert(node.to_string());
        path.insert(node.to_string());

        if let Some(targets) = self.edges.get(node) {
            for target in targets {
                if !self.display.contains_key(target) {
                    continue;
                }
                if path.contains(target) {
                    cycles.push(CycleEdge {
                        source: self.display[node].clone(),
                        target: self.display[target].clone(),
                    });
                } else {
                    self.visit(target, visited, path, cycles);
                }
            }
        }

        path.remove(node);
    }
}
