//! Interference Graph
//!
//! Tracks which variables are live at the same program point and thus
//! cannot share a register. Every `out ∪ def` set becomes a clique.

use std::collections::{BTreeMap, BTreeSet};

use super::liveness::Liveness;

/// Undirected conflict graph over variable names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterferenceGraph {
    /// Adjacency list: name -> set of interfering names
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl InterferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a liveness result. Every variable the method
    /// defines or uses becomes a node, even without neighbours.
    pub fn build(liveness: &Liveness) -> Self {
        let mut graph = Self::new();
        for i in 0..liveness.len() {
            for name in liveness.uses[i].iter().chain(&liveness.defs[i]) {
                graph.add_node(name);
            }

            let clique: Vec<String> = liveness.out_def(i).into_iter().collect();
            for (a, first) in clique.iter().enumerate() {
                graph.add_node(first);
                for second in &clique[a + 1..] {
                    graph.add_edge(first, second);
                }
            }
        }
        graph
    }

    pub fn add_node(&mut self, name: &str) {
        if !self.edges.contains_key(name) {
            self.edges.insert(name.to_string(), BTreeSet::new());
        }
    }

    /// Adds an interference edge between two variables.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a != b {
            self.edges
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string());
            self.edges
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn interferes(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|set| set.contains(b))
    }

    /// Node names in sorted order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Returns the neighbors (interfering variables) of a variable.
    pub fn neighbors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Returns the degree (number of interferences) of a variable.
    pub fn degree(&self, name: &str) -> usize {
        self.edges.get(name).map_or(0, BTreeSet::len)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
