//! Graph Coloring
//!
//! Simplify/select coloring in the Kempe style. Registers below
//! `min_register` belong to `this` and the parameters, so colors start at
//! `min_register` and a budget of `k` registers leaves `k - min_register`
//! colors for everything else.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;

use super::interference::InterferenceGraph;

/// Variable name to register index
pub type Coloring = BTreeMap<String, u32>;

/// Colors one interference graph under a range of register budgets
pub struct GraphColoring<'g> {
    graph: &'g InterferenceGraph,
    /// Names left out of coloring; they keep their fixed slots
    precolored: FxHashSet<String>,
    min_register: u32,
}

impl<'g> GraphColoring<'g> {
    pub fn new(
        graph: &'g InterferenceGraph,
        precolored: FxHashSet<String>,
        min_register: u32,
    ) -> Self {
        Self {
            graph,
            precolored,
            min_register,
        }
    }

    pub fn min_register(&self) -> u32 {
        self.min_register
    }

    /// Nodes taking part in coloring
    pub fn node_count(&self) -> usize {
        self.graph
            .nodes()
            .filter(|n| !self.precolored.contains(*n))
            .count()
    }

    /// Try to color with `k` total registers.
    ///
    /// Returns `None` when simplify gets stuck.
    pub fn color(&self, k: u32) -> Option<Coloring> {
        let limit = k.saturating_sub(self.min_register) as usize;

        let mut remaining: BTreeSet<&str> = self
            .graph
            .nodes()
            .filter(|n| !self.precolored.contains(*n))
            .collect();
        let mut stack: Vec<&str> = Vec::with_capacity(remaining.len());

        // Simplify
        while !remaining.is_empty() {
            let snapshot: Vec<&str> = remaining.iter().copied().collect();
            let mut progressed = false;
            for node in snapshot {
                let degree = self
                    .graph
                    .neighbors(node)
                    .filter(|n| remaining.contains(n))
                    .count();
                if degree < limit {
                    remaining.remove(node);
                    stack.push(node);
                    progressed = true;
                }
            }
            if !progressed {
                return None;
            }
        }

        // Select
        let mut coloring = Coloring::new();
        while let Some(node) = stack.pop() {
            let used: FxHashSet<u32> = self
                .graph
                .neighbors(node)
                .filter_map(|n| coloring.get(n).copied())
                .collect();
            let mut color = self.min_register;
            while used.contains(&color) {
                color += 1;
            }
            if color >= k {
                return None;
            }
            coloring.insert(node.to_string(), color);
        }

        Some(coloring)
    }

    /// Smallest `k` in `[min_register, min_register + nodes + 1]` that
    /// colors, with its coloring
    pub fn minimum(&self) -> Option<(u32, Coloring)> {
        let upper = self.min_register + self.node_count() as u32 + 1;
        (self.min_register..=upper).find_map(|k| self.color(k).map(|c| (k, c)))
    }
}
