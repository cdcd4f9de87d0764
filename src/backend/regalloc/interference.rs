//! Interference Graph
//!
//! Two variables interfere when one is written while the other is still
//! live: for every instruction `n` and every `v ∈ DEF(n)`, an edge `v–u` is
//! added for each `u ∈ OUT(n)` other than `v` itself.

use super::liveness::LivenessInfo;
use crate::backend::ir::Method;
use std::collections::{BTreeMap, BTreeSet};

/// Conflict graph over the variables of one method
#[derive(Clone, Debug, Default)]
pub struct InterferenceGraph<'m> {
    /// Adjacency list: variable -> set of interfering variables
    pub edges: BTreeMap<&'m str, BTreeSet<&'m str>>,
    /// Variables whose slot is fixed before coloring (receiver, parameters)
    pub precolored: BTreeSet<&'m str>,
}

impl<'m> InterferenceGraph<'m> {
    /// Build the interference graph of a method from its liveness info
    ///
    /// Every descriptor of the method becomes a node, even when it never
    /// conflicts with anything.
    pub fn build(method: &'m Method, liveness: &LivenessInfo<'m>) -> Self {
        let mut graph = InterferenceGraph::default();

        for descriptor in method.var_table.iter() {
            graph.edges.entry(descriptor.name.as_str()).or_default();
            if descriptor.scope.is_precolored() {
                graph.precolored.insert(descriptor.name.as_str());
            }
        }

        for id in method.ids() {
            for &def in liveness.defs(id) {
                for &live in liveness.live_out(id) {
                    graph.add_edge(def, live);
                }
            }
        }

        graph
    }

    /// Add an edge between two variables; self edges are ignored
    pub fn add_edge(&mut self, a: &'m str, b: &'m str) {
        if a == b {
            return;
        }
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    pub fn interferes(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|s| s.contains(b))
    }

    /// Get neighbors of a variable
    pub fn neighbors(&self, var: &str) -> impl Iterator<Item = &'m str> + '_ {
        self.edges
            .get(var)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    /// Get the degree (number of neighbors) of a variable
    pub fn degree(&self, var: &str) -> usize {
        self.edges.get(var).map_or(0, |s| s.len())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'m str> + '_ {
        self.edges.keys().copied()
    }

    pub fn is_precolored(&self, var: &str) -> bool {
        self.precolored.contains(var)
    }
}
