//! Register Allocator
//!
//! This module maps the locals of a method onto JVM local-variable slots by
//! coloring its interference graph.
//!
//! # Algorithm
//!
//! Greedy simplify/select coloring over an unbounded register file:
//! 1. Precolor the receiver and the parameters with their fixed slots
//! 2. Simplify: push the remaining nodes onto a stack, lowest degree first
//! 3. Select: pop each node and give it the lowest slot at or above the
//!    first free slot that no already-colored neighbor holds
//!
//! There is no spilling. The number of slots used past the precolored region
//! is checked against the caller's budget instead.

use super::interference::InterferenceGraph;
use super::liveness::{LivenessAnalysis, LivenessInfo};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::ir::{Method, VarTable, VariableDescriptor};
use std::collections::{BTreeMap, BTreeSet};

/// Result of register allocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Descriptor table with the new slots
    pub var_table: VarTable,
    /// Number of slots used beyond the receiver and parameters
    pub extra_registers: usize,
}

/// Graph coloring register allocator
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphColoringAllocator {
    /// Maximum number of extra slots, 0 for no limit
    budget: usize,
}

impl GraphColoringAllocator {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Allocator without a register cap
    pub fn unbounded() -> Self {
        Self { budget: 0 }
    }

    /// Run liveness and allocate slots for a method
    pub fn allocate(&self, method: &Method) -> BackendResult<Allocation> {
        let liveness = LivenessAnalysis::analyze(method);
        self.allocate_with(method, &liveness)
    }

    /// Allocate slots for a method whose liveness is already known
    pub fn allocate_with<'m>(
        &self,
        method: &'m Method,
        liveness: &LivenessInfo<'m>,
    ) -> BackendResult<Allocation> {
        let graph = InterferenceGraph::build(method, liveness);
        let first_free = method.precolored_slots();

        // Precolor: receiver and parameters keep their slots
        let mut colors: BTreeMap<&str, usize> = BTreeMap::new();
        for descriptor in method.var_table.iter() {
            if descriptor.scope.is_precolored() {
                colors.insert(descriptor.name.as_str(), descriptor.slot);
            }
        }

        // Simplify phase: the register file is unbounded, so every node can
        // be removed; take the lowest current degree first, ties by name
        let mut stack: Vec<&str> = Vec::new();
        let mut removed: BTreeSet<&str> = BTreeSet::new();
        let mut current_degree: BTreeMap<&str, usize> = graph
            .nodes()
            .filter(|node| !graph.is_precolored(node))
            .map(|node| (node, graph.degree(node)))
            .collect();

        loop {
            let candidate = current_degree
                .iter()
                .filter(|(node, _)| !removed.contains(*node))
                .min_by_key(|&(node, deg)| (*deg, *node))
                .map(|(node, _)| *node);

            let Some(node) = candidate else {
                break;
            };
            stack.push(node);
            removed.insert(node);

            for neighbor in graph.neighbors(node) {
                if !removed.contains(neighbor)
                    && let Some(deg) = current_degree.get_mut(neighbor)
                {
                    *deg = deg.saturating_sub(1);
                }
            }
        }

        // Select phase: assign colors by popping from stack
        let mut extra_registers = 0;
        while let Some(node) = stack.pop() {
            let neighbor_colors: BTreeSet<usize> = graph
                .neighbors(node)
                .filter_map(|n| colors.get(n).copied())
                .collect();

            let color = (first_free..)
                .find(|c| !neighbor_colors.contains(c))
                .unwrap_or(first_free);

            log::trace!(
                "`{}`: {} -> slot {} (degree {})",
                method.name,
                node,
                color,
                graph.degree(node)
            );

            extra_registers = extra_registers.max(color - first_free + 1);
            colors.insert(node, color);
        }

        if self.budget > 0 && extra_registers > self.budget {
            return Err(BackendError::AllocationInfeasible {
                method: method.name.clone(),
                required: extra_registers,
                available: self.budget,
            });
        }

        let mut var_table = VarTable::new();
        for descriptor in method.var_table.iter() {
            let slot = colors
                .get(descriptor.name.as_str())
                .copied()
                .unwrap_or(descriptor.slot);
            var_table.insert(VariableDescriptor {
                slot,
                ..descriptor.clone()
            });
        }

        log::debug!(
            "allocated `{}`: {} extra register(s), {} slot(s) in total",
            method.name,
            extra_registers,
            var_table.slots_used()
        );

        Ok(Allocation {
            var_table,
            extra_registers,
        })
    }
}
