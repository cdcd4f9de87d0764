//! Optimization passes for IR methods
//!
//! This module provides optimization passes that operate on the IR before
//! liveness analysis and register allocation.
//!
//! # Available Passes
//!
//! - **Constant Folding**: Evaluates assignments whose operands are all literals
//! - **Constant Propagation**: Replaces reads of variables holding a known literal,
//!   block-local by default, method-wide for single-assignment locals with `extra`
//!
//! No pass adds, removes or reorders instructions, so labels and the CFG
//! stay valid.

pub mod const_prop;
pub mod fold;

use crate::backend::ir::Method;
use crate::common::config::CompilerConfig;

/// Configuration for optimization passes
#[derive(Clone, Debug, Default)]
pub struct OptConfig {
    /// Enable constant folding pass
    pub constant_folding: bool,
    /// Enable block-local constant propagation pass
    pub constant_propagation: bool,
    /// Enable method-wide propagation of single-assignment locals
    pub single_assignment_propagation: bool,
    /// Maximum number of iterations for the optimization loop (None = unlimited)
    pub max_iterations: Option<usize>,
}

impl OptConfig {
    /// Create config with all optimizations enabled
    pub fn all() -> Self {
        Self {
            constant_folding: true,
            constant_propagation: true,
            single_assignment_propagation: true,
            max_iterations: Some(10),
        }
    }

    /// Create config with no optimizations enabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if any optimization is enabled
    pub fn any_enabled(&self) -> bool {
        self.constant_folding || self.constant_propagation || self.single_assignment_propagation
    }
}

impl From<&CompilerConfig> for OptConfig {
    fn from(config: &CompilerConfig) -> Self {
        Self {
            constant_folding: config.optimize,
            constant_propagation: config.optimize,
            single_assignment_propagation: config.optimize && config.extra,
            max_iterations: Some(10),
        }
    }
}

/// Optimize a method according to the given configuration
///
/// Runs optimization passes in a loop until no more changes are made
/// or the maximum iteration count is reached. Returns the number of
/// iterations that changed something.
///
/// # Pass Ordering
///
/// 1. Constant propagation (exposes literal operands)
/// 2. Single-assignment propagation (same, across labels)
/// 3. Constant folding (produces new literal assignments to propagate)
pub fn optimize_method(method: &mut Method, config: &OptConfig) -> usize {
    if !config.any_enabled() {
        return 0;
    }

    let max_iters = config.max_iterations.unwrap_or(usize::MAX);
    let mut productive = 0;

    for _ in 0..max_iters {
        let mut changed = false;

        if config.constant_propagation {
            changed |= const_prop::propagate_block_local(method);
        }

        if config.single_assignment_propagation {
            changed |= const_prop::propagate_single_assignments(method);
        }

        if config.constant_folding {
            changed |= fold::fold_method(method);
        }

        // Fixed-point reached
        if !changed {
            break;
        }
        productive += 1;
    }

    log::debug!(
        "optimised `{}` in {} productive iteration(s)",
        method.name,
        productive
    );
    productive
}
