//! Register Allocation
//!
//! This module assigns JVM local-variable slots to the variables of a method.
//!
//! # Pipeline
//!
//! ```text
//! Method → Liveness Analysis → Interference Graph → Coloring → VarTable (new slots)
//! ```

pub mod allocator;
pub mod interference;
pub mod liveness;

pub use allocator::{Allocation, GraphColoringAllocator};
pub use interference::InterferenceGraph;
pub use liveness::{InstrLiveness, LivenessAnalysis, LivenessInfo, VarSet};
