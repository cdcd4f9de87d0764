//! Java-- Compiler Backend
//!
//! This module implements the backend of the Java-- compiler, which takes a
//! class in the three-address IR and produces Jasmin assembly for the JVM.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │    ClassUnit    │────▶│    Optimiser    │────▶│  Liveness and   │────▶│ Jasmin Emitter  │
//! │      (IR)       │     │ (fold/propagate)│     │ graph coloring  │     │                 │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `ir`: methods, instructions, control flow and descriptor tables
//! - `optimise`: constant folding and propagation over the IR
//! - `regalloc`: liveness, interference and slot coloring
//! - `jasmin`: instruction selection and class text generation

pub mod error;
pub mod ir;
pub mod jasmin;
pub mod optimise;
pub mod regalloc;

pub use error::{BackendError, BackendResult};

// Re-export commonly used types from ir
pub use ir::{ClassUnit, Instruction, Method, MethodBuilder, VarTable};

// Re-export the register allocator
pub use regalloc::{Allocation, GraphColoringAllocator, LivenessAnalysis, LivenessInfo};

// Re-export optimisation entry points
pub use optimise::{OptConfig, optimize_method};

// Re-export emit function
pub use jasmin::{JasminClass, emit_class};
