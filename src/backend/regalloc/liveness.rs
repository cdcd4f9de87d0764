//! Liveness Analysis
//!
//! This module computes, for every instruction of a method, which variables
//! are read (USE), written (DEF), live on entry (IN) and live on exit (OUT).
//!
//! # Algorithm
//!
//! Backward dataflow over the instruction-level control-flow graph:
//! - out[n] = ∪ in[s] for all successors s of n (the exit node contributes nothing)
//! - in[n] = use[n] ∪ (out[n] - def[n])
//!
//! USE and DEF are computed once up front; the fixpoint loop only redoes the
//! set algebra. Instructions are visited in reverse program order, which
//! converges quickly for backward problems. The loop terminates because the
//! sets only grow and the variable universe is finite.

use crate::backend::ir::{InstrId, Instruction, Method, Operand};
use std::collections::BTreeSet;

/// Set of variable names, borrowed from the method being analysed
pub type VarSet<'m> = BTreeSet<&'m str>;

/// Liveness information for a single instruction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrLiveness<'m> {
    /// Variables read by the instruction
    pub uses: VarSet<'m>,
    /// Variables written by the instruction
    pub defs: VarSet<'m>,
    /// Variables live before the instruction
    pub live_in: VarSet<'m>,
    /// Variables live after the instruction
    pub live_out: VarSet<'m>,
}

/// Liveness information for a method
#[derive(Clone, Debug)]
pub struct LivenessInfo<'m> {
    /// Per-instruction sets, indexed by `InstrId`
    pub sets: Vec<InstrLiveness<'m>>,
    /// Number of passes until the sets stopped changing
    pub passes: usize,
}

impl<'m> LivenessInfo<'m> {
    pub fn get(&self, id: InstrId) -> &InstrLiveness<'m> {
        &self.sets[id.0]
    }

    pub fn uses(&self, id: InstrId) -> &VarSet<'m> {
        &self.get(id).uses
    }

    pub fn defs(&self, id: InstrId) -> &VarSet<'m> {
        &self.get(id).defs
    }

    pub fn live_in(&self, id: InstrId) -> &VarSet<'m> {
        &self.get(id).live_in
    }

    pub fn live_out(&self, id: InstrId) -> &VarSet<'m> {
        &self.get(id).live_out
    }
}

/// Liveness analysis engine
pub struct LivenessAnalysis;

impl LivenessAnalysis {
    /// Analyze liveness for a method
    pub fn analyze(method: &Method) -> LivenessInfo<'_> {
        let mut sets: Vec<InstrLiveness> = method
            .instructions
            .iter()
            .map(|instr| InstrLiveness {
                uses: Self::instruction_uses(instr),
                defs: Self::instruction_def(instr).into_iter().collect(),
                live_in: VarSet::new(),
                live_out: VarSet::new(),
            })
            .collect();

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;

            for id in method.ids().rev() {
                // Compute live_out = union of live_in of all successors
                let mut new_live_out = VarSet::new();
                for succ in method.successors(id) {
                    new_live_out.extend(sets[succ.0].live_in.iter().copied());
                }

                // Compute live_in = uses ∪ (live_out - defs)
                let info = &sets[id.0];
                let mut new_live_in = info.uses.clone();
                new_live_in.extend(
                    new_live_out
                        .iter()
                        .copied()
                        .filter(|var| !info.defs.contains(var)),
                );

                let info = &mut sets[id.0];
                if new_live_in != info.live_in || new_live_out != info.live_out {
                    changed = true;
                    info.live_in = new_live_in;
                    info.live_out = new_live_out;
                }
            }

            log::trace!(
                "liveness pass {} over `{}`: {}",
                passes,
                method.name,
                if changed { "changed" } else { "stable" }
            );
        }

        LivenessInfo { sets, passes }
    }

    /// Get the variable defined by an instruction (if any)
    ///
    /// Only a plain variable destination is a definition. Storing into an
    /// array element leaves the array reference itself live.
    pub fn instruction_def(instr: &Instruction) -> Option<&str> {
        match instr {
            Instruction::Assign {
                dest: Operand::Variable {
                    name, index: None, ..
                },
                ..
            } => Some(name),
            _ => None,
        }
    }

    /// Get the variables read by an instruction
    pub fn instruction_uses(instr: &Instruction) -> VarSet<'_> {
        let mut reads = Vec::new();
        match instr {
            Instruction::Assign { dest, rhs, .. } => {
                if dest.is_element() {
                    dest.reads(&mut reads);
                }
                return Self::instruction_uses(rhs)
                    .into_iter()
                    .chain(reads)
                    .collect();
            }
            Instruction::CondBranch { cond, .. } => return Self::instruction_uses(cond),
            Instruction::BinaryOp { .. }
            | Instruction::UnaryOp { .. }
            | Instruction::Call { .. }
            | Instruction::New { .. }
            | Instruction::Return { .. }
            | Instruction::PutField { .. }
            | Instruction::GetField { .. }
            | Instruction::Goto { .. }
            | Instruction::ArrayLength { .. }
            | Instruction::SingleOperand(_) => {
                for operand in instr.operands() {
                    operand.reads(&mut reads);
                }
            }
        }
        reads.into_iter().collect()
    }
}
