//! jmmc Compiler Pipeline
//!
//! This module runs a class through the backend, from IR text (or an
//! already built `ClassUnit`) to Jasmin.
//!
//! # Pipeline Stages
//!
//! ```text
//! IR text (&str)
//!     │
//!     ▼ frontend::parse_class
//! ClassUnit
//!     │
//!     ▼ optimise        (when `optimize` is set, widened by `extra`)
//! ClassUnit, literals folded and propagated
//!     │
//!     ▼ liveness        (every method)
//! USE/DEF/IN/OUT per instruction
//!     │
//!     ▼ regalloc        (when `registerAllocation` >= 0)
//! ClassUnit, descriptor tables recolored
//!     │
//!     ▼ jasmin::emit_class
//! Output (String)
//! ```
//!
//! Every method is attempted. A class with any failing method produces no
//! text, only the list of errors.

use crate::backend::error::BackendError;
use crate::backend::ir::{ClassUnit, Method};
use crate::backend::jasmin::emit_class;
use crate::backend::optimise::{OptConfig, optimize_method};
use crate::backend::regalloc::{GraphColoringAllocator, LivenessAnalysis, LivenessInfo};
use crate::common::config::{CompilerConfig, ConfigError};
use crate::frontend::{SyntaxError, parse_class};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;
use thiserror::Error;

/// Compilation error types
#[derive(Debug, Error)]
pub enum CompileError {
    /// The IR text could not be read
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<SyntaxError>),
    /// An option value is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// One or more methods failed in the backend
    #[error("{} method(s) failed: {}", .0.len(), join_errors(.0))]
    Backend(Vec<BackendError>),
}

fn join_errors(errors: &[BackendError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// What the backend did to one method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodReport {
    pub name: String,
    /// Optimiser iterations that changed something
    pub optimisation_passes: usize,
    /// Rounds the liveness fixpoint needed
    pub liveness_passes: usize,
    /// Per-instruction USE/DEF/IN/OUT listing
    pub liveness: String,
    /// Slots beyond the receiver and parameters, when allocation ran
    pub extra_registers: Option<usize>,
    /// The final descriptor table
    pub var_table: String,
}

/// Result of a successful compilation
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub class_name: String,
    /// The generated Jasmin assembly as text
    pub jasmin: String,
    /// One report per non-constructor method, in declaration order
    pub methods: Vec<MethodReport>,
}

/// Compile IR text to Jasmin
///
/// # Example
///
/// ```
/// use jmmc::common::CompilerConfig;
/// use jmmc::pipeline::compile;
///
/// let source = "Id { .method static id(x.i32).i32 { ret.i32 x.i32; } }";
/// let output = compile(source, &CompilerConfig::default()).unwrap();
/// assert!(output.jasmin.contains(".method static id(I)I"));
/// ```
pub fn compile(source: &str, config: &CompilerConfig) -> Result<CompileOutput, CompileError> {
    let class = parse_class(source).map_err(CompileError::Syntax)?;
    compile_class(class, config)
}

/// Compile IR text with options given as the string map of the host framework
/// (`"optimize"`, `"registerAllocation"`, `"extra"`)
pub fn compile_with_options(
    source: &str,
    options: &HashMap<String, String>,
) -> Result<CompileOutput, CompileError> {
    let config = CompilerConfig::from_map(options)?;
    compile(source, &config)
}

/// Run the backend stages on an already built class
pub fn compile_class(
    mut class: ClassUnit,
    config: &CompilerConfig,
) -> Result<CompileOutput, CompileError> {
    let opt_config = OptConfig::from(config);
    let budget = config.register_budget();
    log::debug!(
        "compiling `{}`: optimise {:?}, register budget {:?}",
        class.name,
        opt_config,
        budget
    );

    let mut errors = Vec::new();
    let mut methods = Vec::new();

    // Constructors are replaced by the default one when emitting
    for method in class.methods.iter_mut().filter(|m| !m.is_constructor) {
        let optimisation_passes = optimize_method(method, &opt_config);
        if optimisation_passes > 0 {
            log::debug!(
                "optimised `{}` in {} pass(es)",
                method.name,
                optimisation_passes
            );
        }

        let (mut report, allocation) = {
            let liveness = LivenessAnalysis::analyze(method);
            let allocation = budget.map(|budget| {
                GraphColoringAllocator::new(budget).allocate_with(method, &liveness)
            });
            let report = MethodReport {
                name: method.name.clone(),
                optimisation_passes,
                liveness_passes: liveness.passes,
                liveness: liveness_dump(method, &liveness),
                extra_registers: None,
                var_table: String::new(),
            };
            (report, allocation)
        };

        match allocation {
            Some(Ok(allocation)) => {
                report.extra_registers = Some(allocation.extra_registers);
                method.var_table = allocation.var_table;
            }
            Some(Err(e)) => {
                log::debug!("allocation of `{}` failed: {}", method.name, e);
                errors.push(e);
            }
            None => {}
        }
        report.var_table = method.var_table.to_string();
        methods.push(report);
    }

    let failed: BTreeSet<String> = errors.iter().map(|e| e.method().to_string()).collect();
    let jasmin = match emit_class(&class) {
        Ok(jasmin) => Some(jasmin),
        Err(emit_errors) => {
            // A method whose allocation failed is reported once
            errors.extend(
                emit_errors
                    .into_iter()
                    .filter(|e| !failed.contains(e.method())),
            );
            None
        }
    };

    match jasmin {
        Some(jasmin) if errors.is_empty() => {
            log::debug!("emitted class `{}`", class.name);
            Ok(CompileOutput {
                class_name: class.name,
                jasmin: jasmin.to_string(),
                methods,
            })
        }
        _ => Err(CompileError::Backend(errors)),
    }
}

/// Render the liveness sets of a method, one instruction per entry
pub fn liveness_dump(method: &Method, liveness: &LivenessInfo) -> String {
    fn set(vars: &BTreeSet<&str>) -> String {
        format!("{{{}}}", vars.iter().copied().collect::<Vec<_>>().join(", "))
    }

    let mut out = String::new();
    for id in method.ids() {
        for label in method.labels_at(id) {
            let _ = writeln!(out, "  {}:", label);
        }
        let _ = writeln!(out, "  {:>4}  {}", id.to_string(), method.instr(id));
        let _ = writeln!(
            out,
            "        use {}  def {}  in {}  out {}",
            set(liveness.uses(id)),
            set(liveness.defs(id)),
            set(liveness.live_in(id)),
            set(liveness.live_out(id))
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(optimize: bool, registers: Option<i32>, extra: bool) -> CompilerConfig {
        CompilerConfig {
            optimize,
            register_allocation: registers,
            extra,
        }
    }

    const COUNTER: &str = r#"
        import io;
        Counter {
            .construct Counter().V {
                invokespecial(this, "<init>").V;
            }

            .method public static main(args.array.String).V {
                x.i32 :=.i32 1.i32;
                if (x.i32 <.bool 0.i32) goto L1;
                x.i32 :=.i32 x.i32 +.i32 5.i32;
            L1:
                invokestatic(io, "println", x.i32).V;
            }
        }
    "#;

    const DISJOINT: &str = r#"
        import io;
        Disjoint {
            .method public run(p.i32).V {
                a.i32 :=.i32 p.i32 +.i32 1.i32;
                invokestatic(io, "println", a.i32).V;
                b.i32 :=.i32 p.i32 +.i32 2.i32;
                invokestatic(io, "println", b.i32).V;
                ret.V;
            }
        }
    "#;

    const OVERLAP: &str = r#"
        Overlap {
            .method public static sum().i32 {
                a.i32 :=.i32 1.i32;
                b.i32 :=.i32 2.i32;
                c.i32 :=.i32 a.i32 +.i32 b.i32;
                ret.i32 c.i32;
            }
        }
    "#;

    const ACROSS_LABEL: &str = r#"
        import io;
        Across {
            .method public static show().V {
                x.i32 :=.i32 7.i32;
            L1:
                invokestatic(io, "println", x.i32).V;
                ret.V;
            }
        }
    "#;

    #[test]
    fn test_compile_counter() {
        let output = compile(COUNTER, &CompilerConfig::default()).unwrap();
        let text = &output.jasmin;

        assert!(text.starts_with(".class public Counter\n.super java/lang/Object\n"));
        assert!(text.contains(".method public static main([Ljava/lang/String;)V"));
        assert!(text.contains("    iinc 1 5\n"));
        assert!(text.contains("    iflt L1\n"));
        assert!(!text.contains("if_icmp"));
        assert!(text.contains("L1:\n    iload_1\n    invokestatic io/println(I)V\n    return\n"));
        // Only the default constructor
        assert_eq!(text.matches(".method public <init>()V").count(), 1);
        assert_eq!(output.methods.len(), 1);
    }

    #[test]
    fn test_compile_without_allocation_keeps_slots() {
        let output = compile(DISJOINT, &config(false, None, false)).unwrap();
        assert!(output.jasmin.contains(".limit locals 4"));
        assert_eq!(output.methods[0].extra_registers, None);
    }

    #[test]
    fn test_compile_with_allocation_reuses_slots() {
        let output = compile(DISJOINT, &config(false, Some(0), false)).unwrap();
        assert!(output.jasmin.contains(".limit locals 3"));
        assert_eq!(output.jasmin.matches("istore_2").count(), 2);
        assert_eq!(output.methods[0].extra_registers, Some(1));
    }

    #[test]
    fn test_negative_budget_disables_allocation() {
        let output = compile(DISJOINT, &config(false, Some(-1), false)).unwrap();
        assert!(output.jasmin.contains(".limit locals 4"));
    }

    #[test]
    fn test_budget_too_small() {
        let err = compile(OVERLAP, &config(false, Some(1), false)).unwrap_err();
        match err {
            CompileError::Backend(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors[0],
                    BackendError::AllocationInfeasible {
                        method: "sum".to_string(),
                        required: 2,
                        available: 1,
                    }
                );
            }
            other => panic!("expected a backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_budget_met() {
        let output = compile(OVERLAP, &config(false, Some(2), false)).unwrap();
        assert_eq!(output.methods[0].extra_registers, Some(2));
    }

    #[test]
    fn test_optimised_overlap_folds_to_constant() {
        let output = compile(OVERLAP, &config(true, None, false)).unwrap();
        assert!(output.jasmin.contains("    iconst_3\n"));
        assert!(!output.jasmin.contains("iadd"));
        assert!(output.methods[0].optimisation_passes > 0);
    }

    #[test]
    fn test_extra_requires_optimize() {
        let output = compile(ACROSS_LABEL, &config(false, None, true)).unwrap();
        assert!(
            output.jasmin.contains("L1:\n    iload_0\n    invokestatic io/println(I)V\n"),
            "{}",
            output.jasmin
        );
        assert_eq!(output.methods[0].optimisation_passes, 0);

        let output = compile(ACROSS_LABEL, &config(true, None, true)).unwrap();
        assert!(
            output.jasmin.contains("L1:\n    bipush 7\n    invokestatic io/println(I)V\n"),
            "{}",
            output.jasmin
        );
    }

    #[test]
    fn test_failing_method_withholds_output() {
        let source = r#"
            Mixed {
                .method public static good().V { ret.V; }
                .method public static bad().V { ret.i32 1.i32; }
            }
        "#;
        let err = compile(source, &CompilerConfig::default()).unwrap_err();
        match err {
            CompileError::Backend(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].method(), "bad");
                assert!(matches!(errors[0], BackendError::MalformedIr { .. }));
            }
            other => panic!("expected a backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error() {
        let err = compile("Broken { .method", &CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::Syntax(ref errors) if !errors.is_empty()));
    }

    #[test]
    fn test_compile_with_option_map() {
        let options: HashMap<String, String> = [("registerAllocation", "0"), ("optimize", "false")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let output = compile_with_options(DISJOINT, &options).unwrap();
        assert!(output.jasmin.contains(".limit locals 3"));

        let options: HashMap<String, String> =
            [("registerAllocation".to_string(), "lots".to_string())].into();
        let err = compile_with_options(DISJOINT, &options).unwrap_err();
        assert!(matches!(err, CompileError::Config(ConfigError::NotAnInteger { .. })));
    }

    #[test]
    fn test_liveness_dump() {
        let output = compile(OVERLAP, &CompilerConfig::default()).unwrap();
        let dump = &output.methods[0].liveness;
        assert!(dump.contains("#2  c.i32 :=.i32 a.i32 +.i32 b.i32"), "{}", dump);
        assert!(
            dump.contains("use {a, b}  def {c}  in {a, b}  out {c}"),
            "{}",
            dump
        );
        assert!(output.methods[0].liveness_passes >= 1);
    }

    #[test]
    fn test_var_table_dump() {
        let output = compile(OVERLAP, &config(false, Some(0), false)).unwrap();
        let table = &output.methods[0].var_table;
        assert!(table.contains("a"), "{}", table);
        assert_eq!(table.lines().count(), 3);
    }
}
