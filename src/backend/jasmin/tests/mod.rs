//! Tests for Jasmin generation
//!
//! Methods are built with the IR builder, emitted, and checked against the
//! expected instruction text. Every emitted method is also replayed through
//! a small stack simulator to confirm the declared limits.

use super::*;
use crate::backend::error::BackendError;
use crate::backend::ir::{
    BinaryOp, CallKind, ClassUnit, FieldRef, Instruction, Method, MethodBuilder, NewTarget,
    Operand, UnaryOp, VarTable,
};
use crate::backend::regalloc::GraphColoringAllocator;
use crate::common::types::Type;
use std::collections::HashMap;

fn int(name: &str) -> Operand {
    Operand::var(name, Type::Int32)
}

fn boolean(name: &str) -> Operand {
    Operand::var(name, Type::Boolean)
}

fn lit(value: i32) -> Instruction {
    Instruction::SingleOperand(Operand::int(value))
}

fn println(arg: Operand) -> Instruction {
    Instruction::Call {
        kind: CallKind::Static {
            class: "io".to_string(),
        },
        receiver: None,
        method: "println".to_string(),
        args: vec![arg],
        return_type: Type::Void,
    }
}

fn context() -> EmitContext {
    let mut class = ClassUnit::new("Test");
    class.imports.push("io".to_string());
    EmitContext::new(&class)
}

fn emit(method: &Method) -> JasminMethod {
    let emitted = emit_method(&context(), method, &method.var_table).unwrap();
    assert_eq!(verify_stack(&emitted), emitted.max_stack, "stack limit not exact");
    assert_eq!(expected_locals(method, &emitted), emitted.max_locals);
    emitted
}

fn emit_err(method: &Method) -> BackendError {
    emit_method(&context(), method, &method.var_table).unwrap_err()
}

fn code(method: &JasminMethod) -> Vec<String> {
    method.code.iter().map(|i| i.to_string()).collect()
}

/// Replay the code along every path, checking the depth never drops below
/// zero and agrees at join points. Returns the maximum depth reached.
fn verify_stack(method: &JasminMethod) -> usize {
    let code = &method.code;
    let labels: HashMap<&str, usize> = code
        .iter()
        .enumerate()
        .filter_map(|(pc, instr)| match instr {
            JasminInstr::Label(label) => Some((label.as_str(), pc)),
            _ => None,
        })
        .collect();

    let mut depth_at: Vec<Option<usize>> = vec![None; code.len()];
    let mut work = vec![(0usize, 0usize)];
    let mut max = 0;

    while let Some((pc, depth)) = work.pop() {
        if pc >= code.len() {
            continue;
        }
        if let Some(seen) = depth_at[pc] {
            assert_eq!(seen, depth, "inconsistent depth at {}", pc);
            continue;
        }
        depth_at[pc] = Some(depth);

        let instr = &code[pc];
        assert!(depth >= instr.pops(), "stack underflow at {}: {}", pc, instr);
        let after = depth - instr.pops() + instr.pushes();
        max = max.max(after);

        match instr {
            JasminInstr::Goto(label) => work.push((labels[label.as_str()], after)),
            JasminInstr::If { label, .. } | JasminInstr::IfICmp { label, .. } => {
                work.push((labels[label.as_str()], after));
                work.push((pc + 1, after));
            }
            JasminInstr::Return(_) => {}
            _ => work.push((pc + 1, after)),
        }
    }

    max
}

fn expected_locals(method: &Method, emitted: &JasminMethod) -> usize {
    emitted
        .code
        .iter()
        .filter_map(|instr| instr.slot())
        .map(|slot| slot + 1)
        .max()
        .unwrap_or(0)
        .max(method.precolored_slots())
}

#[test]
fn test_increment_becomes_iinc() {
    // x := 0; x := x + 5; ret x
    let method = MethodBuilder::new("Test", "inc")
        .static_method()
        .returns(Type::Int32)
        .with(Instruction::assign(int("x"), lit(0)))
        .with(Instruction::assign(
            int("x"),
            Instruction::binary(BinaryOp::Add, int("x"), Operand::int(5)),
        ))
        .with(Instruction::ret(Some(int("x"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec!["iconst_0", "istore_0", "iinc 0 5", "iload_0", "ireturn"]
    );
    assert_eq!(emitted.max_stack, 1);
    assert_eq!(emitted.max_locals, 1);
}

#[test]
fn test_iinc_variants_and_limits() {
    let update = |rhs: Instruction| {
        MethodBuilder::new("Test", "update")
            .param("x", Type::Int32)
            .with(Instruction::assign(int("x"), rhs))
            .build()
            .unwrap()
    };

    let emitted = emit(&update(Instruction::binary(BinaryOp::Add, Operand::int(7), int("x"))));
    assert_eq!(code(&emitted), vec!["iinc 1 7", "return"]);

    let emitted = emit(&update(Instruction::binary(BinaryOp::Sub, int("x"), Operand::int(3))));
    assert_eq!(code(&emitted), vec!["iinc 1 -3", "return"]);

    let emitted = emit(&update(Instruction::binary(BinaryOp::Sub, int("x"), Operand::int(-128))));
    assert_eq!(
        code(&emitted),
        vec!["iload_1", "bipush -128", "isub", "istore_1", "return"]
    );

    let emitted = emit(&update(Instruction::binary(BinaryOp::Add, int("x"), Operand::int(200))));
    assert_eq!(
        code(&emitted),
        vec!["iload_1", "sipush 200", "iadd", "istore_1", "return"]
    );

    // Subtraction is not commutative
    let emitted = emit(&update(Instruction::binary(BinaryOp::Sub, Operand::int(1), int("x"))));
    assert_eq!(
        code(&emitted),
        vec!["iconst_1", "iload_1", "isub", "istore_1", "return"]
    );
}

#[test]
fn test_void_method_gets_trailing_return() {
    let method = MethodBuilder::new("Test", "noop")
        .static_method()
        .with(Instruction::assign(int("x"), lit(1)))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(code(&emitted), vec!["iconst_1", "istore_0", "return"]);

    let method = MethodBuilder::new("Test", "explicit")
        .static_method()
        .with(Instruction::ret(None))
        .build()
        .unwrap();
    assert_eq!(code(&emit(&method)), vec!["return"]);
}

#[test]
fn test_compare_with_zero_uses_single_operand_branch() {
    // if (x < 0) goto neg; println(1); goto done; neg: println(0); done:
    let mut builder = MethodBuilder::new("Test", "sign")
        .static_method()
        .param("x", Type::Int32);
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::Lt, int("x"), Operand::int(0)),
        "neg",
    ));
    builder.push(println(Operand::int(1)));
    builder.push(Instruction::goto("done"));
    builder.label("neg");
    builder.push(println(Operand::int(0)));
    builder.label("done");
    let method = builder.build().unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "iload_0",
            "iflt neg",
            "iconst_1",
            "invokestatic io/println(I)V",
            "goto done",
            "neg:",
            "iconst_0",
            "invokestatic io/println(I)V",
            "done:",
            "return",
        ]
    );
    assert!(code(&emitted).iter().all(|line| !line.starts_with("if_icmp")));
}

#[test]
fn test_zero_on_the_left_swaps_condition() {
    let mut builder = MethodBuilder::new("Test", "positive")
        .static_method()
        .param("x", Type::Int32);
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::Lt, Operand::int(0), int("x")),
        "pos",
    ));
    builder.push(Instruction::ret(None));
    builder.label("pos");
    builder.push(println(int("x")));
    let method = builder.build().unwrap();

    assert_eq!(
        code(&emit(&method)),
        vec![
            "iload_0",
            "ifgt pos",
            "return",
            "pos:",
            "iload_0",
            "invokestatic io/println(I)V",
            "return",
        ]
    );
}

#[test]
fn test_general_comparison_uses_icmp() {
    let mut builder = MethodBuilder::new("Test", "less")
        .static_method()
        .param("x", Type::Int32)
        .param("y", Type::Int32);
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::Ge, int("x"), int("y")),
        "end",
    ));
    builder.push(println(int("x")));
    builder.label("end");
    let method = builder.build().unwrap();

    let emitted = emit(&method);
    assert_eq!(&code(&emitted)[..3], &["iload_0", "iload_1", "if_icmpge end"]);
    assert_eq!(emitted.max_stack, 2);
}

#[test]
fn test_comparison_value_is_materialized() {
    let method = MethodBuilder::new("Test", "less")
        .static_method()
        .param("x", Type::Int32)
        .param("y", Type::Int32)
        .returns(Type::Boolean)
        .with(Instruction::assign(
            boolean("b"),
            Instruction::binary(BinaryOp::Lt, int("x"), int("y")),
        ))
        .with(Instruction::ret(Some(boolean("b"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "iload_0",
            "iload_1",
            "if_icmplt cmp_true_0",
            "iconst_0",
            "goto cmp_end_1",
            "cmp_true_0:",
            "iconst_1",
            "cmp_end_1:",
            "istore_2",
            "iload_2",
            "ireturn",
        ]
    );
    assert_eq!(emitted.header, "public static less(II)Z");
    assert_eq!(emitted.max_stack, 2);
    assert_eq!(emitted.max_locals, 3);
}

#[test]
fn test_not_in_value_position_uses_xor() {
    let method = MethodBuilder::new("Test", "flip")
        .static_method()
        .param("a", Type::Boolean)
        .returns(Type::Boolean)
        .with(Instruction::assign(
            boolean("c"),
            Instruction::UnaryOp {
                op: UnaryOp::Not,
                operand: boolean("a"),
                ty: Type::Boolean,
            },
        ))
        .with(Instruction::ret(Some(boolean("c"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec!["iload_0", "iconst_1", "ixor", "istore_1", "iload_1", "ireturn"]
    );
    assert_eq!(emitted.max_stack, 2);
}

#[test]
fn test_not_in_condition_flips_the_jump() {
    let mut builder = MethodBuilder::new("Test", "unless")
        .static_method()
        .param("a", Type::Boolean);
    builder.push(Instruction::branch(
        Instruction::UnaryOp {
            op: UnaryOp::Not,
            operand: boolean("a"),
            ty: Type::Boolean,
        },
        "end",
    ));
    builder.push(println(Operand::int(1)));
    builder.label("end");
    let method = builder.build().unwrap();

    assert_eq!(&code(&emit(&method))[..2], &["iload_0", "ifeq end"]);
}

#[test]
fn test_and_condition_short_circuits() {
    let mut builder = MethodBuilder::new("Test", "both")
        .static_method()
        .param("a", Type::Boolean)
        .param("b", Type::Boolean);
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::And, boolean("a"), boolean("b")),
        "then",
    ));
    builder.push(Instruction::ret(None));
    builder.label("then");
    builder.push(println(Operand::int(1)));
    let method = builder.build().unwrap();

    assert_eq!(
        code(&emit(&method)),
        vec![
            "iload_0",
            "ifeq and_skip_0",
            "iload_1",
            "ifne then",
            "and_skip_0:",
            "return",
            "then:",
            "iconst_1",
            "invokestatic io/println(I)V",
            "return",
        ]
    );
}

#[test]
fn test_or_value_short_circuits() {
    let method = MethodBuilder::new("Test", "either")
        .static_method()
        .param("a", Type::Boolean)
        .param("b", Type::Boolean)
        .returns(Type::Boolean)
        .with(Instruction::assign(
            boolean("c"),
            Instruction::binary(BinaryOp::Or, boolean("a"), boolean("b")),
        ))
        .with(Instruction::ret(Some(boolean("c"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "iload_0",
            "ifne cmp_true_0",
            "iload_1",
            "ifne cmp_true_0",
            "iconst_0",
            "goto cmp_end_1",
            "cmp_true_0:",
            "iconst_1",
            "cmp_end_1:",
            "istore_2",
            "iload_2",
            "ireturn",
        ]
    );
    assert_eq!(emitted.max_stack, 1);
}

#[test]
fn test_literal_operands_in_conditions() {
    // true || a always jumps, false && a never does
    let mut builder = MethodBuilder::new("Test", "constant")
        .static_method()
        .param("a", Type::Boolean);
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::Or, Operand::boolean(true), boolean("a")),
        "end",
    ));
    builder.push(Instruction::branch(
        Instruction::binary(BinaryOp::And, Operand::boolean(false), boolean("a")),
        "end",
    ));
    builder.label("end");
    let method = builder.build().unwrap();

    // Unreachable code follows the first jump, so the limits are not replayed
    let emitted = emit_method(&context(), &method, &method.var_table).unwrap();
    let lines = code(&emitted);
    assert_eq!(lines[0], "goto end");
    assert!(lines.contains(&"goto and_skip_0".to_string()));
}

#[test]
fn test_constant_encodings() {
    let mut builder = MethodBuilder::new("Test", "constants").static_method();
    for value in [-1, 5, 6, -129, 40000] {
        builder.push(Instruction::assign(int("x"), lit(value)));
    }
    let method = builder.build().unwrap();

    let lines = code(&emit(&method));
    let pushes: Vec<&str> = lines.iter().step_by(2).map(String::as_str).collect();
    assert_eq!(
        pushes,
        vec!["iconst_m1", "iconst_5", "bipush 6", "sipush -129", "ldc 40000", "return"]
    );
}

#[test]
fn test_array_store_order() {
    let method = MethodBuilder::new("Test", "store")
        .static_method()
        .param("a", Type::array_of(Type::Int32))
        .param("i", Type::Int32)
        .param("v", Type::Int32)
        .with(Instruction::assign(
            Operand::element("a", int("i"), Type::Int32),
            Instruction::SingleOperand(int("v")),
        ))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec!["aload_0", "iload_1", "iload_2", "iastore", "return"]
    );
    assert_eq!(emitted.header, "public static store([III)V");
    assert_eq!(emitted.max_stack, 3);
}

#[test]
fn test_boolean_array_uses_byte_access() {
    let flags = Type::array_of(Type::Boolean);
    let method = MethodBuilder::new("Test", "flags")
        .static_method()
        .returns(Type::Boolean)
        .with(Instruction::assign(
            Operand::var("a", flags.clone()),
            Instruction::New {
                target: NewTarget::Array {
                    element: Type::Boolean,
                    size: Operand::int(3),
                },
                ty: flags,
            },
        ))
        .with(Instruction::assign(
            Operand::element("a", Operand::int(1), Type::Boolean),
            Instruction::SingleOperand(Operand::boolean(true)),
        ))
        .with(Instruction::assign(
            boolean("x"),
            Instruction::SingleOperand(Operand::element("a", Operand::int(1), Type::Boolean)),
        ))
        .with(Instruction::ret(Some(boolean("x"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "iconst_3",
            "newarray boolean",
            "astore_0",
            "aload_0",
            "iconst_1",
            "iconst_1",
            "bastore",
            "aload_0",
            "iconst_1",
            "baload",
            "istore_1",
            "iload_1",
            "ireturn",
        ]
    );
    assert_eq!(emitted.max_stack, 3);
}

#[test]
fn test_array_allocation_and_length() {
    let array = Type::array_of(Type::Int32);
    let method = MethodBuilder::new("Test", "len")
        .static_method()
        .param("n", Type::Int32)
        .returns(Type::Int32)
        .with(Instruction::assign(
            Operand::var("arr", array.clone()),
            Instruction::New {
                target: NewTarget::Array {
                    element: Type::Int32,
                    size: int("n"),
                },
                ty: array.clone(),
            },
        ))
        .with(Instruction::assign(
            int("r"),
            Instruction::ArrayLength {
                array: Operand::var("arr", array),
            },
        ))
        .with(Instruction::ret(Some(int("r"))))
        .build()
        .unwrap();

    assert_eq!(
        code(&emit(&method)),
        vec![
            "iload_0",
            "newarray int",
            "astore_1",
            "aload_1",
            "arraylength",
            "istore_2",
            "iload_2",
            "ireturn",
        ]
    );
}

#[test]
fn test_calls_and_discarded_results() {
    let obj = Operand::var("t", Type::class("Test"));
    let get = |receiver: Operand, arg: Operand| Instruction::Call {
        kind: CallKind::Virtual,
        receiver: Some(receiver),
        method: "get".to_string(),
        args: vec![arg],
        return_type: Type::Int32,
    };

    let method = MethodBuilder::new("Test", "run")
        .with(Instruction::assign(
            obj.clone(),
            Instruction::New {
                target: NewTarget::Object {
                    class: "Test".to_string(),
                },
                ty: Type::class("Test"),
            },
        ))
        .with(Instruction::Call {
            kind: CallKind::Special,
            receiver: Some(obj.clone()),
            method: "<init>".to_string(),
            args: vec![],
            return_type: Type::Void,
        })
        .with(Instruction::assign(int("r"), get(obj, Operand::int(3))))
        .with(get(Operand::This, int("r")))
        .with(println(int("r")))
        .with(Instruction::ret(None))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "new Test",
            "astore_1",
            "aload_1",
            "invokespecial Test/<init>()V",
            "aload_1",
            "iconst_3",
            "invokevirtual Test/get(I)I",
            "istore_2",
            "aload_0",
            "iload_2",
            "invokevirtual Test/get(I)I",
            "pop",
            "iload_2",
            "invokestatic io/println(I)V",
            "return",
        ]
    );
    assert_eq!(emitted.header, "public run()V");
    assert_eq!(emitted.max_stack, 2);
    assert_eq!(emitted.max_locals, 3);
}

#[test]
fn test_super_constructor_call_targets_superclass() {
    let mut class = ClassUnit::new("Child");
    class.super_class = Some("Base".to_string());
    let ctx = EmitContext::new(&class);

    let method = MethodBuilder::new("Child", "init")
        .with(Instruction::Call {
            kind: CallKind::Special,
            receiver: Some(Operand::This),
            method: "<init>".to_string(),
            args: vec![],
            return_type: Type::Void,
        })
        .build()
        .unwrap();

    let emitted = emit_method(&ctx, &method, &method.var_table).unwrap();
    assert_eq!(
        code(&emitted),
        vec!["aload_0", "invokespecial Base/<init>()V", "return"]
    );
}

#[test]
fn test_field_access() {
    let field = FieldRef {
        name: "a".to_string(),
        ty: Type::Int32,
    };
    let method = MethodBuilder::new("Test", "setGet")
        .returns(Type::Int32)
        .with(Instruction::PutField {
            object: Operand::This,
            field: field.clone(),
            value: Operand::int(7),
        })
        .with(Instruction::assign(
            int("x"),
            Instruction::GetField {
                object: Operand::This,
                field,
            },
        ))
        .with(Instruction::ret(Some(int("x"))))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(
        code(&emitted),
        vec![
            "aload_0",
            "bipush 7",
            "putfield Test/a I",
            "aload_0",
            "getfield Test/a I",
            "istore_1",
            "iload_1",
            "ireturn",
        ]
    );
    assert_eq!(emitted.max_stack, 2);
}

#[test]
fn test_high_slots_use_operand_form() {
    let mut builder = MethodBuilder::new("Test", "many").static_method();
    for name in ["a", "b", "c", "d", "e"] {
        builder.push(Instruction::assign(int(name), lit(1)));
    }
    let method = builder.build().unwrap();

    let emitted = emit(&method);
    assert!(code(&emitted).contains(&"istore 4".to_string()));
    assert_eq!(emitted.max_locals, 5);
}

#[test]
fn test_locals_cover_unused_parameters() {
    let method = MethodBuilder::new("Test", "ignore")
        .param("a", Type::Int32)
        .param("b", Type::Int32)
        .with(Instruction::ret(None))
        .build()
        .unwrap();

    let emitted = emit(&method);
    assert_eq!(emitted.max_locals, 3);
    assert_eq!(emitted.max_stack, 0);
}

#[test]
fn test_allocated_slots_are_used() {
    let mut method = MethodBuilder::new("Test", "disjoint")
        .param("p", Type::Int32)
        .with(Instruction::assign(
            int("a"),
            Instruction::binary(BinaryOp::Add, int("p"), Operand::int(1)),
        ))
        .with(println(int("a")))
        .with(Instruction::assign(
            int("b"),
            Instruction::binary(BinaryOp::Add, int("p"), Operand::int(2)),
        ))
        .with(println(int("b")))
        .build()
        .unwrap();
    assert_eq!(emit(&method).max_locals, 4);

    let allocation = GraphColoringAllocator::unbounded().allocate(&method).unwrap();
    method.var_table = allocation.var_table;

    let emitted = emit(&method);
    assert_eq!(emitted.max_locals, 3);
    let stores: Vec<String> = code(&emitted)
        .into_iter()
        .filter(|line| line.starts_with("istore"))
        .collect();
    assert_eq!(stores, vec!["istore_2", "istore_2"]);
}

#[test]
fn test_unknown_variable_is_malformed() {
    let method = MethodBuilder::new("Test", "lost")
        .static_method()
        .with(Instruction::assign(int("x"), lit(1)))
        .build()
        .unwrap();

    let err = emit_method(&context(), &method, &VarTable::new()).unwrap_err();
    assert!(matches!(err, BackendError::MalformedIr { .. }));
    assert_eq!(err.method(), "lost");
}

#[test]
fn test_unsupported_constructs() {
    let method = MethodBuilder::new("Test", "jumpValue")
        .static_method()
        .with(Instruction::assign(int("x"), Instruction::goto("nowhere")))
        .build()
        .unwrap();
    assert!(matches!(
        emit_err(&method),
        BackendError::UnsupportedConstruct { .. }
    ));

    let void_array = Type::array_of(Type::Void);
    let method = MethodBuilder::new("Test", "voidArray")
        .static_method()
        .with(Instruction::assign(
            Operand::var("v", void_array.clone()),
            Instruction::New {
                target: NewTarget::Array {
                    element: Type::Void,
                    size: Operand::int(1),
                },
                ty: void_array,
            },
        ))
        .build()
        .unwrap();
    assert!(matches!(
        emit_err(&method),
        BackendError::UnsupportedConstruct { .. }
    ));
}

#[test]
fn test_return_mismatches_are_malformed() {
    let method = MethodBuilder::new("Test", "voidValue")
        .static_method()
        .with(Instruction::ret(Some(Operand::int(1))))
        .build()
        .unwrap();
    assert!(matches!(emit_err(&method), BackendError::MalformedIr { .. }));

    let method = MethodBuilder::new("Test", "missing")
        .static_method()
        .returns(Type::Int32)
        .with(Instruction::ret(None))
        .build()
        .unwrap();
    assert!(matches!(emit_err(&method), BackendError::MalformedIr { .. }));
}

#[test]
fn test_emit_class_reports_every_failed_method() {
    let mut class = ClassUnit::new("Test");
    class.methods.push(
        MethodBuilder::new("Test", "good")
            .with(Instruction::ret(None))
            .build()
            .unwrap(),
    );
    class.methods.push(
        MethodBuilder::new("Test", "bad1")
            .static_method()
            .with(Instruction::ret(Some(Operand::int(1))))
            .build()
            .unwrap(),
    );
    class.methods.push(
        MethodBuilder::new("Test", "bad2")
            .static_method()
            .with(Instruction::assign(int("x"), Instruction::goto("nowhere")))
            .build()
            .unwrap(),
    );

    let errors = emit_class(&class).unwrap_err();
    let methods: Vec<&str> = errors.iter().map(|e| e.method()).collect();
    assert_eq!(methods, vec!["bad1", "bad2"]);
}

#[test]
fn test_emit_class_skips_ir_constructors() {
    let mut class = ClassUnit::new("Test");
    // Would be malformed if it were emitted
    class.methods.push(
        MethodBuilder::new("Test", "Test")
            .constructor()
            .with(Instruction::ret(Some(Operand::int(1))))
            .build()
            .unwrap(),
    );
    class.methods.push(
        MethodBuilder::new("Test", "main")
            .static_method()
            .param("args", Type::array_of(Type::class("String")))
            .with(println(Operand::int(42)))
            .build()
            .unwrap(),
    );
    class.imports.push("io".to_string());

    let text = emit_class(&class).unwrap().to_string();
    let expected = "\
.class public Test
.super java/lang/Object

.method public <init>()V
    aload_0
    invokespecial java/lang/Object/<init>()V
    return
.end method

.method public static main([Ljava/lang/String;)V
    .limit stack 1
    .limit locals 1
    bipush 42
    invokestatic io/println(I)V
    return
.end method
";
    assert_eq!(text, expected);
}
