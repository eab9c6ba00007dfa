//! Emission tests over the structured instruction buffer.
//!
//! These run the emitters against hand-built expression trees and
//! inspect the buffered instructions and lifecycle events directly,
//! without rendering or parsing C text.

use pretty_assertions::assert_eq;
use smallvec::smallvec;
use vel_helpers::{HelperTable, HelperTableBuilder};
use vel_ir::{
    BinaryOp, ComparisonOp, Expr, ExprArena, ExprFlags, ExprId, ExprKind, Module, Span, Stmt,
    StmtKind,
};
use vel_shapes::{DialectVersion, Shape, ShapeCatalog};

use crate::condition::emit_condition;
use crate::context::{EmissionContext, LifecycleEvent};
use crate::expr::emit_expression;
use crate::instr::Instr;
use crate::stmt::emit_statement;
use crate::{Codegen, CodegenError, CompileOptions};

fn fixtures(version: DialectVersion) -> (ShapeCatalog, HelperTable) {
    let catalog = ShapeCatalog::new();
    let table = HelperTableBuilder::new(version).build(&catalog);
    (catalog, table)
}

fn local(arena: &mut ExprArena, name: &str, shape: Shape) -> ExprId {
    arena.push(Expr::new(
        ExprKind::LocalRef {
            name: name.to_owned(),
        },
        shape,
        ExprFlags::empty(),
        Span::DUMMY,
    ))
}

fn int_const(arena: &mut ExprArena, value: i64, shape: Shape) -> ExprId {
    arena.push(Expr::new(
        ExprKind::ConstantInt(value),
        shape,
        ExprFlags::CONSTANT,
        Span::DUMMY,
    ))
}

fn binary(arena: &mut ExprArena, op: BinaryOp, left: ExprId, right: ExprId, shape: Shape) -> ExprId {
    arena.push(Expr::new(
        ExprKind::Binary { op, left, right },
        shape,
        ExprFlags::MAY_RAISE,
        Span::new(10, 20),
    ))
}

fn assign(arena: &mut ExprArena, name: &str, shape: Shape, value: ExprId) -> Stmt {
    let target = local(arena, name, shape);
    Stmt {
        kind: StmtKind::Assign { target, value },
        span: Span::DUMMY,
    }
}

fn stmts_containing<'i>(instrs: &'i [Instr], needle: &str) -> Vec<&'i str> {
    instrs
        .iter()
        .filter_map(|instr| match instr {
            Instr::Stmt(text) if text.contains(needle) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn specialized_binary_add_is_emitted_with_error_exit() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Long);
    let b = local(&mut arena, "b", Shape::Long);
    let sum = binary(&mut arena, BinaryOp::Add, a, b, Shape::Long);
    let stmt = assign(&mut arena, "x", Shape::Object, sum);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    let calls = stmts_containing(
        ctx.instrs(),
        "BINARY_OPERATION_ADD_OBJECT_LONG_LONG(var_a, var_b)",
    );
    assert_eq!(calls.len(), 1);
    assert!(ctx
        .instrs()
        .iter()
        .any(|i| matches!(i, Instr::ErrorCheck { .. })));
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty());
}

#[test]
fn missed_pair_falls_back_and_reports_once() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let l = local(&mut arena, "l", Shape::List);
    let t = local(&mut arena, "t", Shape::Tuple);
    let sum = binary(&mut arena, BinaryOp::Add, l, t, Shape::Object);
    let stmt = assign(&mut arena, "x", Shape::Object, sum);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    let calls = stmts_containing(
        ctx.instrs(),
        "BINARY_OPERATION_ADD_OBJECT_OBJECT_OBJECT(var_l, var_t)",
    );
    assert_eq!(calls.len(), 1, "the generic fallback form must be emitted");
    let (_, sink) = ctx.finish();
    assert_eq!(sink.distinct_gaps(), 1);
    assert!(sink
        .locations_for("BINARY_OPERATION_ADD_OBJECT_LIST_TUPLE")
        .is_some());
}

#[test]
fn inplace_repeat_passes_the_slot_address_without_extra_cleanup() {
    let (catalog, table) = fixtures(DialectVersion::LEGACY);
    let mut arena = ExprArena::new();
    let target = local(&mut arena, "x", Shape::List);
    let three = int_const(&mut arena, 3, Shape::Int);
    let stmt = Stmt {
        kind: StmtKind::AugAssign {
            target,
            op: BinaryOp::Mul,
            value: three,
        },
        span: Span::new(5, 9),
    };

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::LEGACY, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    let calls = stmts_containing(
        ctx.instrs(),
        "INPLACE_OPERATION_MULT_LIST_INT(&var_x, VEL_CONST_INT(3))",
    );
    assert_eq!(calls.len(), 1, "the slot's address goes to the helper");
    // The slot keeps its single frame-owned obligation.
    assert!(!ctx
        .events()
        .iter()
        .any(|e| matches!(e, LifecycleEvent::Acquired(name) if name == "var_x")));
    // The legacy integer operand puts the call behind its dialect guard.
    assert!(ctx
        .instrs()
        .iter()
        .any(|i| matches!(i, Instr::GuardBegin("VEL_LEGACY_INT"))));
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty());
}

#[test]
fn inplace_fallback_rebinds_the_slot_through_the_generic_form() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    // List //= List has no helper anywhere: neither side supports the
    // floor-division slot, so the miss is silent and the generic form
    // computes a fresh value that is written back into the slot.
    let target = local(&mut arena, "x", Shape::List);
    let other = local(&mut arena, "y", Shape::List);
    let stmt = Stmt {
        kind: StmtKind::AugAssign {
            target,
            op: BinaryOp::FloorDiv,
            value: other,
        },
        span: Span::DUMMY,
    };

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    assert_eq!(
        stmts_containing(
            ctx.instrs(),
            "BINARY_OPERATION_FLOORDIV_OBJECT_OBJECT_OBJECT(var_x, var_y)"
        )
        .len(),
        1
    );
    assert_eq!(stmts_containing(ctx.instrs(), "VEL_XUNREF(var_x);").len(), 1);
    assert_eq!(stmts_containing(ctx.instrs(), "var_x = tmp_inplace_fallback_0;").len(), 1);
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty(), "dead pairs fall back silently");
}

#[test]
fn ternary_condition_forwards_both_arms_to_the_original_targets() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let guard = local(&mut arena, "g", Shape::Object);
    let yes = local(&mut arena, "y", Shape::Object);
    let no = local(&mut arena, "n", Shape::Object);
    let cond = arena.push(Expr::new(
        ExprKind::Conditional { guard, yes, no },
        Shape::Object,
        ExprFlags::empty(),
        Span::DUMMY,
    ));

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_condition(&mut ctx, &arena, cond, "on_true", "on_false");

    // No boolean temporary merges the arms: each arm branches straight
    // to the caller's labels.
    let arm_branches = stmts_containing(ctx.instrs(), "goto on_true; else goto on_false;");
    assert_eq!(arm_branches.len(), 2);
    assert!(ctx
        .instrs()
        .iter()
        .any(|i| matches!(i, Instr::Label(l) if l.starts_with("cond_select_true"))));
    assert!(ctx
        .instrs()
        .iter()
        .any(|i| matches!(i, Instr::Label(l) if l.starts_with("cond_select_false"))));
}

#[test]
fn and_condition_checks_truth_errors_before_branching() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = arena.push(Expr::new(
        ExprKind::LocalRef { name: "a".into() },
        Shape::Object,
        ExprFlags::TRUTH_MAY_RAISE,
        Span::DUMMY,
    ));
    let b = local(&mut arena, "b", Shape::Object);
    let cond = arena.push(Expr::new(
        ExprKind::BoolAnd { left: a, right: b },
        Shape::Object,
        ExprFlags::TRUTH_MAY_RAISE,
        Span::DUMMY,
    ));

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_condition(&mut ctx, &arena, cond, "on_true", "on_false");

    let check_at = ctx
        .instrs()
        .iter()
        .position(|i| matches!(i, Instr::ErrorCheck { .. }))
        .expect("truth check of `a` must have an error exit");
    let branch_at = ctx
        .instrs()
        .iter()
        .position(|i| matches!(i, Instr::Stmt(s) if s.contains("goto")))
        .expect("a branch must follow");
    assert!(
        check_at < branch_at,
        "error exit must precede any branching code"
    );
}

#[test]
fn dict_pair_order_follows_the_dialect() {
    for (version, key_first) in [
        (DialectVersion::new(3, 11), true),
        (DialectVersion::new(2, 7), false),
    ] {
        let (catalog, table) = fixtures(version);
        let mut arena = ExprArena::new();
        let source = local(&mut arena, "s", Shape::Object);
        let key = arena.push(Expr::new(
            ExprKind::Attribute {
                value: source,
                name: "key_attr".into(),
            },
            Shape::Object,
            ExprFlags::MAY_RAISE,
            Span::DUMMY,
        ));
        let source2 = local(&mut arena, "s", Shape::Object);
        let value = arena.push(Expr::new(
            ExprKind::Attribute {
                value: source2,
                name: "value_attr".into(),
            },
            Shape::Object,
            ExprFlags::MAY_RAISE,
            Span::DUMMY,
        ));
        let dict = arena.push(Expr::new(
            ExprKind::DictLiteral {
                pairs: smallvec![(key, value)],
            },
            Shape::Object,
            ExprFlags::MAY_RAISE,
            Span::DUMMY,
        ));

        let mut ctx = EmissionContext::new(&catalog, &table, version, "m");
        let result = emit_expression(&mut ctx, &arena, dict);
        ctx.release(&result);

        let key_at = ctx
            .instrs()
            .iter()
            .position(|i| matches!(i, Instr::Stmt(s) if s.contains("key_attr")))
            .expect("key evaluation emitted");
        let value_at = ctx
            .instrs()
            .iter()
            .position(|i| matches!(i, Instr::Stmt(s) if s.contains("value_attr")))
            .expect("value evaluation emitted");
        assert_eq!(
            key_at < value_at,
            key_first,
            "pair order must follow dialect {version}"
        );
    }
}

#[test]
fn discarded_binary_degrades_to_the_tristate_variant() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Long);
    let b = local(&mut arena, "b", Shape::Float);
    let sum = binary(&mut arena, BinaryOp::Add, a, b, Shape::Object);
    let stmt = Stmt {
        kind: StmtKind::ExprStmt { value: sum },
        span: Span::DUMMY,
    };

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    let calls = stmts_containing(ctx.instrs(), "BINARY_OPERATION_ADD_NBOOL_LONG_FLOAT");
    assert_eq!(calls.len(), 1, "cross-shape discard widens to NBOOL");
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty());
}

#[test]
fn discarded_same_shape_binary_uses_the_void_variant() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Long);
    let b = local(&mut arena, "b", Shape::Long);
    let sum = binary(&mut arena, BinaryOp::Add, a, b, Shape::Object);
    let stmt = Stmt {
        kind: StmtKind::ExprStmt { value: sum },
        span: Span::DUMMY,
    };

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    let calls = stmts_containing(ctx.instrs(), "BINARY_OPERATION_ADD_NVOID_LONG_LONG(var_a, var_b);");
    assert_eq!(calls.len(), 1);
    let checks: Vec<_> = ctx
        .instrs()
        .iter()
        .filter(|i| matches!(i, Instr::ErrorCheck { condition, .. } if condition == "VEL_ERROR_OCCURRED()"))
        .collect();
    assert_eq!(checks.len(), 1, "discard results check the error flag");
}

#[test]
fn or_value_splices_a_take_reference_into_the_keep_branch() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Object);
    let b = local(&mut arena, "b", Shape::Object);
    let chain = arena.push(Expr::new(
        ExprKind::BoolOr { left: a, right: b },
        Shape::Object,
        ExprFlags::TRUTH_MAY_RAISE,
        Span::DUMMY,
    ));
    let stmt = assign(&mut arena, "x", Shape::Object, chain);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    // `var_a` is a borrowed read; the keep branch must have received a
    // retroactive take-reference so both branches own the merged value.
    let take_at = ctx
        .instrs()
        .iter()
        .position(|i| matches!(i, Instr::TakeRef(name) if name == "var_a"))
        .expect("spliced take-reference for the kept borrowed value");
    let keep_label_at = ctx
        .instrs()
        .iter()
        .position(|i| matches!(i, Instr::Label(l) if l.starts_with("or_keep")))
        .expect("keep branch label");
    assert_eq!(take_at, keep_label_at + 1, "adjustment opens the keep branch");
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty());
}

#[test]
fn subscript_constant_index_skips_index_object_creation() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let t = local(&mut arena, "t", Shape::Tuple);
    let two = int_const(&mut arena, 2, Shape::Long);
    let item = arena.push(Expr::new(
        ExprKind::Subscript { value: t, index: two },
        Shape::Object,
        ExprFlags::MAY_RAISE,
        Span::DUMMY,
    ));
    let stmt = assign(&mut arena, "x", Shape::Object, item);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    assert_eq!(
        stmts_containing(ctx.instrs(), "LOOKUP_SUBSCRIPT_CONST(var_t, 2L)").len(),
        1
    );
    assert!(stmts_containing(ctx.instrs(), "VEL_CONST_INT(2)").is_empty());
}

#[test]
fn pseudo_attributes_use_their_slot_fast_paths() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let o = local(&mut arena, "o", Shape::Object);
    let dict_attr = arena.push(Expr::new(
        ExprKind::Attribute {
            value: o,
            name: "__dict__".into(),
        },
        Shape::Object,
        ExprFlags::MAY_RAISE,
        Span::DUMMY,
    ));
    let stmt = assign(&mut arena, "x", Shape::Object, dict_attr);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    assert_eq!(
        stmts_containing(ctx.instrs(), "LOOKUP_ATTRIBUTE_DICT_SLOT(var_o)").len(),
        1
    );
    assert!(stmts_containing(ctx.instrs(), "LOOKUP_ATTRIBUTE(").is_empty());
}

#[test]
fn identity_comparison_never_selects_a_helper() {
    let (catalog, table) = fixtures(DialectVersion::MODERN);
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Object);
    let b = local(&mut arena, "b", Shape::Object);
    let is_expr = arena.push(Expr::new(
        ExprKind::Comparison {
            op: ComparisonOp::Is,
            left: a,
            right: b,
        },
        Shape::Object,
        ExprFlags::empty(),
        Span::DUMMY,
    ));
    let stmt = assign(&mut arena, "x", Shape::Object, is_expr);

    let mut ctx = EmissionContext::new(&catalog, &table, DialectVersion::MODERN, "m");
    emit_statement(&mut ctx, &arena, &stmt);

    assert!(stmts_containing(ctx.instrs(), "RICH_COMPARE").is_empty());
    assert_eq!(
        stmts_containing(ctx.instrs(), "VEL_BOOL_FROM_CBOOL((var_a == var_b))").len(),
        1
    );
    let (_, sink) = ctx.finish();
    assert!(sink.is_empty());
}

#[test]
fn compile_module_renders_a_complete_frame() {
    let mut arena = ExprArena::new();
    let a = local(&mut arena, "a", Shape::Long);
    let b = local(&mut arena, "b", Shape::Long);
    let sum = binary(&mut arena, BinaryOp::Add, a, b, Shape::Long);
    let stmt = assign(&mut arena, "total", Shape::Object, sum);
    let module = Module {
        name: "pkg.demo".into(),
        body: vec![stmt],
        version: DialectVersion::MODERN,
    };

    let codegen = Codegen::new(CompileOptions::default());
    let compiled = codegen.compile_module(&arena, &module).expect("compiles");

    assert!(compiled
        .code
        .contains("static VelObject *vel_module_pkg_demo_run(void) {"));
    assert!(compiled.code.contains("VelObject *var_total = NULL;"));
    assert!(compiled.code.contains("BINARY_OPERATION_ADD_OBJECT_LONG_LONG"));
    assert!(compiled.code.contains("frame_exception_exit:;"));
    assert!(compiled.code.contains("VEL_XUNREF(var_total);"));
    assert!(compiled.reports.is_empty());
}

#[test]
fn compile_module_rejects_a_version_mismatch() {
    let arena = ExprArena::new();
    let module = Module {
        name: "pkg.legacy".into(),
        body: Vec::new(),
        version: DialectVersion::LEGACY,
    };
    let codegen = Codegen::new(CompileOptions::default());
    let err = codegen.compile_module(&arena, &module).unwrap_err();
    assert!(matches!(err, CodegenError::VersionMismatch { .. }));
}
