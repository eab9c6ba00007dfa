//! Expression evaluation.
//!
//! `emit_expression` is the recursive-descent driver: it evaluates one
//! expression node into a [`TempValue`] and hands operation nodes to the
//! family emitters. Operand sub-expressions are always evaluated in the
//! order the arena stores them, which is the source language's defined
//! evaluation order.

use vel_ir::{ExprArena, ExprId, ExprKind, UnaryOp};
use vel_shapes::CType;

use crate::access::{emit_attribute, emit_slice, emit_subscript};
use crate::compare::emit_comparison;
use crate::condition::{emit_condition, emit_truth_value, truth_is_true};
use crate::context::{EmissionContext, TempValue};
use crate::instr::Instr;
use crate::operations::{emit_binary_operation, emit_unary_operation};

/// Evaluate an expression into a handle.
///
/// The returned handle is owned (carries a cleanup obligation) only
/// when the emitted code acquired a fresh reference for it; plain
/// variable reads and interned constants come back borrowed.
pub fn emit_expression(ctx: &mut EmissionContext<'_>, arena: &ExprArena, id: ExprId) -> TempValue {
    let node = arena.get(id);
    match &node.kind {
        ExprKind::LocalRef { name } => local_slot(arena, id, name),

        ExprKind::ConstantInt(value) => match node.ctype {
            CType::CLong => TempValue {
                name: format!("{value}L"),
                ctype: CType::CLong,
            },
            _ => TempValue {
                name: format!("VEL_CONST_INT({value})"),
                ctype: CType::Object,
            },
        },

        ExprKind::ConstantStr(text) => TempValue {
            name: format!("VEL_CONST_STR(\"{}\")", escape_c(text)),
            ctype: CType::Object,
        },

        ExprKind::ConstantNone => TempValue {
            name: "VEL_NONE".to_owned(),
            ctype: CType::Object,
        },

        ExprKind::Binary { op, left, right } => {
            let to = ctx.declare_temp("binop", node.ctype);
            emit_binary_operation(
                ctx,
                arena,
                &to,
                *left,
                *right,
                *op,
                node.span,
                arena.may_raise(id),
                false,
            );
            to
        }

        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => emit_boolean_not(ctx, arena, id, *operand),

        ExprKind::Unary { op, operand } => {
            let to = ctx.declare_temp("unop", node.ctype);
            emit_unary_operation(ctx, arena, &to, *operand, *op, node.span, arena.may_raise(id));
            to
        }

        ExprKind::Comparison { op, left, right } => {
            let to = ctx.declare_temp("cmp", node.ctype);
            emit_comparison(
                ctx,
                arena,
                &to,
                *op,
                *left,
                *right,
                node.span,
                arena.may_raise(id),
            );
            to
        }

        ExprKind::BoolAnd { left, right } => {
            emit_bool_chain_value(ctx, arena, id, *left, *right, false)
        }
        ExprKind::BoolOr { left, right } => {
            emit_bool_chain_value(ctx, arena, id, *left, *right, true)
        }

        ExprKind::Conditional { guard, yes, no } => {
            emit_conditional_value(ctx, arena, id, *guard, *yes, *no)
        }

        ExprKind::Subscript { value, index } => {
            let to = ctx.declare_temp("subscript", node.ctype);
            emit_subscript(ctx, arena, &to, *value, *index, node.span, arena.may_raise(id));
            to
        }

        ExprKind::Attribute { value, name } => {
            let to = ctx.declare_temp("attr", node.ctype);
            emit_attribute(ctx, arena, &to, *value, name, arena.may_raise(id));
            to
        }

        ExprKind::Slice {
            value,
            lower,
            upper,
        } => {
            let to = ctx.declare_temp("slice", node.ctype);
            emit_slice(
                ctx,
                arena,
                &to,
                *value,
                *lower,
                *upper,
                node.span,
                arena.may_raise(id),
            );
            to
        }

        ExprKind::DictLiteral { pairs } => emit_dict_literal(ctx, arena, id, pairs),
    }
}

/// The handle for a rebindable local slot: a borrowed read of the
/// frame-owned variable.
pub(crate) fn local_slot(arena: &ExprArena, id: ExprId, name: &str) -> TempValue {
    TempValue {
        name: format!("var_{name}"),
        ctype: arena.ctype(id),
    }
}

/// Coerce a handle to the universal object representation at the C
/// level, for the generic dynamic-dispatch fallback paths.
pub(crate) fn coerce_to_object(ctx: &mut EmissionContext<'_>, value: &TempValue) -> TempValue {
    match value.ctype {
        CType::Object => value.clone(),
        CType::CLong => {
            let boxed = ctx.declare_temp("boxed", CType::Object);
            ctx.stmt(format!("{} = VEL_LONG_FROM_CLONG({});", boxed.name, value.name));
            ctx.emit_error_check(&boxed, true);
            ctx.add_cleanup(&boxed);
            boxed
        }
        CType::CBool => TempValue {
            // Boolean singletons are immortal; the handle stays borrowed.
            name: format!("VEL_BOOL_FROM_CBOOL({})", value.name),
            ctype: CType::Object,
        },
        CType::TriBool | CType::Void => {
            unreachable!("cannot coerce a {:?} result to an object", value.ctype)
        }
    }
}

/// Store an evaluated value into a destination handle, transferring
/// ownership. After this, `from` carries no obligation.
pub(crate) fn store_into(ctx: &mut EmissionContext<'_>, to: &TempValue, from: &TempValue) {
    if to.ctype == CType::Object {
        let obj = coerce_to_object(ctx, from);
        ctx.ensure_owned(&obj);
        ctx.stmt(format!("{} = {};", to.name, obj.name));
        ctx.transfer(&obj);
    } else if to.ctype == from.ctype {
        ctx.stmt(format!("{} = {};", to.name, from.name));
    } else if to.ctype == CType::CBool && from.ctype == CType::TriBool {
        ctx.stmt(format!(
            "{} = ({} == VEL_TRIBOOL_TRUE);",
            to.name, from.name
        ));
    } else {
        unreachable!(
            "no store from {:?} into {:?} representation",
            from.ctype, to.ctype
        );
    }
}

/// Move a generic object result into a destination of any
/// representation, consuming `from`'s obligation. Used after generic
/// fallback calls whose caller wanted a narrower result.
pub(crate) fn convert_into(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    from: &TempValue,
    needs_check: bool,
) {
    debug_assert!(from.ctype == CType::Object);
    match to.ctype {
        CType::Void => ctx.release(from),
        CType::Object => store_into(ctx, to, from),
        CType::CLong => {
            ctx.stmt(format!(
                "{} = VEL_CLONG_FROM_OBJECT({});",
                to.name, from.name
            ));
            ctx.emit_error_check_with("VEL_ERROR_OCCURRED()".to_owned(), to);
            ctx.release(from);
        }
        CType::TriBool => {
            ctx.stmt(format!("{} = VEL_TRUTH({});", to.name, from.name));
            ctx.emit_error_check(to, needs_check);
            ctx.release(from);
        }
        CType::CBool => {
            ctx.stmt(format!("{} = ({} == VEL_TRUE);", to.name, from.name));
            ctx.release(from);
        }
    }
}

/// Boolean `not` in value context: compute the operand's truth value,
/// invert it, wrap as needed. No helper selection is involved.
fn emit_boolean_not(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    operand: ExprId,
) -> TempValue {
    let value = emit_expression(ctx, arena, operand);
    let truth = emit_truth_value(ctx, arena, operand, &value);
    ctx.release(&value);
    let inverted = ctx.declare_temp("not", CType::CBool);
    ctx.stmt(format!("{} = !{};", inverted.name, truth_is_true(&truth)));
    match arena.ctype(id) {
        CType::CBool => inverted,
        _ => TempValue {
            name: format!("VEL_BOOL_FROM_CBOOL({})", inverted.name),
            ctype: CType::Object,
        },
    }
}

/// Short-circuit `and`/`or` in value context.
///
/// The left operand is evaluated once; its truth value picks either the
/// "keep the left value" branch or the "evaluate the right operand"
/// branch. Both branches must agree that the destination owns the
/// surviving value at the merge label, so after both are emitted the
/// branch that kept a borrowed value is amended with a spliced
/// take-reference.
fn emit_bool_chain_value(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    left: ExprId,
    right: ExprId,
    is_or: bool,
) -> TempValue {
    let to = ctx.declare_temp(if is_or { "or_value" } else { "and_value" }, arena.ctype(id));
    let lval = emit_expression(ctx, arena, left);
    let truth = emit_truth_value(ctx, arena, left, &lval);

    let keep_label = ctx.fresh_label(if is_or { "or_keep" } else { "and_keep" });
    let rhs_label = ctx.fresh_label(if is_or { "or_right" } else { "and_right" });
    let end_label = ctx.fresh_label(if is_or { "or_end" } else { "and_end" });

    // `or` keeps the left value when it is true, `and` when it is false.
    let cond = truth_is_true(&truth);
    if is_or {
        ctx.stmt(format!("if ({cond}) goto {keep_label}; else goto {rhs_label};"));
    } else {
        ctx.stmt(format!("if ({cond}) goto {rhs_label}; else goto {keep_label};"));
    }

    ctx.push(Instr::Label(keep_label));
    let keep_checkpoint = ctx.checkpoint();
    let left_owned = ctx.needs_cleanup(&lval);
    let mut needs_splice = false;
    if lval.ctype == CType::Object && to.ctype == CType::Object {
        ctx.stmt(format!("{} = {};", to.name, lval.name));
        if left_owned {
            ctx.transfer(&lval);
        } else {
            needs_splice = true;
        }
    } else {
        store_into(ctx, &to, &lval);
    }
    ctx.push(Instr::Goto(end_label.clone()));

    ctx.push(Instr::Label(rhs_label));
    if left_owned {
        // The obligation transferred into the destination on the keep
        // branch; this runtime path still holds the reference and must
        // drop it before the right operand replaces it.
        ctx.push(Instr::ReleaseRef(lval.name.clone()));
    }
    let rval = emit_expression(ctx, arena, right);
    store_into(ctx, &to, &rval);
    ctx.push(Instr::Label(end_label));

    if needs_splice {
        // The keep branch stored a borrowed value; retroactively give
        // the destination its own reference on that branch only.
        ctx.splice_at(keep_checkpoint, Instr::TakeRef(lval.name.clone()));
    }
    if to.ctype.holds_reference() {
        ctx.add_cleanup(&to);
    }
    to
}

/// Conditional (ternary) expression in value context: compile the guard
/// as a condition, evaluate exactly one arm, and let both arms store an
/// owned value into the shared destination.
fn emit_conditional_value(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    guard: ExprId,
    yes: ExprId,
    no: ExprId,
) -> TempValue {
    let to = ctx.declare_temp("cond_value", arena.ctype(id));
    let true_label = ctx.fresh_label("condexpr_true");
    let false_label = ctx.fresh_label("condexpr_false");
    let end_label = ctx.fresh_label("condexpr_end");

    emit_condition(ctx, arena, guard, &true_label, &false_label);

    ctx.push(Instr::Label(true_label));
    let yes_val = emit_expression(ctx, arena, yes);
    store_into(ctx, &to, &yes_val);
    ctx.push(Instr::Goto(end_label.clone()));

    ctx.push(Instr::Label(false_label));
    let no_val = emit_expression(ctx, arena, no);
    store_into(ctx, &to, &no_val);
    ctx.push(Instr::Label(end_label));

    if to.ctype.holds_reference() {
        ctx.add_cleanup(&to);
    }
    to
}

/// Dict literal. Pair evaluation order follows the dialect rule: key
/// before value from dialect 3.5 on, value before key in older
/// dialects.
fn emit_dict_literal(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    pairs: &[(ExprId, ExprId)],
) -> TempValue {
    let to = ctx.declare_temp("dict", CType::Object);
    ctx.stmt(format!("{} = VEL_DICT_NEW();", to.name));
    ctx.emit_error_check(&to, true);
    ctx.add_cleanup(&to);

    for &(key, value) in pairs {
        let (key_val, value_val) = if ctx.version.dict_pairs_key_first() {
            let k = emit_expression(ctx, arena, key);
            let v = emit_expression(ctx, arena, value);
            (k, v)
        } else {
            let v = emit_expression(ctx, arena, value);
            let k = emit_expression(ctx, arena, key);
            (k, v)
        };
        let key_obj = coerce_to_object(ctx, &key_val);
        let value_obj = coerce_to_object(ctx, &value_val);
        let status = ctx.declare_temp("dict_set", CType::TriBool);
        ctx.stmt(format!(
            "{} = VEL_DICT_SET({}, {}, {});",
            status.name, to.name, key_obj.name, value_obj.name
        ));
        ctx.emit_error_check(&status, arena.may_raise(id));
        ctx.release(&key_obj);
        ctx.release(&value_obj);
    }
    to
}

/// Escape a literal for embedding in C source.
pub(crate) fn escape_c(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
