//! Boolean-context compilation.
//!
//! Conditions compile straight into branchy control flow against
//! caller-supplied true/false labels instead of materializing a
//! temporary boolean value. The recursion is structural over the
//! expression kind: `not` swaps the labels and emits nothing, a ternary
//! guard forwards both arms to the original targets, and `and`/`or`
//! evaluate their left operand exactly once. Whenever taking a truth
//! value can raise, the error-exit sequence is emitted before any
//! branching code for that sub-expression.

use vel_ir::{ExprArena, ExprId, ExprKind, UnaryOp};
use vel_shapes::CType;

use crate::compare::emit_comparison;
use crate::context::{EmissionContext, TempValue};
use crate::expr::emit_expression;
use crate::instr::Instr;

/// Compile `id` as a condition, jumping to `true_label` or
/// `false_label`.
pub fn emit_condition(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    true_label: &str,
    false_label: &str,
) {
    let node = arena.get(id);
    match &node.kind {
        ExprKind::Comparison { op, left, right } => {
            // Boolean-result comparison, then branch on the outcome.
            let desired = if arena.may_raise(id) {
                CType::TriBool
            } else {
                CType::CBool
            };
            let outcome = ctx.declare_temp("cond_cmp", desired);
            emit_comparison(
                ctx,
                arena,
                &outcome,
                *op,
                *left,
                *right,
                node.span,
                arena.may_raise(id),
            );
            branch_on_truth(ctx, &outcome, true_label, false_label);
        }

        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            // Negation swaps the continuation targets; no code.
            emit_condition(ctx, arena, *operand, false_label, true_label);
        }

        ExprKind::Conditional { guard, yes, no } => {
            let select_true = ctx.fresh_label("cond_select_true");
            let select_false = ctx.fresh_label("cond_select_false");
            emit_condition(ctx, arena, *guard, &select_true, &select_false);
            ctx.push(Instr::Label(select_true));
            emit_condition(ctx, arena, *yes, true_label, false_label);
            ctx.push(Instr::Label(select_false));
            emit_condition(ctx, arena, *no, true_label, false_label);
        }

        ExprKind::BoolAnd { left, right } => {
            let rhs_label = ctx.fresh_label("and_rhs");
            let lval = emit_expression(ctx, arena, *left);
            let truth = emit_truth_value(ctx, arena, *left, &lval);
            ctx.release(&lval);
            branch_on_truth(ctx, &truth, &rhs_label, false_label);
            ctx.push(Instr::Label(rhs_label));
            emit_condition(ctx, arena, *right, true_label, false_label);
        }

        ExprKind::BoolOr { left, right } => {
            let rhs_label = ctx.fresh_label("or_rhs");
            let lval = emit_expression(ctx, arena, *left);
            let truth = emit_truth_value(ctx, arena, *left, &lval);
            ctx.release(&lval);
            branch_on_truth(ctx, &truth, true_label, &rhs_label);
            ctx.push(Instr::Label(rhs_label));
            emit_condition(ctx, arena, *right, true_label, false_label);
        }

        _ => {
            // Generic fallback: evaluate, truth-check, branch.
            let val = emit_expression(ctx, arena, id);
            let truth = emit_truth_value(ctx, arena, id, &val);
            ctx.release(&val);
            branch_on_truth(ctx, &truth, true_label, false_label);
        }
    }
}

/// Compute the truth value of an evaluated expression.
///
/// Object handles go through the generic truth check, whose error exit
/// is emitted here — before any branch the caller will add. Value-typed
/// handles convert directly and cannot raise.
pub(crate) fn emit_truth_value(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    id: ExprId,
    value: &TempValue,
) -> TempValue {
    match value.ctype {
        CType::CBool | CType::TriBool => value.clone(),
        CType::CLong => {
            let truth = ctx.declare_temp("truth", CType::CBool);
            ctx.stmt(format!("{} = ({} != 0L);", truth.name, value.name));
            truth
        }
        CType::Object => {
            let truth = ctx.declare_temp("truth", CType::TriBool);
            ctx.stmt(format!("{} = VEL_TRUTH({});", truth.name, value.name));
            ctx.emit_error_check(&truth, arena.truth_may_raise(id));
            truth
        }
        CType::Void => unreachable!("truth value of a discarded result"),
    }
}

/// C expression testing a computed truth handle for "is true".
pub(crate) fn truth_is_true(truth: &TempValue) -> String {
    match truth.ctype {
        CType::CBool => truth.name.clone(),
        CType::TriBool => format!("({} == VEL_TRIBOOL_TRUE)", truth.name),
        _ => unreachable!("{:?} is not a truth representation", truth.ctype),
    }
}

/// Branch on a computed truth handle.
pub(crate) fn branch_on_truth(
    ctx: &mut EmissionContext<'_>,
    truth: &TempValue,
    true_label: &str,
    false_label: &str,
) {
    ctx.stmt(format!(
        "if ({}) goto {true_label}; else goto {false_label};",
        truth_is_true(truth)
    ));
}
