//! Statement emission and the module frame.

use rustc_hash::FxHashSet;
use vel_ir::{ExprArena, ExprId, ExprKind, Module, Stmt, StmtKind};
use vel_shapes::CType;

use crate::context::{EmissionContext, TempValue};
use crate::expr::{coerce_to_object, convert_into, emit_expression, local_slot};
use crate::condition::emit_condition;
use crate::instr::Instr;
use crate::operations::emit_binary_operation;

/// Emit one statement.
pub fn emit_statement(ctx: &mut EmissionContext<'_>, arena: &ExprArena, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            let slot = slot_handle(arena, *target);
            let val = emit_expression(ctx, arena, *value);
            if slot.ctype == CType::Object {
                let obj = coerce_to_object(ctx, &val);
                ctx.ensure_owned(&obj);
                // Release the slot's old value, then move the new
                // reference in; the obligation transfers to the frame.
                ctx.stmt(format!("VEL_XUNREF({});", slot.name));
                ctx.stmt(format!("{} = {};", slot.name, obj.name));
                ctx.transfer(&obj);
            } else if val.ctype == slot.ctype {
                ctx.stmt(format!("{} = {};", slot.name, val.name));
            } else {
                let obj = coerce_to_object(ctx, &val);
                convert_into(ctx, &slot, &obj, true);
            }
        }

        StmtKind::AugAssign { target, op, value } => {
            let slot = slot_handle(arena, *target);
            let needs_check = slot.ctype == CType::Object || arena.may_raise(*value);
            emit_binary_operation(
                ctx,
                arena,
                &slot,
                *target,
                *value,
                *op,
                stmt.span,
                needs_check,
                true,
            );
        }

        StmtKind::ExprStmt { value } => match &arena.get(*value).kind {
            // A discarded binary operation asks for the discard-result
            // convention; selection degrades it when only the tri-state
            // variant exists.
            ExprKind::Binary { op, left, right } => {
                emit_binary_operation(
                    ctx,
                    arena,
                    &TempValue::discard(),
                    *left,
                    *right,
                    *op,
                    stmt.span,
                    arena.may_raise(*value),
                    false,
                );
            }
            _ => {
                let val = emit_expression(ctx, arena, *value);
                ctx.release(&val);
            }
        },

        StmtKind::If {
            condition,
            then_body,
            else_body,
        } => {
            let then_label = ctx.fresh_label("if_then");
            let else_label = ctx.fresh_label("if_else");
            let end_label = ctx.fresh_label("if_end");
            emit_condition(ctx, arena, *condition, &then_label, &else_label);
            ctx.push(Instr::Label(then_label));
            for inner in then_body {
                emit_statement(ctx, arena, inner);
            }
            ctx.push(Instr::Goto(end_label.clone()));
            ctx.push(Instr::Label(else_label));
            for inner in else_body {
                emit_statement(ctx, arena, inner);
            }
            ctx.push(Instr::Label(end_label));
        }
    }
}

/// Emit a whole module body into the context.
pub fn emit_module_body(ctx: &mut EmissionContext<'_>, arena: &ExprArena, module: &Module) {
    for stmt in &module.body {
        emit_statement(ctx, arena, stmt);
    }
}

/// The frame-owned handle behind an assignment target.
///
/// Anything but a rebindable local slot here is a bug in the front end,
/// not a property of the input program.
fn slot_handle(arena: &ExprArena, target: ExprId) -> TempValue {
    match &arena.get(target).kind {
        ExprKind::LocalRef { name } => local_slot(arena, target, name),
        other => panic!("assignment target must be a rebindable slot, got {other:?}"),
    }
}

/// Local slots assigned anywhere in the module, with their C types, in
/// first-assignment order.
pub fn collect_locals(arena: &ExprArena, module: &Module) -> Vec<(String, CType)> {
    let mut seen = FxHashSet::default();
    let mut locals = Vec::new();
    collect_from(arena, &module.body, &mut seen, &mut locals);
    locals
}

fn collect_from(
    arena: &ExprArena,
    body: &[Stmt],
    seen: &mut FxHashSet<String>,
    locals: &mut Vec<(String, CType)>,
) {
    for stmt in body {
        match &stmt.kind {
            StmtKind::Assign { target, .. } | StmtKind::AugAssign { target, .. } => {
                if let ExprKind::LocalRef { name } = &arena.get(*target).kind {
                    if seen.insert(name.clone()) {
                        locals.push((name.clone(), arena.ctype(*target)));
                    }
                }
            }
            StmtKind::If {
                then_body,
                else_body,
                ..
            } => {
                collect_from(arena, then_body, seen, locals);
                collect_from(arena, else_body, seen, locals);
            }
            StmtKind::ExprStmt { .. } => {}
        }
    }
}
