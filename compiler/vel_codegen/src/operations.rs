//! Binary and unary operation emission.
//!
//! Operands are evaluated in source order, a specialized helper is
//! selected from the operands' shapes and C types, and the call is
//! emitted with the standard error-exit and cleanup contract. When
//! selection misses, the fully generic dynamic-dispatch form is emitted
//! instead — with both operands coerced to the universal representation
//! and their cleanup obligations kept alive across the error exit.

use vel_helpers::{
    select_binary_operation, select_inplace_operation, select_unary_operation, BinaryOpFamily,
    OperandRepr, UnaryOpFamily,
};
use vel_ir::{BinaryOp, ExprArena, ExprId, ExprKind, Span, UnaryOp};
use vel_shapes::CType;

use crate::context::{EmissionContext, TempValue};
use crate::expr::{coerce_to_object, convert_into, emit_expression};
use crate::instr::Instr;

/// Emit a binary operation into `to`.
///
/// With `in_place` set, the operation targets the "mutate first
/// operand" convention: a rebindable left slot has its address passed
/// to the helper, any other left operand is given an owned reference
/// first because the helper may destructively reuse its storage.
#[expect(clippy::too_many_arguments, reason = "mirrors the operation-site contract")]
pub fn emit_binary_operation(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    left: ExprId,
    right: ExprId,
    op: BinaryOp,
    span: Span,
    needs_check: bool,
    in_place: bool,
) {
    let lval = emit_expression(ctx, arena, left);
    let rval = emit_expression(ctx, arena, right);

    let family = BinaryOpFamily::from_op(op);
    let lrepr = OperandRepr::new(arena.shape(left), arena.ctype(left));
    let rrepr = OperandRepr::new(arena.shape(right), arena.ctype(right));
    let site = ctx.location(span);

    let gate = operand_gate(ctx, arena, &[left, right]);
    if let Some(guard) = gate {
        ctx.push(Instr::GuardBegin(guard));
    }

    if in_place {
        let left_is_slot = matches!(arena.get(left).kind, ExprKind::LocalRef { .. });
        let outcome =
            select_inplace_operation(ctx.helpers, family, lrepr, rrepr, &site, ctx.sink_mut());
        if let Some(selected) = outcome.selected {
            if !left_is_slot {
                ctx.ensure_owned(&lval);
            }
            let ok = ctx.declare_temp("inplace_ok", CType::CBool);
            ctx.stmt(format!(
                "{} = {}(&{}, {});",
                ok.name, selected.helper, lval.name, rval.name
            ));
            if needs_check {
                ctx.emit_error_check_with(format!("{} == false", ok.name), &ok);
            }
            ctx.release(&rval);
            if !left_is_slot {
                // The mutated value lives in the operand's storage now;
                // move it into the destination.
                ctx.stmt(format!("{} = {};", to.name, lval.name));
                if ctx.needs_cleanup(&lval) {
                    ctx.transfer(&lval);
                    if to.ctype.holds_reference() {
                        ctx.add_cleanup(to);
                    }
                }
            }
        } else {
            emit_inplace_fallback(ctx, to, left_is_slot, &lval, &rval, family, needs_check);
        }
    } else {
        let outcome = select_binary_operation(
            ctx.helpers,
            family,
            lrepr,
            rrepr,
            to.ctype,
            &site,
            ctx.sink_mut(),
        );
        if let Some(selected) = outcome.selected {
            if selected.result == CType::Void {
                ctx.stmt(format!("{}({}, {});", selected.helper, lval.name, rval.name));
                ctx.emit_error_check(&TempValue::discard(), needs_check);
            } else {
                // A degraded result (discard request widened to the
                // tri-state boolean) lands in its own temp; the caller's
                // discard target has no storage.
                let dest = if selected.result == to.ctype {
                    to.clone()
                } else {
                    ctx.declare_temp("degraded", selected.result)
                };
                ctx.stmt(format!(
                    "{} = {}({}, {});",
                    dest.name, selected.helper, lval.name, rval.name
                ));
                ctx.emit_error_check(&dest, needs_check);
                if dest.name == to.name && dest.ctype.holds_reference() {
                    ctx.add_cleanup(&dest);
                }
            }
            ctx.release(&lval);
            ctx.release(&rval);
        } else {
            emit_generic_binary(ctx, to, &lval, &rval, family, needs_check);
        }
    }

    if gate.is_some() {
        ctx.push(Instr::GuardEnd);
    }
}

/// The fully generic binary form: both operands at the universal
/// representation, object result, converted into the destination's
/// representation afterwards if it is narrower.
fn emit_generic_binary(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    lval: &TempValue,
    rval: &TempValue,
    family: BinaryOpFamily,
    needs_check: bool,
) {
    let lobj = coerce_to_object(ctx, lval);
    let robj = coerce_to_object(ctx, rval);
    let dest = if to.ctype == CType::Object {
        to.clone()
    } else {
        ctx.declare_temp("fallback", CType::Object)
    };
    ctx.stmt(format!(
        "{} = BINARY_OPERATION_{}_OBJECT_OBJECT_OBJECT({}, {});",
        dest.name,
        family.tag(),
        lobj.name,
        robj.name
    ));
    ctx.emit_error_check(&dest, needs_check);
    ctx.add_cleanup(&dest);
    ctx.release(&lobj);
    ctx.release(&robj);
    if dest.name != to.name {
        convert_into(ctx, to, &dest, needs_check);
    }
}

/// Generic fallback for a missed in-place selection: compute the fresh
/// value generically, then rebind the slot (or move into the
/// destination temp).
fn emit_inplace_fallback(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    left_is_slot: bool,
    lval: &TempValue,
    rval: &TempValue,
    family: BinaryOpFamily,
    needs_check: bool,
) {
    let lobj = coerce_to_object(ctx, lval);
    let robj = coerce_to_object(ctx, rval);
    let res = ctx.declare_temp("inplace_fallback", CType::Object);
    ctx.stmt(format!(
        "{} = BINARY_OPERATION_{}_OBJECT_OBJECT_OBJECT({}, {});",
        res.name,
        family.tag(),
        lobj.name,
        robj.name
    ));
    ctx.emit_error_check(&res, needs_check);
    ctx.add_cleanup(&res);
    ctx.release(&robj);
    ctx.release(&lobj);

    if left_is_slot && to.ctype == CType::Object {
        // Drop the slot's old value, write the fresh one back.
        ctx.stmt(format!("VEL_XUNREF({});", to.name));
        ctx.stmt(format!("{} = {};", to.name, res.name));
        ctx.transfer(&res);
    } else if left_is_slot {
        convert_into(ctx, to, &res, needs_check);
    } else {
        ctx.stmt(format!("{} = {};", to.name, res.name));
        ctx.transfer(&res);
        if to.ctype.holds_reference() {
            ctx.add_cleanup(to);
        }
    }
}

/// Emit a unary operation into `to`.
///
/// Boolean `not` never arrives here; the condition compiler and the
/// value emitter handle it structurally.
pub fn emit_unary_operation(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    operand: ExprId,
    op: UnaryOp,
    span: Span,
    needs_check: bool,
) {
    let Some(family) = UnaryOpFamily::from_op(op) else {
        unreachable!("boolean not is compiled structurally, not as an operation");
    };
    let val = emit_expression(ctx, arena, operand);
    let repr = OperandRepr::new(arena.shape(operand), arena.ctype(operand));
    let site = ctx.location(span);

    let gate = operand_gate(ctx, arena, &[operand]);
    if let Some(guard) = gate {
        ctx.push(Instr::GuardBegin(guard));
    }

    let outcome =
        select_unary_operation(ctx.helpers, family, repr, to.ctype, &site, ctx.sink_mut());
    if let Some(selected) = outcome.selected {
        let dest = if selected.result == to.ctype {
            to.clone()
        } else {
            ctx.declare_temp("degraded", selected.result)
        };
        ctx.stmt(format!("{} = {}({});", dest.name, selected.helper, val.name));
        ctx.emit_error_check(&dest, needs_check);
        if dest.name == to.name && dest.ctype.holds_reference() {
            ctx.add_cleanup(&dest);
        }
        ctx.release(&val);
    } else {
        let obj = coerce_to_object(ctx, &val);
        let dest = if to.ctype == CType::Object {
            to.clone()
        } else {
            ctx.declare_temp("fallback", CType::Object)
        };
        ctx.stmt(format!(
            "{} = UNARY_OPERATION_{}_OBJECT_OBJECT({});",
            dest.name,
            family.tag(),
            obj.name
        ));
        ctx.emit_error_check(&dest, needs_check);
        ctx.add_cleanup(&dest);
        ctx.release(&obj);
        if dest.name != to.name {
            convert_into(ctx, to, &dest, needs_check);
        }
    }

    if gate.is_some() {
        ctx.push(Instr::GuardEnd);
    }
}

/// The conditional-compilation guard covering any version-gated operand
/// shape, when the gate admits the current dialect.
fn operand_gate(
    ctx: &EmissionContext<'_>,
    arena: &ExprArena,
    operands: &[ExprId],
) -> Option<&'static str> {
    for &id in operands {
        if let Some(gate) = arena.shape(id).version_gate() {
            if gate.admits(ctx.version) {
                return Some(gate.guard_macro());
            }
        }
    }
    None
}
