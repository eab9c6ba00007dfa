//! Comparison emission.
//!
//! Rich comparisons go through shape-based helper selection with
//! boolean-family result kinds. Identity (`is`/`is not`) and membership
//! (`in`/`not in`) are representation-independent: they compile to
//! direct native forms and never consult the availability table.

use vel_helpers::{select_comparison, CompareFamily, OperandRepr};
use vel_ir::{ComparisonOp, ExprArena, ExprId, Span};
use vel_shapes::CType;

use crate::context::{EmissionContext, TempValue};
use crate::expr::{coerce_to_object, convert_into, emit_expression};

/// Emit a comparison into `to`.
#[expect(clippy::too_many_arguments, reason = "mirrors the operation-site contract")]
pub fn emit_comparison(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    op: ComparisonOp,
    left: ExprId,
    right: ExprId,
    span: Span,
    needs_check: bool,
) {
    let lval = emit_expression(ctx, arena, left);
    let rval = emit_expression(ctx, arena, right);

    match op {
        ComparisonOp::Is | ComparisonOp::IsNot => {
            emit_identity(ctx, to, &lval, &rval, op == ComparisonOp::Is);
        }
        ComparisonOp::In | ComparisonOp::NotIn => {
            emit_membership(
                ctx,
                to,
                &lval,
                &rval,
                op == ComparisonOp::In,
                needs_check,
            );
        }
        _ => {
            let family = CompareFamily::from_op(op)
                .unwrap_or_else(|| unreachable!("{op:?} is not a rich comparison"));
            let lrepr = OperandRepr::new(arena.shape(left), arena.ctype(left));
            let rrepr = OperandRepr::new(arena.shape(right), arena.ctype(right));
            let site = ctx.location(span);
            let outcome = select_comparison(
                ctx.helpers,
                family,
                lrepr,
                rrepr,
                to.ctype,
                &site,
                ctx.sink_mut(),
            );
            if let Some(selected) = outcome.selected {
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
                ctx.release(&lval);
                ctx.release(&rval);
            } else {
                let lobj = coerce_to_object(ctx, &lval);
                let robj = coerce_to_object(ctx, &rval);
                let dest = if to.ctype == CType::Object {
                    to.clone()
                } else {
                    ctx.declare_temp("fallback", CType::Object)
                };
                ctx.stmt(format!(
                    "{} = RICH_COMPARE_{}_OBJECT_OBJECT_OBJECT({}, {});",
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
        }
    }
}

/// Pointer identity. Never raises, so no error check is emitted.
fn emit_identity(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    lval: &TempValue,
    rval: &TempValue,
    positive: bool,
) {
    let operator = if positive { "==" } else { "!=" };
    let test = format!("({} {} {})", lval.name, operator, rval.name);
    match to.ctype {
        CType::CBool => ctx.stmt(format!("{} = {};", to.name, test)),
        CType::TriBool => ctx.stmt(format!(
            "{} = {} ? VEL_TRIBOOL_TRUE : VEL_TRIBOOL_FALSE;",
            to.name, test
        )),
        _ => {
            // Boolean singletons are immortal; the store stays borrowed.
            ctx.stmt(format!("{} = VEL_BOOL_FROM_CBOOL({});", to.name, test));
        }
    }
    ctx.release(lval);
    ctx.release(rval);
}

/// Membership through the direct native containment check.
fn emit_membership(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    item: &TempValue,
    container: &TempValue,
    positive: bool,
    needs_check: bool,
) {
    let item_obj = coerce_to_object(ctx, item);
    let container_obj = coerce_to_object(ctx, container);
    let found = ctx.declare_temp("contains", CType::TriBool);
    ctx.stmt(format!(
        "{} = VEL_SEQUENCE_CONTAINS({}, {});",
        found.name, item_obj.name, container_obj.name
    ));
    ctx.emit_error_check(&found, needs_check);
    ctx.release(&item_obj);
    ctx.release(&container_obj);

    let wanted = if positive {
        "VEL_TRIBOOL_TRUE"
    } else {
        "VEL_TRIBOOL_FALSE"
    };
    match to.ctype {
        CType::CBool => ctx.stmt(format!("{} = ({} == {});", to.name, found.name, wanted)),
        CType::TriBool => {
            if positive {
                ctx.stmt(format!("{} = {};", to.name, found.name));
            } else {
                ctx.stmt(format!("{} = VEL_TRIBOOL_INVERT({});", to.name, found.name));
            }
        }
        _ => ctx.stmt(format!(
            "{} = VEL_BOOL_FROM_CBOOL(({} == {}));",
            to.name, found.name, wanted
        )),
    }
}
