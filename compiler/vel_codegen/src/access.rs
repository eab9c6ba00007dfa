//! Subscript, attribute, and slice emission.
//!
//! Each family has a compile-time fast path decided before any generic
//! code is considered: a statically-known small-integer subscript
//! constant bypasses index-object creation, and the object-dictionary /
//! object-class pseudo-attributes dispatch on the literal attribute
//! name alone, not on shape analysis.

use vel_ir::{ExprArena, ExprId, Span};
use vel_shapes::CType;

use crate::context::{EmissionContext, TempValue};
use crate::expr::{coerce_to_object, convert_into, emit_expression, escape_c};

/// Emit `value[index]` into `to`.
pub fn emit_subscript(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    value: ExprId,
    index: ExprId,
    span: Span,
    needs_check: bool,
) {
    let container = emit_expression(ctx, arena, value);
    let container_obj = coerce_to_object(ctx, &container);

    if let Some(constant) = arena.as_constant_index(index) {
        // Fast path: the index is a compile-time small integer; no
        // index object is materialized.
        let dest = object_dest(ctx, to);
        ctx.stmt(format!(
            "{} = LOOKUP_SUBSCRIPT_CONST({}, {}L);",
            dest.name, container_obj.name, constant
        ));
        finish_lookup(ctx, to, &dest, &[&container_obj], needs_check);
        return;
    }
    if arena.is_compile_time_constant(index) {
        // A constant index the fast path cannot take yet.
        let site = ctx.location(span);
        ctx.sink_mut()
            .report_missing_optimization("subscript with a non-integer constant index", site);
    }

    let index_val = emit_expression(ctx, arena, index);
    let index_obj = coerce_to_object(ctx, &index_val);
    let dest = object_dest(ctx, to);
    ctx.stmt(format!(
        "{} = LOOKUP_SUBSCRIPT({}, {});",
        dest.name, container_obj.name, index_obj.name
    ));
    finish_lookup(ctx, to, &dest, &[&container_obj, &index_obj], needs_check);
}

/// Emit `value.name` into `to`.
pub fn emit_attribute(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    value: ExprId,
    name: &str,
    needs_check: bool,
) {
    let receiver = emit_expression(ctx, arena, value);
    let receiver_obj = coerce_to_object(ctx, &receiver);
    let dest = object_dest(ctx, to);

    // The pseudo-attributes dispatch on the literal name at compile
    // time; everything else goes through the generic lookup.
    match name {
        "__dict__" => ctx.stmt(format!(
            "{} = LOOKUP_ATTRIBUTE_DICT_SLOT({});",
            dest.name, receiver_obj.name
        )),
        "__class__" => ctx.stmt(format!(
            "{} = LOOKUP_ATTRIBUTE_CLASS_SLOT({});",
            dest.name, receiver_obj.name
        )),
        _ => ctx.stmt(format!(
            "{} = LOOKUP_ATTRIBUTE({}, VEL_CONST_STR(\"{}\"));",
            dest.name,
            receiver_obj.name,
            escape_c(name)
        )),
    }
    finish_lookup(ctx, to, &dest, &[&receiver_obj], needs_check);
}

/// Emit `value[lower:upper]` into `to`.
#[expect(clippy::too_many_arguments, reason = "mirrors the operation-site contract")]
pub fn emit_slice(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    to: &TempValue,
    value: ExprId,
    lower: Option<ExprId>,
    upper: Option<ExprId>,
    span: Span,
    needs_check: bool,
) {
    let container = emit_expression(ctx, arena, value);
    let container_obj = coerce_to_object(ctx, &container);

    // Fast path: both bounds are compile-time indices, so the direct
    // index-taking helper runs without bound objects.
    if let (Some(lo), Some(hi)) = (lower, upper) {
        if let (Some(lo_const), Some(hi_const)) =
            (arena.as_constant_index(lo), arena.as_constant_index(hi))
        {
            let dest = object_dest(ctx, to);
            ctx.stmt(format!(
                "{} = LOOKUP_INDEX_SLICE({}, {}L, {}L);",
                dest.name, container_obj.name, lo_const, hi_const
            ));
            finish_lookup(ctx, to, &dest, &[&container_obj], needs_check);
            return;
        }
        if arena.is_compile_time_constant(lo) && arena.is_compile_time_constant(hi) {
            let site = ctx.location(span);
            ctx.sink_mut()
                .report_missing_optimization("slice with non-integer constant bounds", site);
        }
    }

    let lower_obj = slice_bound(ctx, arena, lower);
    let upper_obj = slice_bound(ctx, arena, upper);
    let dest = object_dest(ctx, to);
    ctx.stmt(format!(
        "{} = LOOKUP_SLICE({}, {}, {});",
        dest.name, container_obj.name, lower_obj.name, upper_obj.name
    ));
    finish_lookup(
        ctx,
        to,
        &dest,
        &[&container_obj, &lower_obj, &upper_obj],
        needs_check,
    );
}

/// Evaluate an optional slice bound; an absent bound is the borrowed
/// none singleton.
fn slice_bound(
    ctx: &mut EmissionContext<'_>,
    arena: &ExprArena,
    bound: Option<ExprId>,
) -> TempValue {
    match bound {
        Some(id) => {
            let val = emit_expression(ctx, arena, id);
            coerce_to_object(ctx, &val)
        }
        None => TempValue {
            name: "VEL_NONE".to_owned(),
            ctype: CType::Object,
        },
    }
}

/// The object-typed destination a lookup call assigns into: the caller's
/// handle when it is object-typed, a fresh temp otherwise.
fn object_dest(ctx: &mut EmissionContext<'_>, to: &TempValue) -> TempValue {
    if to.ctype == CType::Object {
        to.clone()
    } else {
        ctx.declare_temp("lookup", CType::Object)
    }
}

/// Shared tail of every lookup: error check with the operand
/// obligations still live, release the operands, own the result, and
/// convert into a narrower destination when the caller asked for one.
fn finish_lookup(
    ctx: &mut EmissionContext<'_>,
    to: &TempValue,
    dest: &TempValue,
    operands: &[&TempValue],
    needs_check: bool,
) {
    ctx.emit_error_check(dest, needs_check);
    ctx.add_cleanup(dest);
    for operand in operands {
        ctx.release(operand);
    }
    if dest.name != to.name {
        convert_into(ctx, to, dest, needs_check);
    }
}
