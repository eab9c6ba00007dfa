//! Specialized-helper selection.
//!
//! Given an operation family and the operands' shapes and C types,
//! selection walks a bounded degrade sequence and returns either a
//! specialized helper with its result C type, or nothing — in which case
//! the caller must emit the fully generic dynamic-dispatch operation.
//! Selection failure is never fatal to compilation.

use vel_diagnostic::ReportingSink;
use vel_ir::SourceLocation;
use vel_shapes::{CType, Shape};

use crate::family::{BinaryOpFamily, CompareFamily, UnaryOpFamily};
use crate::names::{
    binary_operation_name, inplace_operation_name, rich_compare_name, unary_operation_name,
    HelperName,
};
use crate::table::HelperTable;

/// One operand as the emitters see it: an inferred shape plus the C
/// representation the value currently travels in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandRepr {
    pub shape: Shape,
    pub ctype: CType,
}

impl OperandRepr {
    /// Create an operand representation.
    pub const fn new(shape: Shape, ctype: CType) -> Self {
        OperandRepr { shape, ctype }
    }

    /// The code this operand contributes to helper names.
    ///
    /// A statically-narrowed C representation overrides the shape's own
    /// code: narrower C types get their own specialized fast helpers.
    pub const fn helper_code(self) -> &'static str {
        match self.ctype {
            CType::Object => self.shape.helper_code(),
            narrowed => narrowed.helper_code(),
        }
    }
}

/// A successful selection: the helper to call and the C type its result
/// arrives in (which may differ from the desired type after a degrade).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedHelper {
    pub result: CType,
    pub helper: HelperName,
}

/// Outcome of one selection, with the number of distinct result-type
/// candidates attempted (never more than two: one initial, one degrade).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selected: Option<SelectedHelper>,
    pub attempts: usize,
}

impl SelectionOutcome {
    fn hit(result: CType, helper: HelperName, attempts: usize) -> Self {
        SelectionOutcome {
            selected: Some(SelectedHelper { result, helper }),
            attempts,
        }
    }

    fn miss(attempts: usize) -> Self {
        SelectionOutcome {
            selected: None,
            attempts,
        }
    }
}

/// Walk the degrade sequence for a fully-built candidate name factory.
///
/// Exactly one degrade step exists: a failing discard-result request is
/// retried with the tri-state boolean result (discard-result helpers are
/// only generated for the hottest combinations), and any other failing
/// result kind gives up immediately. On total failure the last attempted
/// name decides between silent fallback and a missing-helper report.
fn degrade_walk(
    table: &HelperTable,
    desired: CType,
    make_name: impl Fn(CType) -> HelperName,
    site: &SourceLocation,
    sink: &mut ReportingSink,
) -> SelectionOutcome {
    let mut result = desired;
    let mut attempts = 0;
    loop {
        let name = make_name(result);
        attempts += 1;
        if table.is_specialized(&name) {
            return SelectionOutcome::hit(result, name, attempts);
        }
        if result == CType::Void {
            result = CType::TriBool;
            continue;
        }
        if !table.is_known_nonspecialized(&name) {
            tracing::debug!(helper = %name, site = %site, "missing specialized helper");
            sink.report_missing_helper(name.as_str(), site.clone());
        }
        return SelectionOutcome::miss(attempts);
    }
}

/// Select a specialized binary-operation helper.
pub fn select_binary_operation(
    table: &HelperTable,
    family: BinaryOpFamily,
    left: OperandRepr,
    right: OperandRepr,
    desired: CType,
    site: &SourceLocation,
    sink: &mut ReportingSink,
) -> SelectionOutcome {
    let lcode = left.helper_code();
    let rcode = right.helper_code();
    degrade_walk(
        table,
        desired,
        |result| binary_operation_name(family, result, lcode, rcode),
        site,
        sink,
    )
}

/// Select a specialized in-place binary-operation helper.
///
/// In-place operations target the "mutate first operand" convention,
/// never a fresh-value convention; the helper returns a success flag and
/// writes the possibly-reallocated result back through the operand's
/// address. There is no degrade sequence for them.
pub fn select_inplace_operation(
    table: &HelperTable,
    family: BinaryOpFamily,
    left: OperandRepr,
    right: OperandRepr,
    site: &SourceLocation,
    sink: &mut ReportingSink,
) -> SelectionOutcome {
    let name = inplace_operation_name(family, left.helper_code(), right.helper_code());
    if table.is_specialized(&name) {
        return SelectionOutcome::hit(CType::CBool, name, 1);
    }
    if !table.is_known_nonspecialized(&name) {
        tracing::debug!(helper = %name, site = %site, "missing specialized in-place helper");
        sink.report_missing_helper(name.as_str(), site.clone());
    }
    SelectionOutcome::miss(1)
}

/// Select a specialized unary-operation helper.
pub fn select_unary_operation(
    table: &HelperTable,
    family: UnaryOpFamily,
    operand: OperandRepr,
    desired: CType,
    site: &SourceLocation,
    sink: &mut ReportingSink,
) -> SelectionOutcome {
    let code = operand.helper_code();
    degrade_walk(
        table,
        desired,
        |result| unary_operation_name(family, result, code),
        site,
        sink,
    )
}

/// Select a specialized rich-comparison helper.
///
/// Identity and membership comparisons must never reach this: they are
/// representation-independent direct calls.
pub fn select_comparison(
    table: &HelperTable,
    family: CompareFamily,
    left: OperandRepr,
    right: OperandRepr,
    desired: CType,
    site: &SourceLocation,
    sink: &mut ReportingSink,
) -> SelectionOutcome {
    let lcode = left.helper_code();
    let rcode = right.helper_code();
    degrade_walk(
        table,
        desired,
        |result| rich_compare_name(family, result, lcode, rcode),
        site,
        sink,
    )
}
