//! Canonical helper-name construction.
//!
//! Helper names are pure functions of their key tuple: the same
//! `(family, result kind, operand codes)` always yields the same name.
//! The external tool that pre-generates the specialized helper
//! implementations constructs names with the same rules, so both sides
//! agree byte-for-byte without a shared registry. Operand order is
//! left-then-right and never normalized: "add INT to FLOAT" and "add
//! FLOAT to INT" are different helpers with different argument-passing
//! conventions even when mathematically commutative.

use std::fmt;

use vel_shapes::CType;

use crate::family::{BinaryOpFamily, CompareFamily, UnaryOpFamily};

/// A derived, canonical helper name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HelperName(String);

impl HelperName {
    /// The name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HelperName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `BINARY_OPERATION_<TAG>_<RESULT>_<LEFT>_<RIGHT>`
pub fn binary_operation_name(
    family: BinaryOpFamily,
    result: CType,
    left_code: &str,
    right_code: &str,
) -> HelperName {
    HelperName(format!(
        "BINARY_OPERATION_{}_{}_{}_{}",
        family.tag(),
        result.helper_code(),
        left_code,
        right_code
    ))
}

/// `INPLACE_OPERATION_<TAG>_<LEFT>_<RIGHT>`
///
/// In-place helpers have no result segment: they mutate the left
/// operand's storage through its address and return a success flag.
pub fn inplace_operation_name(
    family: BinaryOpFamily,
    left_code: &str,
    right_code: &str,
) -> HelperName {
    HelperName(format!(
        "INPLACE_OPERATION_{}_{}_{}",
        family.tag(),
        left_code,
        right_code
    ))
}

/// `UNARY_OPERATION_<TAG>_<RESULT>_<OPERAND>`
pub fn unary_operation_name(
    family: UnaryOpFamily,
    result: CType,
    operand_code: &str,
) -> HelperName {
    HelperName(format!(
        "UNARY_OPERATION_{}_{}_{}",
        family.tag(),
        result.helper_code(),
        operand_code
    ))
}

/// `RICH_COMPARE_<TAG>_<RESULT>_<LEFT>_<RIGHT>`
pub fn rich_compare_name(
    family: CompareFamily,
    result: CType,
    left_code: &str,
    right_code: &str,
) -> HelperName {
    HelperName(format!(
        "RICH_COMPARE_{}_{}_{}_{}",
        family.tag(),
        result.helper_code(),
        left_code,
        right_code
    ))
}
