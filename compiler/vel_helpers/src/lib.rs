//! Helper-name registry and specialized-helper selection for the Vel
//! code generator.
//!
//! This crate provides:
//!
//! - **Operation families** ([`BinaryOpFamily`], [`UnaryOpFamily`],
//!   [`CompareFamily`]) — the family tags and capability slots behind
//!   every helper variant.
//! - **Name construction** ([`binary_operation_name`] and friends) —
//!   deterministic, pure derivation of canonical helper names from
//!   `(family, result kind, operand codes)` key tuples.
//! - **The availability table** ([`HelperTable`]) — the once-built
//!   partition of every derivable name into *specialized*,
//!   *known-nonspecialized*, and (implicitly) *missing*.
//! - **Selection** ([`select_binary_operation`] and friends) — the
//!   bounded degrade walk that picks a specialized helper or tells the
//!   caller to emit the generic fallback, reporting unexpected gaps.
//!
//! # Design
//!
//! Availability is decided purely by pre-built sets: no runtime probing,
//! no mutable global registry. [`HelperTableBuilder`] consumes itself on
//! `build`, so a table cannot be re-initialized; drivers build one table
//! per dialect version at startup and share it read-only.

mod family;
mod names;
mod select;
mod table;

pub use family::{
    BinaryOpFamily, CompareFamily, UnaryOpFamily, ALL_BINARY_FAMILIES, ALL_COMPARE_FAMILIES,
    ALL_UNARY_FAMILIES,
};
pub use names::{
    binary_operation_name, inplace_operation_name, rich_compare_name, unary_operation_name,
    HelperName,
};
pub use select::{
    select_binary_operation, select_comparison, select_inplace_operation, select_unary_operation,
    OperandRepr, SelectedHelper, SelectionOutcome,
};
pub use table::{HelperTable, HelperTableBuilder};
