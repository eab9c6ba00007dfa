//! Value-shape catalog for the Vel code generator.
//!
//! This crate provides:
//!
//! - **Shapes** ([`Shape`]) — the closed set of coarse value-type facts the
//!   optimizer attaches to expressions ("definitely a small integer",
//!   "definitely a list", "unknown object").
//! - **C types** ([`CType`]) — the physical at-rest representations values
//!   travel in, which decide reference-count obligations and failure checks.
//! - **Capability slots** ([`Slot`]) — the abstract operations a shape may
//!   provide, answered by the once-built [`ShapeCatalog`] tables.
//! - **Version gates** ([`VersionGate`], [`DialectVersion`]) — dialect
//!   predicates gating shapes and emitted code paths.
//!
//! # Design
//!
//! Shapes form a closed tagged enum with dense-table capability lookup
//! instead of a class hierarchy with virtual dispatch; identity comparison
//! is plain enum equality. Exactly one shape, [`Shape::Object`], is
//! universal — every operation is legal with it on either side because a
//! generic dynamic-dispatch path exists at runtime.

mod catalog;
mod ctype;
mod shape;
mod slots;
pub mod version;

pub use catalog::{ShapeCatalog, Tristate};
pub use ctype::CType;
pub use shape::{Shape, ORDERED_SHAPES};
pub use slots::{Slot, ALL_SLOTS, NUM_SLOTS};
pub use version::{DialectVersion, VersionGate};
