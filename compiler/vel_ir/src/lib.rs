//! Expression tree interface between the Vel optimizer and the code
//! generator.
//!
//! This crate defines the read-only facts the code generator consumes:
//!
//! - **[`ExprArena`] / [`ExprId`]** — arena-stored expression nodes with
//!   shape, C-type, and may-raise annotations attached by the optimizer.
//! - **Operators** ([`BinaryOp`], [`UnaryOp`], [`ComparisonOp`]).
//! - **[`Span`] / [`SourceLocation`]** — byte spans for diagnostics.
//!
//! The parser and the dataflow optimizer that populate these structures
//! are external collaborators; nothing in this crate computes facts, it
//! only carries them.

mod expr;
mod operators;
mod span;

pub use expr::{Expr, ExprArena, ExprFlags, ExprId, ExprKind, Module, Stmt, StmtKind};
pub use operators::{BinaryOp, ComparisonOp, UnaryOp};
pub use span::{SourceLocation, Span};
