//! The annotated expression/statement tree handed to the code generator.
//!
//! The front end and the dataflow optimizer (external collaborators) build
//! this tree; the code generator only reads it. Every expression arrives
//! annotated with its inferred [`Shape`], its chosen C representation, and
//! the static may-raise facts. Children are stored in source evaluation
//! order; accessors yield them in that order, which is a correctness
//! contract for the emitters, not a convention.

use bitflags::bitflags;
use smallvec::SmallVec;
use vel_shapes::{CType, DialectVersion, Shape};

use crate::operators::{BinaryOp, ComparisonOp, UnaryOp};
use crate::span::Span;

bitflags! {
    /// Static facts the optimizer attaches to an expression.
    ///
    /// Computed once by the may-raise analysis, never recomputed here.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ExprFlags: u8 {
        /// Evaluating the operation itself may raise at program run time.
        const MAY_RAISE = 1 << 0;
        /// Taking the truth value of the result may raise.
        const TRUTH_MAY_RAISE = 1 << 1;
        /// The expression is a compile-time constant.
        const CONSTANT = 1 << 2;
    }
}

/// Index of an expression within an [`ExprArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ExprId(raw)
    }

    /// Index as `usize` for slice access.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Expression node kinds.
///
/// Only the kinds the code generator dispatches on exist here; the front
/// end lowers everything else before handoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// A rebindable local variable slot.
    LocalRef { name: String },
    /// Integer constant.
    ConstantInt(i64),
    /// Text constant.
    ConstantStr(String),
    /// The singleton none constant.
    ConstantNone,
    /// Binary arithmetic/sequence operation.
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// Unary operation.
    Unary { op: UnaryOp, operand: ExprId },
    /// Comparison, identity, or membership.
    Comparison {
        op: ComparisonOp,
        left: ExprId,
        right: ExprId,
    },
    /// Short-circuit conjunction.
    BoolAnd { left: ExprId, right: ExprId },
    /// Short-circuit disjunction.
    BoolOr { left: ExprId, right: ExprId },
    /// Conditional (ternary) expression.
    Conditional {
        guard: ExprId,
        yes: ExprId,
        no: ExprId,
    },
    /// Subscript access `value[index]`.
    Subscript { value: ExprId, index: ExprId },
    /// Attribute access `value.name`.
    Attribute { value: ExprId, name: String },
    /// Slice access `value[lower:upper]`; bounds are optional.
    Slice {
        value: ExprId,
        lower: Option<ExprId>,
        upper: Option<ExprId>,
    },
    /// Dict literal; pairs in source order.
    DictLiteral {
        pairs: SmallVec<[(ExprId, ExprId); 4]>,
    },
}

/// One annotated expression node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Inferred value shape.
    pub shape: Shape,
    /// Chosen at-rest C representation (may be narrower than the
    /// shape's default, e.g. an unboxed platform long).
    pub ctype: CType,
    pub flags: ExprFlags,
    pub span: Span,
}

impl Expr {
    /// Build a node with the default object representation.
    pub fn new(kind: ExprKind, shape: Shape, flags: ExprFlags, span: Span) -> Self {
        Expr {
            kind,
            shape,
            ctype: CType::Object,
            flags,
            span,
        }
    }

    /// Override the C representation.
    pub fn with_ctype(mut self, ctype: CType) -> Self {
        self.ctype = ctype;
        self
    }
}

/// Arena storage for expressions.
///
/// Expressions are appended during front-end lowering and referenced by
/// [`ExprId`]; the code generator never mutates the arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression, returning its id.
    pub fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    /// Fetch an expression by id.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Inferred shape of an expression.
    #[inline]
    pub fn shape(&self, id: ExprId) -> Shape {
        self.get(id).shape
    }

    /// Chosen C representation of an expression.
    #[inline]
    pub fn ctype(&self, id: ExprId) -> CType {
        self.get(id).ctype
    }

    /// May evaluating this expression raise at program run time?
    #[inline]
    pub fn may_raise(&self, id: ExprId) -> bool {
        self.get(id).flags.contains(ExprFlags::MAY_RAISE)
    }

    /// May taking the truth value of this expression raise?
    #[inline]
    pub fn truth_may_raise(&self, id: ExprId) -> bool {
        self.get(id).flags.contains(ExprFlags::TRUTH_MAY_RAISE)
    }

    /// Is this expression a compile-time constant?
    #[inline]
    pub fn is_compile_time_constant(&self, id: ExprId) -> bool {
        self.get(id).flags.contains(ExprFlags::CONSTANT)
    }

    /// A small-integer constant usable directly as a C index, bypassing
    /// index-object creation in the subscript fast path.
    pub fn as_constant_index(&self, id: ExprId) -> Option<i64> {
        match &self.get(id).kind {
            ExprKind::ConstantInt(value) => Some(*value),
            _ => None,
        }
    }
}

/// Statement kinds the code generator consumes.
///
/// Assignment targets are expression nodes (annotated `LocalRef`s), so
/// the emitters see the slot's inferred shape and C representation the
/// same way they see any operand's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// Rebind a local slot: `target = value`.
    Assign { target: ExprId, value: ExprId },
    /// Augmented assignment routed through the in-place operation path.
    AugAssign {
        target: ExprId,
        op: BinaryOp,
        value: ExprId,
    },
    /// Evaluate and discard.
    ExprStmt { value: ExprId },
    /// Branch on a boolean-context condition.
    If {
        condition: ExprId,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
}

/// One statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// A translation unit: one module body plus its dialect version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub body: Vec<Stmt>,
    pub version: DialectVersion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arena_roundtrip() {
        let mut arena = ExprArena::new();
        let id = arena.push(Expr::new(
            ExprKind::ConstantInt(42),
            Shape::Long,
            ExprFlags::CONSTANT,
            Span::DUMMY,
        ));
        assert_eq!(arena.shape(id), Shape::Long);
        assert_eq!(arena.ctype(id), CType::Object);
        assert!(arena.is_compile_time_constant(id));
        assert_eq!(arena.as_constant_index(id), Some(42));
        assert!(!arena.may_raise(id));
    }

    #[test]
    fn ctype_override() {
        let mut arena = ExprArena::new();
        let id = arena.push(
            Expr::new(
                ExprKind::LocalRef { name: "n".into() },
                Shape::Long,
                ExprFlags::empty(),
                Span::DUMMY,
            )
            .with_ctype(CType::CLong),
        );
        assert_eq!(arena.ctype(id), CType::CLong);
    }
}
