//! Operator definitions for the expression tree.
//!
//! The front end resolves source tokens into these enums; the code
//! generator maps them onto helper families. `as_symbol` is used in
//! diagnostics to show the exact operator that hit a missing helper.

/// Binary operators of the source language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Divmod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
    MatMult,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::TrueDiv => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Divmod => "divmod",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::MatMult => "@",
        }
    }
}

/// Unary operators of the source language.
///
/// `Not` never reaches helper selection: boolean negation is compiled
/// structurally by the condition compiler (label swap, zero code).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

impl UnaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

/// Comparison operators, including identity and membership.
///
/// Identity (`is`/`is not`) and membership (`in`/`not in`) are
/// representation-independent and never go through shape-based helper
/// selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Is,
    IsNot,
    In,
    NotIn,
}

impl ComparisonOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::LtEq => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::GtEq => ">=",
            ComparisonOp::Is => "is",
            ComparisonOp::IsNot => "is not",
            ComparisonOp::In => "in",
            ComparisonOp::NotIn => "not in",
        }
    }

    /// Rich comparisons dispatch on operand shapes; identity and
    /// membership do not.
    #[inline]
    pub const fn is_rich(self) -> bool {
        matches!(
            self,
            ComparisonOp::Eq
                | ComparisonOp::NotEq
                | ComparisonOp::Lt
                | ComparisonOp::LtEq
                | ComparisonOp::Gt
                | ComparisonOp::GtEq
        )
    }
}
