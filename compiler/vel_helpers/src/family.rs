//! Operation families.
//!
//! A family groups every helper variant of one source-level operation
//! (`+`, unary `-`, `<=`, ...). Families carry the uppercase tag used in
//! helper names and the capability slots an operand must provide for the
//! operation to possibly succeed on it. `+` and `*` map to two slots
//! each because the dynamic language overloads them across the numeric
//! and sequence protocols.

use vel_ir::{BinaryOp, ComparisonOp, UnaryOp};
use vel_shapes::Slot;

/// Binary operation family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOpFamily {
    Add,
    Sub,
    Mult,
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

/// All binary families, in the fixed enumeration order used when
/// building availability sets.
pub const ALL_BINARY_FAMILIES: [BinaryOpFamily; 14] = [
    BinaryOpFamily::Add,
    BinaryOpFamily::Sub,
    BinaryOpFamily::Mult,
    BinaryOpFamily::TrueDiv,
    BinaryOpFamily::FloorDiv,
    BinaryOpFamily::Mod,
    BinaryOpFamily::Divmod,
    BinaryOpFamily::Pow,
    BinaryOpFamily::LShift,
    BinaryOpFamily::RShift,
    BinaryOpFamily::BitAnd,
    BinaryOpFamily::BitOr,
    BinaryOpFamily::BitXor,
    BinaryOpFamily::MatMult,
];

impl BinaryOpFamily {
    /// Family of a source operator.
    pub const fn from_op(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => BinaryOpFamily::Add,
            BinaryOp::Sub => BinaryOpFamily::Sub,
            BinaryOp::Mul => BinaryOpFamily::Mult,
            BinaryOp::TrueDiv => BinaryOpFamily::TrueDiv,
            BinaryOp::FloorDiv => BinaryOpFamily::FloorDiv,
            BinaryOp::Mod => BinaryOpFamily::Mod,
            BinaryOp::Divmod => BinaryOpFamily::Divmod,
            BinaryOp::Pow => BinaryOpFamily::Pow,
            BinaryOp::LShift => BinaryOpFamily::LShift,
            BinaryOp::RShift => BinaryOpFamily::RShift,
            BinaryOp::BitAnd => BinaryOpFamily::BitAnd,
            BinaryOp::BitOr => BinaryOpFamily::BitOr,
            BinaryOp::BitXor => BinaryOpFamily::BitXor,
            BinaryOp::MatMult => BinaryOpFamily::MatMult,
        }
    }

    /// Uppercase tag used inside helper names.
    pub const fn tag(self) -> &'static str {
        match self {
            BinaryOpFamily::Add => "ADD",
            BinaryOpFamily::Sub => "SUB",
            BinaryOpFamily::Mult => "MULT",
            BinaryOpFamily::TrueDiv => "TRUEDIV",
            BinaryOpFamily::FloorDiv => "FLOORDIV",
            BinaryOpFamily::Mod => "MOD",
            BinaryOpFamily::Divmod => "DIVMOD",
            BinaryOpFamily::Pow => "POW",
            BinaryOpFamily::LShift => "LSHIFT",
            BinaryOpFamily::RShift => "RSHIFT",
            BinaryOpFamily::BitAnd => "BITAND",
            BinaryOpFamily::BitOr => "BITOR",
            BinaryOpFamily::BitXor => "BITXOR",
            BinaryOpFamily::MatMult => "MATMULT",
        }
    }

    /// The capability slots an operand can satisfy this family through.
    pub const fn slots(self) -> &'static [Slot] {
        match self {
            BinaryOpFamily::Add => &[Slot::NumberAdd, Slot::SequenceConcat],
            BinaryOpFamily::Sub => &[Slot::NumberSub],
            BinaryOpFamily::Mult => &[Slot::NumberMul, Slot::SequenceRepeat],
            BinaryOpFamily::TrueDiv => &[Slot::NumberTrueDiv],
            BinaryOpFamily::FloorDiv => &[Slot::NumberFloorDiv],
            BinaryOpFamily::Mod => &[Slot::NumberMod],
            BinaryOpFamily::Divmod => &[Slot::NumberDivmod],
            BinaryOpFamily::Pow => &[Slot::NumberPow],
            BinaryOpFamily::LShift => &[Slot::NumberLShift],
            BinaryOpFamily::RShift => &[Slot::NumberRShift],
            BinaryOpFamily::BitAnd => &[Slot::NumberBitAnd],
            BinaryOpFamily::BitOr => &[Slot::NumberBitOr],
            BinaryOpFamily::BitXor => &[Slot::NumberBitXor],
            BinaryOpFamily::MatMult => &[Slot::NumberMatMult],
        }
    }

    /// The primary numeric slot, used when deciding hot numeric pairs.
    pub const fn numeric_slot(self) -> Slot {
        match self {
            BinaryOpFamily::Add => Slot::NumberAdd,
            BinaryOpFamily::Sub => Slot::NumberSub,
            BinaryOpFamily::Mult => Slot::NumberMul,
            BinaryOpFamily::TrueDiv => Slot::NumberTrueDiv,
            BinaryOpFamily::FloorDiv => Slot::NumberFloorDiv,
            BinaryOpFamily::Mod => Slot::NumberMod,
            BinaryOpFamily::Divmod => Slot::NumberDivmod,
            BinaryOpFamily::Pow => Slot::NumberPow,
            BinaryOpFamily::LShift => Slot::NumberLShift,
            BinaryOpFamily::RShift => Slot::NumberRShift,
            BinaryOpFamily::BitAnd => Slot::NumberBitAnd,
            BinaryOpFamily::BitOr => Slot::NumberBitOr,
            BinaryOpFamily::BitXor => Slot::NumberBitXor,
            BinaryOpFamily::MatMult => Slot::NumberMatMult,
        }
    }

    /// Families whose unboxed `long` result variants are generated.
    /// Division, power, and divmod escape the machine-word range or
    /// produce non-integer results.
    pub const fn has_clong_results(self) -> bool {
        !matches!(
            self,
            BinaryOpFamily::TrueDiv
                | BinaryOpFamily::Divmod
                | BinaryOpFamily::Pow
                | BinaryOpFamily::MatMult
        )
    }
}

/// Unary operation family.
///
/// Boolean `not` has no family: the condition compiler handles it
/// structurally without emitting an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOpFamily {
    Neg,
    Pos,
    Invert,
}

/// All unary families, in fixed enumeration order.
pub const ALL_UNARY_FAMILIES: [UnaryOpFamily; 3] =
    [UnaryOpFamily::Neg, UnaryOpFamily::Pos, UnaryOpFamily::Invert];

impl UnaryOpFamily {
    /// Family of a source operator; `None` for boolean `not`.
    pub const fn from_op(op: UnaryOp) -> Option<Self> {
        match op {
            UnaryOp::Neg => Some(UnaryOpFamily::Neg),
            UnaryOp::Pos => Some(UnaryOpFamily::Pos),
            UnaryOp::Invert => Some(UnaryOpFamily::Invert),
            UnaryOp::Not => None,
        }
    }

    /// Uppercase tag used inside helper names.
    pub const fn tag(self) -> &'static str {
        match self {
            UnaryOpFamily::Neg => "NEG",
            UnaryOpFamily::Pos => "POS",
            UnaryOpFamily::Invert => "INVERT",
        }
    }

    /// The capability slot the operand must provide.
    pub const fn slot(self) -> Slot {
        match self {
            UnaryOpFamily::Neg => Slot::NumberNeg,
            UnaryOpFamily::Pos => Slot::NumberPos,
            UnaryOpFamily::Invert => Slot::NumberInvert,
        }
    }
}

/// Rich-comparison family.
///
/// Identity and membership comparisons have no family: they are
/// representation-independent and never reach helper selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareFamily {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// All comparison families, in fixed enumeration order.
pub const ALL_COMPARE_FAMILIES: [CompareFamily; 6] = [
    CompareFamily::Eq,
    CompareFamily::NotEq,
    CompareFamily::Lt,
    CompareFamily::LtEq,
    CompareFamily::Gt,
    CompareFamily::GtEq,
];

impl CompareFamily {
    /// Family of a source operator; `None` for identity/membership.
    pub const fn from_op(op: ComparisonOp) -> Option<Self> {
        match op {
            ComparisonOp::Eq => Some(CompareFamily::Eq),
            ComparisonOp::NotEq => Some(CompareFamily::NotEq),
            ComparisonOp::Lt => Some(CompareFamily::Lt),
            ComparisonOp::LtEq => Some(CompareFamily::LtEq),
            ComparisonOp::Gt => Some(CompareFamily::Gt),
            ComparisonOp::GtEq => Some(CompareFamily::GtEq),
            ComparisonOp::Is | ComparisonOp::IsNot | ComparisonOp::In | ComparisonOp::NotIn => {
                None
            }
        }
    }

    /// Uppercase tag used inside helper names.
    pub const fn tag(self) -> &'static str {
        match self {
            CompareFamily::Eq => "EQ",
            CompareFamily::NotEq => "NE",
            CompareFamily::Lt => "LT",
            CompareFamily::LtEq => "LE",
            CompareFamily::Gt => "GT",
            CompareFamily::GtEq => "GE",
        }
    }
}
