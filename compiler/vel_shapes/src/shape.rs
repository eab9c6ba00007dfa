//! The closed set of value shapes.
//!
//! A shape is a coarse, statically-known fact about a value's runtime
//! representation ("definitely a small integer", "definitely a list").
//! The optimizer attaches one shape per expression; the code generator
//! uses them to pick specialized helpers. The set is closed: adding a
//! shape means extending this enum and every table that indexes it.

use crate::version::VersionGate;

/// A value shape.
///
/// Identity comparison (plain `==` on the enum) is the fast-path check;
/// there is no subtyping between shapes. Exactly one shape, [`Object`],
/// is the universal fallback: any operation is legal with `Object` on
/// either side because the runtime carries a generic dispatch path for
/// it. No other shape may claim universal support.
///
/// [`Object`]: Shape::Object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Narrow native-width integer (legacy dialect only).
    Int,
    /// Arbitrary-precision integer.
    Long,
    /// Double-precision float.
    Float,
    /// Immutable sequence.
    Tuple,
    /// Mutable sequence.
    List,
    /// Byte string.
    Bytes,
    /// Text string.
    Unicode,
    /// Unknown object - the universal fallback shape.
    Object,
    /// C platform `long` travelling in object clothing: the value is
    /// known to fit a machine word even though its declared shape is
    /// numeric. Gets its own, faster helper variants.
    CLong,
}

/// Number of shapes, for dense table sizing.
pub const NUM_SHAPES: usize = 9;

/// Fixed enumeration order for every cross-product walk.
///
/// Helper generation (an external tool) and helper selection must arrive
/// at identical name sets without runtime cross-checking; both iterate
/// shapes in this order.
pub const ORDERED_SHAPES: [Shape; NUM_SHAPES] = [
    Shape::Int,
    Shape::Long,
    Shape::Float,
    Shape::Tuple,
    Shape::List,
    Shape::Bytes,
    Shape::Unicode,
    Shape::Object,
    Shape::CLong,
];

impl Shape {
    /// Canonical short code used inside helper names.
    pub const fn helper_code(self) -> &'static str {
        match self {
            Shape::Int => "INT",
            Shape::Long => "LONG",
            Shape::Float => "FLOAT",
            Shape::Tuple => "TUPLE",
            Shape::List => "LIST",
            Shape::Bytes => "BYTES",
            Shape::Unicode => "UNICODE",
            Shape::Object => "OBJECT",
            Shape::CLong => "CLONG",
        }
    }

    /// Table index for dense per-shape lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The dialect gate this shape lives behind, if any.
    ///
    /// The legacy narrow integer only exists under dialect 2; both the
    /// availability tables and the emitters must check this gate before
    /// treating an operand of the shape as reachable.
    pub const fn version_gate(self) -> Option<VersionGate> {
        match self {
            Shape::Int => Some(VersionGate::LegacyOnly),
            _ => None,
        }
    }

    /// Numeric shapes participate in arithmetic coercion.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Shape::Int | Shape::Long | Shape::Float | Shape::CLong)
    }

    /// Sequence shapes support concat/repeat.
    #[inline]
    pub const fn is_sequence(self) -> bool {
        matches!(
            self,
            Shape::Tuple | Shape::List | Shape::Bytes | Shape::Unicode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ordered_shapes_cover_the_enum_once() {
        for (i, shape) in ORDERED_SHAPES.iter().enumerate() {
            assert_eq!(
                ORDERED_SHAPES.iter().filter(|s| *s == shape).count(),
                1,
                "{shape:?} listed more than once"
            );
            // Dense indexing must agree with declaration order.
            assert_eq!(shape.index(), i);
        }
    }

    #[test]
    fn only_int_is_gated() {
        for shape in ORDERED_SHAPES {
            match shape {
                Shape::Int => assert!(shape.version_gate().is_some()),
                _ => assert!(shape.version_gate().is_none()),
            }
        }
    }
}
