//! The shape catalog: capability and coercion queries over the closed
//! shape set.
//!
//! Built once at process start and read-only afterwards; an external
//! driver may share one catalog across translation units processed in
//! parallel. All queries are O(1) dense-table lookups.

use crate::ctype::CType;
use crate::shape::{Shape, NUM_SHAPES, ORDERED_SHAPES};
use crate::slots::{Slot, ALL_SLOTS, NUM_SLOTS};

/// Coercion answer for `can_coerce_to`.
///
/// `Unknown` means "assume yes conservatively": the universal shape
/// stands for values whose concrete runtime type is not statically
/// known, so a real dynamic-coercion slot could exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tristate {
    Yes,
    No,
    Unknown,
}

/// Capability and coercion tables for the closed shape set.
///
/// Constructed once via [`ShapeCatalog::new`]; there is no way to
/// mutate a built catalog.
pub struct ShapeCatalog {
    support: [[bool; NUM_SLOTS]; NUM_SHAPES],
}

impl ShapeCatalog {
    /// Build the capability tables.
    pub fn new() -> Self {
        let mut support = [[false; NUM_SLOTS]; NUM_SHAPES];
        for shape in ORDERED_SHAPES {
            for slot in ALL_SLOTS {
                support[shape.index()][slot.index()] = shape_supports(shape, slot);
            }
        }
        ShapeCatalog { support }
    }

    /// Does `shape` provide `slot`? Total and side-effect-free over the
    /// closed vocabulary.
    #[inline]
    pub fn supports_slot(&self, shape: Shape, slot: Slot) -> bool {
        self.support[shape.index()][slot.index()]
    }

    /// True only for the universal fallback shape.
    #[inline]
    pub fn is_universal(&self, shape: Shape) -> bool {
        shape == Shape::Object
    }

    /// Can values of `a` be implicitly coerced into numeric operations
    /// with `b`? Never a hard `No` when either side is universal.
    pub fn can_coerce_to(&self, a: Shape, b: Shape) -> Tristate {
        if self.is_universal(a) || self.is_universal(b) {
            return Tristate::Unknown;
        }
        if a.is_numeric() && b.is_numeric() {
            return Tristate::Yes;
        }
        Tristate::No
    }

    /// The default C representation for a value of `shape`.
    ///
    /// Every shape travels as a dynamic object pointer unless the
    /// optimizer narrowed it; `CLong` is the one shape whose values are
    /// unboxed by default.
    pub fn default_ctype(&self, shape: Shape) -> CType {
        match shape {
            Shape::CLong => CType::CLong,
            _ => CType::Object,
        }
    }
}

impl Default for ShapeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Ground-truth capability predicate the dense table is built from.
const fn shape_supports(shape: Shape, slot: Slot) -> bool {
    match shape {
        // The universal shape supports every slot: a generic dynamic
        // dispatch path exists for it at runtime.
        Shape::Object => true,

        Shape::Int | Shape::Long | Shape::CLong => match slot {
            Slot::NumberMatMult | Slot::SequenceConcat | Slot::SequenceRepeat => false,
            _ => true,
        },

        Shape::Float => match slot {
            Slot::NumberMatMult | Slot::SequenceConcat | Slot::SequenceRepeat => false,
            _ => !slot.is_integer_only(),
        },

        Shape::Tuple | Shape::List | Shape::Bytes | Shape::Unicode => matches!(
            slot,
            Slot::SequenceConcat | Slot::SequenceRepeat | Slot::Comparison
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_is_the_only_universal_shape() {
        let catalog = ShapeCatalog::new();
        for shape in ORDERED_SHAPES {
            let universal = ALL_SLOTS
                .iter()
                .all(|&slot| catalog.supports_slot(shape, slot));
            assert_eq!(
                universal,
                catalog.is_universal(shape),
                "{shape:?} capability row disagrees with is_universal"
            );
        }
    }

    #[test]
    fn sequences_do_not_do_arithmetic() {
        let catalog = ShapeCatalog::new();
        assert!(!catalog.supports_slot(Shape::List, Slot::NumberAdd));
        assert!(catalog.supports_slot(Shape::List, Slot::SequenceConcat));
        assert!(catalog.supports_slot(Shape::List, Slot::SequenceRepeat));
        assert!(catalog.supports_slot(Shape::Unicode, Slot::Comparison));
    }

    #[test]
    fn float_lacks_integer_slots() {
        let catalog = ShapeCatalog::new();
        assert!(catalog.supports_slot(Shape::Float, Slot::NumberAdd));
        assert!(!catalog.supports_slot(Shape::Float, Slot::NumberLShift));
        assert!(!catalog.supports_slot(Shape::Float, Slot::NumberInvert));
        assert!(catalog.supports_slot(Shape::Long, Slot::NumberInvert));
    }

    #[test]
    fn coercion_is_unknown_against_universal() {
        let catalog = ShapeCatalog::new();
        for shape in ORDERED_SHAPES {
            assert_eq!(
                catalog.can_coerce_to(Shape::Object, shape),
                Tristate::Unknown
            );
            assert_eq!(
                catalog.can_coerce_to(shape, Shape::Object),
                Tristate::Unknown
            );
        }
        assert_eq!(catalog.can_coerce_to(Shape::Int, Shape::Float), Tristate::Yes);
        assert_eq!(catalog.can_coerce_to(Shape::List, Shape::Int), Tristate::No);
    }

    #[test]
    fn default_ctypes() {
        let catalog = ShapeCatalog::new();
        assert_eq!(catalog.default_ctype(Shape::CLong), CType::CLong);
        assert_eq!(catalog.default_ctype(Shape::List), CType::Object);
    }
}
