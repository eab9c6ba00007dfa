//! The helper availability table.
//!
//! For every operation family, the cross product of shape codes is
//! partitioned into three disjoint classes:
//!
//! - **specialized** — a concrete native implementation exists and must
//!   be preferred;
//! - **nonspecialized** — known to be absent on purpose; falling back is
//!   silent (the generic path already raises the proper runtime error);
//! - neither — a reportable optimization gap.
//!
//! Membership is decided purely by these pre-built sets; there is no
//! runtime probing. Enumeration walks families and shapes in their fixed
//! declaration orders so that this table and the external helper
//! generator agree on the name sets without cross-checking.

use rustc_hash::FxHashSet;
use vel_shapes::{CType, DialectVersion, Shape, ShapeCatalog, Slot, ORDERED_SHAPES};

use crate::family::{
    BinaryOpFamily, CompareFamily, UnaryOpFamily, ALL_BINARY_FAMILIES, ALL_COMPARE_FAMILIES,
    ALL_UNARY_FAMILIES,
};
use crate::names::{
    binary_operation_name, inplace_operation_name, rich_compare_name, unary_operation_name,
    HelperName,
};

/// Result kinds a binary selection may attempt, in no particular order;
/// the nonspecialized class covers all of them for a dead pair.
const BINARY_RESULT_KINDS: [CType; 4] = [CType::Object, CType::CLong, CType::TriBool, CType::Void];

/// The once-built availability sets.
///
/// Built by [`HelperTableBuilder::build`], which consumes the builder:
/// re-initialization is unrepresentable rather than asserted against.
pub struct HelperTable {
    specialized: FxHashSet<HelperName>,
    nonspecialized: FxHashSet<HelperName>,
}

impl HelperTable {
    /// Is a concrete native implementation generated for this name?
    /// Never panics; a name in neither set is a reportable gap.
    #[inline]
    pub fn is_specialized(&self, name: &HelperName) -> bool {
        self.specialized.contains(name)
    }

    /// Is this name known to be deliberately absent?
    #[inline]
    pub fn is_known_nonspecialized(&self, name: &HelperName) -> bool {
        self.nonspecialized.contains(name)
    }

    /// Number of specialized names (diagnostics/tests).
    pub fn specialized_count(&self) -> usize {
        self.specialized.len()
    }

    /// Number of known-nonspecialized names (diagnostics/tests).
    pub fn nonspecialized_count(&self) -> usize {
        self.nonspecialized.len()
    }

    /// Iterate specialized names (tests; order unspecified).
    pub fn specialized_names(&self) -> impl Iterator<Item = &HelperName> {
        self.specialized.iter()
    }

    /// Iterate known-nonspecialized names (tests; order unspecified).
    pub fn nonspecialized_names(&self) -> impl Iterator<Item = &HelperName> {
        self.nonspecialized.iter()
    }
}

/// One-shot builder for [`HelperTable`].
pub struct HelperTableBuilder {
    version: DialectVersion,
    specialized: FxHashSet<HelperName>,
    nonspecialized: FxHashSet<HelperName>,
}

impl HelperTableBuilder {
    /// Start building a table for one dialect version.
    pub fn new(version: DialectVersion) -> Self {
        HelperTableBuilder {
            version,
            specialized: FxHashSet::default(),
            nonspecialized: FxHashSet::default(),
        }
    }

    /// Enumerate the shape cross product and build the partition.
    pub fn build(mut self, catalog: &ShapeCatalog) -> HelperTable {
        let shapes = self.reachable_shapes();

        for family in ALL_BINARY_FAMILIES {
            for &left in &shapes {
                for &right in &shapes {
                    self.classify_binary_pair(catalog, family, left, right);
                }
            }
        }
        for family in ALL_UNARY_FAMILIES {
            for &operand in &shapes {
                self.classify_unary(catalog, family, operand);
            }
        }
        for family in ALL_COMPARE_FAMILIES {
            for &left in &shapes {
                for &right in &shapes {
                    self.classify_compare_pair(catalog, family, left, right);
                }
            }
        }

        tracing::debug!(
            specialized = self.specialized.len(),
            nonspecialized = self.nonspecialized.len(),
            version = %self.version,
            "helper availability table built"
        );
        HelperTable {
            specialized: self.specialized,
            nonspecialized: self.nonspecialized,
        }
    }

    /// Shapes reachable under the builder's dialect, in fixed order.
    fn reachable_shapes(&self) -> Vec<Shape> {
        ORDERED_SHAPES
            .iter()
            .copied()
            .filter(|shape| match shape.version_gate() {
                Some(gate) => gate.admits(self.version),
                None => true,
            })
            .collect()
    }

    fn classify_binary_pair(
        &mut self,
        catalog: &ShapeCatalog,
        family: BinaryOpFamily,
        left: Shape,
        right: Shape,
    ) {
        let lcode = left.helper_code();
        let rcode = right.helper_code();

        let side_supports = |shape: Shape| {
            catalog.is_universal(shape)
                || family
                    .slots()
                    .iter()
                    .any(|&slot| catalog.supports_slot(shape, slot))
        };

        if !side_supports(left) && !side_supports(right) {
            // Dead pair: the operation cannot succeed for any runtime
            // values of these shapes, so no helper is ever generated and
            // the fallback is intentionally silent.
            for result in BINARY_RESULT_KINDS {
                self.nonspecialized
                    .insert(binary_operation_name(family, result, lcode, rcode));
            }
            self.nonspecialized
                .insert(inplace_operation_name(family, lcode, rcode));
            return;
        }

        if !hot_binary_pair(catalog, family, left, right) {
            // Plausible but not generated: in neither set, reportable.
            return;
        }

        self.specialized
            .insert(binary_operation_name(family, CType::Object, lcode, rcode));
        self.specialized
            .insert(binary_operation_name(family, CType::TriBool, lcode, rcode));
        self.specialized
            .insert(inplace_operation_name(family, lcode, rcode));

        // Discard-result variants only exist for the hottest same-shape
        // pairs; the selector's single degrade step widens the rest to
        // the tri-state boolean variant above.
        if left == right {
            self.specialized
                .insert(binary_operation_name(family, CType::Void, lcode, rcode));
        }

        // Unboxed long results for machine-word integer pairs.
        if family.has_clong_results()
            && matches!(left, Shape::Int | Shape::CLong)
            && matches!(right, Shape::Int | Shape::CLong)
        {
            self.specialized
                .insert(binary_operation_name(family, CType::CLong, lcode, rcode));
        }
    }

    fn classify_unary(&mut self, catalog: &ShapeCatalog, family: UnaryOpFamily, operand: Shape) {
        let code = operand.helper_code();
        let supported =
            catalog.is_universal(operand) || catalog.supports_slot(operand, family.slot());

        if !supported {
            self.nonspecialized
                .insert(unary_operation_name(family, CType::Object, code));
            return;
        }

        self.specialized
            .insert(unary_operation_name(family, CType::Object, code));
        if matches!(operand, Shape::Int | Shape::CLong) {
            self.specialized
                .insert(unary_operation_name(family, CType::CLong, code));
        }
    }

    fn classify_compare_pair(
        &mut self,
        catalog: &ShapeCatalog,
        family: CompareFamily,
        left: Shape,
        right: Shape,
    ) {
        // Every shape supports the comparison slot, so the comparison
        // families have an empty nonspecialized class; anything not hot
        // is a reportable gap.
        debug_assert!(catalog.supports_slot(left, Slot::Comparison));
        debug_assert!(catalog.supports_slot(right, Slot::Comparison));

        let hot = catalog.is_universal(left)
            || catalog.is_universal(right)
            || (left.is_numeric() && right.is_numeric())
            || (left.is_sequence() && left == right);
        if !hot {
            return;
        }

        let lcode = left.helper_code();
        let rcode = right.helper_code();
        for result in [CType::Object, CType::CBool, CType::TriBool] {
            self.specialized
                .insert(rich_compare_name(family, result, lcode, rcode));
        }
    }
}

/// Is a binary shape pair on the family's hot-specialization list?
///
/// Hot pairs are the combinations the helper generator actually emits:
/// numeric crosses (plus the universal shape on either side), same-shape
/// sequence concat, and sequence repeat against an index-shaped right or
/// left operand.
fn hot_binary_pair(
    catalog: &ShapeCatalog,
    family: BinaryOpFamily,
    left: Shape,
    right: Shape,
) -> bool {
    let numeric_side = |shape: Shape| {
        catalog.is_universal(shape)
            || (shape.is_numeric() && catalog.supports_slot(shape, family.numeric_slot()))
    };
    if numeric_side(left) && numeric_side(right) {
        return true;
    }

    let index_side = |shape: Shape| {
        catalog.is_universal(shape) || matches!(shape, Shape::Int | Shape::Long | Shape::CLong)
    };
    match family {
        BinaryOpFamily::Add => {
            // Sequence concat: same shape, or universal on one side.
            (left.is_sequence() && right == left)
                || (left.is_sequence() && catalog.is_universal(right))
                || (catalog.is_universal(left) && right.is_sequence())
        }
        BinaryOpFamily::Mult => {
            // Sequence repeat, both operand orders.
            (left.is_sequence() && index_side(right)) || (index_side(left) && right.is_sequence())
        }
        _ => false,
    }
}
