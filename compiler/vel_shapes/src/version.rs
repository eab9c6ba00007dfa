//! Source-dialect versions and version gates.
//!
//! The source language exists in two major dialects with diverging corners:
//! the legacy narrow integer type only exists under dialect 2, and the
//! evaluation order of dict-literal pairs flipped in dialect 3.5. Both the
//! helper availability tables and the emitters consult these gates, and
//! gated emitted code is wrapped in a conditional-compilation guard so the
//! generated C stays buildable against either runtime.

use std::fmt;

/// A source-dialect version, e.g. `2.7` or `3.11`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialectVersion {
    pub major: u8,
    pub minor: u8,
}

impl DialectVersion {
    /// Create a version.
    #[inline]
    pub const fn new(major: u8, minor: u8) -> Self {
        DialectVersion { major, minor }
    }

    /// The last legacy dialect release.
    pub const LEGACY: DialectVersion = DialectVersion::new(2, 7);

    /// The modern dialect baseline.
    pub const MODERN: DialectVersion = DialectVersion::new(3, 11);

    /// Dict-literal pairs evaluate key before value from dialect 3.5 on;
    /// older dialects evaluate the value first.
    #[inline]
    pub const fn dict_pairs_key_first(self) -> bool {
        self.major > 3 || (self.major == 3 && self.minor >= 5)
    }
}

impl fmt::Display for DialectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A predicate gating a shape or an emitted code path to certain dialects.
///
/// Gates carry the preprocessor guard wrapped around emitted code that is
/// only reachable under the gated dialect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VersionGate {
    /// Only legal under dialect 2.x (the legacy narrow integer).
    LegacyOnly,
}

impl VersionGate {
    /// Does the gate admit this dialect version?
    #[inline]
    pub const fn admits(self, version: DialectVersion) -> bool {
        match self {
            VersionGate::LegacyOnly => version.major == 2,
        }
    }

    /// The preprocessor guard for emitted code behind this gate.
    #[inline]
    pub const fn guard_macro(self) -> &'static str {
        match self {
            VersionGate::LegacyOnly => "VEL_LEGACY_INT",
        }
    }
}
