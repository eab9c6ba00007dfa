//! Physical C representations of computed values.
//!
//! The optimizer may narrow a value's at-rest representation below the
//! generic object pointer (an unboxed `long`, a C `bool`, the tri-state
//! boolean enum). The C type decides reference-count obligations, the
//! failure check emitted after a call, and - when narrower than the
//! default - the helper code used in place of the shape's own code.

/// The C-level representation of a value or a helper result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CType {
    /// The default dynamic object pointer. Holds a reference at rest.
    Object,
    /// Unboxed C platform `long`.
    CLong,
    /// Plain C `bool`. Cannot carry an error, so helpers returning it
    /// are only selected for operations that cannot raise.
    CBool,
    /// Tri-state boolean enum: true / false / exception-pending.
    TriBool,
    /// Discard-result marker: the caller ignores the produced value.
    Void,
}

impl CType {
    /// Canonical short code used inside helper names.
    pub const fn helper_code(self) -> &'static str {
        match self {
            CType::Object => "OBJECT",
            CType::CLong => "CLONG",
            CType::CBool => "CBOOL",
            CType::TriBool => "NBOOL",
            CType::Void => "NVOID",
        }
    }

    /// C declaration text for a local of this type.
    pub const fn c_decl(self) -> &'static str {
        match self {
            CType::Object => "VelObject *",
            CType::CLong => "long ",
            CType::CBool => "bool ",
            CType::TriBool => "vel_tribool ",
            CType::Void => "void ",
        }
    }

    /// Does the at-rest representation hold a reference that must be
    /// released? True only for the dynamic object pointer; value types
    /// carry no cleanup obligation.
    #[inline]
    pub const fn holds_reference(self) -> bool {
        matches!(self, CType::Object)
    }

    /// The emitted failure test for a value of this type, or `None`
    /// when the representation cannot signal failure. Discard-result
    /// helpers carry no value, so they signal through the thread-state
    /// error flag instead.
    pub fn error_sentinel(self, name: &str) -> Option<String> {
        match self {
            CType::Object => Some(format!("{name} == NULL")),
            CType::TriBool => Some(format!("{name} == VEL_TRIBOOL_EXCEPTION")),
            CType::Void => Some("VEL_ERROR_OCCURRED()".to_owned()),
            CType::CLong | CType::CBool => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_object_holds_reference() {
        assert!(CType::Object.holds_reference());
        assert!(!CType::CLong.holds_reference());
        assert!(!CType::CBool.holds_reference());
        assert!(!CType::TriBool.holds_reference());
        assert!(!CType::Void.holds_reference());
    }

    #[test]
    fn sentinels() {
        assert_eq!(
            CType::Object.error_sentinel("tmp_x").as_deref(),
            Some("tmp_x == NULL")
        );
        assert_eq!(
            CType::TriBool.error_sentinel("t").as_deref(),
            Some("t == VEL_TRIBOOL_EXCEPTION")
        );
        assert_eq!(
            CType::Void.error_sentinel("ignored").as_deref(),
            Some("VEL_ERROR_OCCURRED()")
        );
        assert_eq!(CType::CBool.error_sentinel("b"), None);
        assert_eq!(CType::CLong.error_sentinel("n"), None);
    }
}
