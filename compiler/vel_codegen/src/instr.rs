//! The structured instruction buffer.
//!
//! Emitters append [`Instr`] values instead of raw text. The buffer can
//! be inspected and amended before being flushed to text — the
//! short-circuit emitters splice a reference-count adjustment into an
//! already-emitted branch once both branches are known — and tests read
//! reference-count traffic from the structured form instead of parsing
//! C. [`render_instrs`] flattens the buffer exactly once, at the end of
//! a translation unit.

use smallvec::SmallVec;
use vel_shapes::CType;

/// One buffered instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// A literal C statement, without indentation.
    Stmt(String),
    /// Local declaration for a computed value.
    Decl { ctype: CType, name: String },
    /// Acquire a reference: `VEL_REF(name);`
    TakeRef(String),
    /// Release a reference: `VEL_UNREF(name);`
    ReleaseRef(String),
    /// A jump target.
    Label(String),
    /// An unconditional jump.
    Goto(String),
    /// The standard error-exit sequence: test the failure condition,
    /// release every temp still carrying a cleanup obligation, jump to
    /// the enclosing exception exit.
    ErrorCheck {
        condition: String,
        releases: SmallVec<[String; 4]>,
        target: String,
    },
    /// Begin a conditional-compilation guard for a version-gated path.
    GuardBegin(&'static str),
    /// End the innermost conditional-compilation guard.
    GuardEnd,
}

/// Flatten a buffer into C text.
///
/// Body statements are indented one level; labels and preprocessor
/// guards sit in column zero.
pub fn render_instrs(instrs: &[Instr]) -> String {
    let mut out = String::with_capacity(instrs.len() * 32);
    for instr in instrs {
        match instr {
            Instr::Stmt(text) => {
                out.push_str("    ");
                out.push_str(text);
                out.push('\n');
            }
            Instr::Decl { ctype, name } => {
                out.push_str("    ");
                out.push_str(ctype.c_decl());
                out.push_str(name);
                out.push_str(";\n");
            }
            Instr::TakeRef(name) => {
                out.push_str("    VEL_REF(");
                out.push_str(name);
                out.push_str(");\n");
            }
            Instr::ReleaseRef(name) => {
                out.push_str("    VEL_UNREF(");
                out.push_str(name);
                out.push_str(");\n");
            }
            Instr::Label(label) => {
                out.push_str(label);
                out.push_str(":;\n");
            }
            Instr::Goto(label) => {
                out.push_str("    goto ");
                out.push_str(label);
                out.push_str(";\n");
            }
            Instr::ErrorCheck {
                condition,
                releases,
                target,
            } => {
                out.push_str("    if (unlikely(");
                out.push_str(condition);
                out.push_str(")) {\n");
                for name in releases {
                    out.push_str("        VEL_UNREF(");
                    out.push_str(name);
                    out.push_str(");\n");
                }
                out.push_str("        goto ");
                out.push_str(target);
                out.push_str(";\n    }\n");
            }
            Instr::GuardBegin(guard) => {
                out.push_str("#if ");
                out.push_str(guard);
                out.push('\n');
            }
            Instr::GuardEnd => {
                out.push_str("#endif\n");
            }
        }
    }
    out
}
