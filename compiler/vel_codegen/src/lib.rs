//! Operation emitters and condition compilation for the Vel code
//! generator.
//!
//! This crate turns the optimizer-annotated expression tree into
//! type-specialized C:
//!
//! - **[`EmissionContext`]** — per-translation-unit state: the
//!   structured instruction buffer, temp/label allocators, the
//!   cleanup-obligation set, and the reporting sink.
//! - **Operation emitters** — binary/unary/in-place, comparisons,
//!   subscript/attribute/slice, each pairing helper selection with the
//!   standard error-exit and reference-count contract.
//! - **Condition compilation** — boolean-context expressions compile to
//!   branches against caller-supplied labels, never to a materialized
//!   boolean temporary.
//! - **[`Codegen`]** — the driver seam: builds the shape catalog and
//!   the helper availability table once, then compiles modules against
//!   them.
//!
//! The whole crate is single-threaded and non-suspending; a parallel
//! driver runs one context per translation unit and merges the sinks.

mod access;
mod compare;
mod condition;
mod context;
mod expr;
mod instr;
mod operations;
mod stmt;

#[cfg(test)]
mod tests;

use thiserror::Error;
use vel_diagnostic::Report;
use vel_helpers::{HelperTable, HelperTableBuilder};
use vel_ir::{ExprArena, Module};
use vel_shapes::{CType, DialectVersion, ShapeCatalog};

pub use compare::emit_comparison;
pub use condition::emit_condition;
pub use context::{EmissionContext, LifecycleEvent, TempValue};
pub use expr::emit_expression;
pub use instr::{render_instrs, Instr};
pub use operations::{emit_binary_operation, emit_unary_operation};
pub use stmt::emit_statement;

/// Driver-facing configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Source dialect the static tables are built for.
    pub version: DialectVersion,
    /// Upgrade missing-helper reports from informational to warnings.
    pub strict_reports: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            version: DialectVersion::MODERN,
            strict_reports: false,
        }
    }
}

/// Result of compiling one translation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledModule {
    /// Generated C source.
    pub code: String,
    /// Accumulated optimization-gap reports, flattened.
    pub reports: Vec<Report>,
}

/// Driver-facing failures.
///
/// Selection misses never appear here — they degrade to the generic
/// path and at most produce reports.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The module was lowered for a different dialect than the static
    /// tables were built for.
    #[error("module `{module}` targets dialect {found}, but the code generator was built for {expected}")]
    VersionMismatch {
        module: String,
        expected: DialectVersion,
        found: DialectVersion,
    },
}

/// The code generator: static tables plus options.
///
/// The catalog and the availability table are built once here and
/// shared read-only by every emission context.
pub struct Codegen {
    catalog: ShapeCatalog,
    helpers: HelperTable,
    options: CompileOptions,
}

impl Codegen {
    /// Build the static tables for one dialect.
    pub fn new(options: CompileOptions) -> Self {
        let catalog = ShapeCatalog::new();
        let helpers = HelperTableBuilder::new(options.version).build(&catalog);
        Codegen {
            catalog,
            helpers,
            options,
        }
    }

    /// The shape catalog (read-only).
    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    /// The helper availability table (read-only).
    pub fn helpers(&self) -> &HelperTable {
        &self.helpers
    }

    /// Compile one translation unit to C.
    pub fn compile_module(
        &self,
        arena: &ExprArena,
        module: &Module,
    ) -> Result<CompiledModule, CodegenError> {
        if module.version != self.options.version {
            return Err(CodegenError::VersionMismatch {
                module: module.name.clone(),
                expected: self.options.version,
                found: module.version,
            });
        }
        tracing::debug!(module = %module.name, version = %module.version, "compiling module");

        let mut ctx = EmissionContext::new(
            &self.catalog,
            &self.helpers,
            module.version,
            module.name.clone(),
        );
        stmt::emit_module_body(&mut ctx, arena, module);
        let exception_exit = ctx.exception_exit().to_owned();
        let (instrs, sink) = ctx.finish();

        let locals = stmt::collect_locals(arena, module);
        let mut code = String::with_capacity(instrs.len() * 32 + 256);
        code.push_str(&format!(
            "static VelObject *vel_module_{}_run(void) {{\n",
            sanitize(&module.name)
        ));
        for (name, ctype) in &locals {
            code.push_str(&format!(
                "    {}var_{} = {};\n",
                ctype.c_decl(),
                name,
                zero_value(*ctype)
            ));
        }
        code.push_str(&render_instrs(&instrs));
        code.push_str("    VEL_REF(VEL_NONE);\n    return VEL_NONE;\n");
        code.push_str(&format!("{exception_exit}:;\n"));
        for (name, ctype) in &locals {
            if ctype.holds_reference() {
                code.push_str(&format!("    VEL_XUNREF(var_{name});\n"));
            }
        }
        code.push_str("    return NULL;\n}\n");

        let reports = sink.emit_report(self.options.strict_reports);
        tracing::debug!(module = %module.name, reports = reports.len(), "module compiled");
        Ok(CompiledModule { code, reports })
    }
}

/// The at-rest zero value for a local declaration.
fn zero_value(ctype: CType) -> &'static str {
    match ctype {
        CType::Object => "NULL",
        CType::CLong => "0L",
        CType::CBool => "false",
        CType::TriBool => "VEL_TRIBOOL_FALSE",
        CType::Void => unreachable!("no storage for a discarded result"),
    }
}

/// Make a module name usable inside a C identifier.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
