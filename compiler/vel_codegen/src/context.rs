//! Emission context and state.
//!
//! One `EmissionContext` per translation unit. It owns the instruction
//! buffer, the temp and label allocators, the cleanup-obligation set,
//! and the per-unit reporting sink. Nothing in it is shared: a parallel
//! driver gives each unit its own context and merges sinks at the end.

use smallvec::SmallVec;
use vel_diagnostic::ReportingSink;
use vel_helpers::HelperTable;
use vel_ir::{SourceLocation, Span};
use vel_shapes::{CType, DialectVersion, ShapeCatalog};

use crate::instr::Instr;

/// A compiler-internal name bound to a computed value during emission.
///
/// Whether the emitted code currently owns a reference to the value is
/// tracked by the context's cleanup set, not by the handle itself: a
/// handle may change from borrowed to owned (take-reference) or give
/// its reference away (transfer into a destination) while emission of
/// the enclosing statement is still in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempValue {
    pub name: String,
    pub ctype: CType,
}

impl TempValue {
    /// A handle for an expression result nobody reads.
    pub fn discard() -> Self {
        TempValue {
            name: String::new(),
            ctype: CType::Void,
        }
    }
}

/// One reference-count lifecycle event.
///
/// Recorded alongside the instruction buffer so tests can verify that
/// every acquired obligation is released or transferred exactly once
/// without parsing generated text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The emitted code acquired an owned reference for this name.
    Acquired(String),
    /// The owned reference was released on the success path.
    Released(String),
    /// Ownership moved into a destination; no release will follow.
    Transferred(String),
}

/// Code-emission context for one translation unit.
pub struct EmissionContext<'a> {
    pub catalog: &'a ShapeCatalog,
    pub helpers: &'a HelperTable,
    pub version: DialectVersion,
    module_name: String,
    sink: ReportingSink,
    instrs: Vec<Instr>,
    events: Vec<LifecycleEvent>,
    /// Names currently carrying a cleanup obligation, in acquisition
    /// order so error-exit release lists are deterministic.
    cleanup: Vec<String>,
    temp_counter: u32,
    label_counter: u32,
    exception_exit: String,
}

impl<'a> EmissionContext<'a> {
    /// Create a context for one translation unit.
    pub fn new(
        catalog: &'a ShapeCatalog,
        helpers: &'a HelperTable,
        version: DialectVersion,
        module_name: impl Into<String>,
    ) -> Self {
        EmissionContext {
            catalog,
            helpers,
            version,
            module_name: module_name.into(),
            sink: ReportingSink::new(),
            instrs: Vec::with_capacity(64),
            events: Vec::new(),
            cleanup: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
            exception_exit: "frame_exception_exit".to_owned(),
        }
    }

    /// The enclosing exception-exit label.
    #[inline]
    pub fn exception_exit(&self) -> &str {
        &self.exception_exit
    }

    /// Anchor a span to this translation unit.
    pub fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(self.module_name.clone(), span)
    }

    /// The per-unit reporting sink.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut ReportingSink {
        &mut self.sink
    }

    // ── Buffer ──────────────────────────────────────────────────────

    /// Append an instruction.
    pub fn push(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    /// Append a literal C statement.
    pub fn stmt(&mut self, text: impl Into<String>) {
        self.instrs.push(Instr::Stmt(text.into()));
    }

    /// Current buffer position, for a later [`splice_at`].
    ///
    /// [`splice_at`]: EmissionContext::splice_at
    pub fn checkpoint(&self) -> usize {
        self.instrs.len()
    }

    /// Insert an instruction at a recorded checkpoint.
    ///
    /// This is the two-phase commit used by the short-circuit emitters:
    /// a branch is amended with a reference-count adjustment once both
    /// branches are known, without re-emitting either. A spliced
    /// adjustment belongs to a single runtime branch, so it stays out
    /// of the linear lifecycle trace.
    pub fn splice_at(&mut self, checkpoint: usize, instr: Instr) {
        debug_assert!(checkpoint <= self.instrs.len());
        self.instrs.insert(checkpoint, instr);
    }

    /// The buffered instructions (tests and the final renderer).
    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Recorded lifecycle events (dry-run verification).
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Obligations still outstanding (zero between statements).
    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    /// Take the buffer and the sink, consuming the context.
    pub fn finish(self) -> (Vec<Instr>, ReportingSink) {
        debug_assert!(
            self.cleanup.is_empty(),
            "cleanup obligations leaked past the last statement: {:?}",
            self.cleanup
        );
        (self.instrs, self.sink)
    }

    // ── Temp and label allocation ───────────────────────────────────

    /// Declare a fresh temp of `ctype`, emitting its declaration.
    ///
    /// Discarded results have no storage; request them through
    /// [`TempValue::discard`] instead.
    pub fn declare_temp(&mut self, hint: &str, ctype: CType) -> TempValue {
        debug_assert!(ctype != CType::Void, "no storage for a discarded result");
        let n = self.temp_counter;
        self.temp_counter += 1;
        let name = format!("tmp_{hint}_{n}");
        self.instrs.push(Instr::Decl {
            ctype,
            name: name.clone(),
        });
        TempValue { name, ctype }
    }

    /// Allocate a fresh jump label.
    pub fn fresh_label(&mut self, hint: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("{hint}_{n}")
    }

    // ── Cleanup obligations ─────────────────────────────────────────

    /// Does this handle currently carry a cleanup obligation?
    pub fn needs_cleanup(&self, value: &TempValue) -> bool {
        self.cleanup.iter().any(|name| *name == value.name)
    }

    /// Record that the emitted code owns a reference held in `value`.
    pub fn add_cleanup(&mut self, value: &TempValue) {
        debug_assert!(
            value.ctype.holds_reference(),
            "{:?} cannot hold a reference",
            value.ctype
        );
        debug_assert!(!self.needs_cleanup(value), "{} acquired twice", value.name);
        self.events.push(LifecycleEvent::Acquired(value.name.clone()));
        self.cleanup.push(value.name.clone());
    }

    /// Emit a take-reference and record the new obligation.
    pub fn take_ref(&mut self, value: &TempValue) {
        self.instrs.push(Instr::TakeRef(value.name.clone()));
        self.add_cleanup(value);
    }

    /// Make sure `value` is owned: borrowed object handles get a
    /// take-reference, value types and already-owned handles pass
    /// through untouched.
    pub fn ensure_owned(&mut self, value: &TempValue) {
        if value.ctype.holds_reference() && !self.needs_cleanup(value) {
            self.take_ref(value);
        }
    }

    /// Release `value` on the success path, if it is owned. Borrowed
    /// handles and value types are left alone.
    pub fn release(&mut self, value: &TempValue) {
        if let Some(pos) = self.cleanup.iter().position(|name| *name == value.name) {
            self.cleanup.remove(pos);
            self.events.push(LifecycleEvent::Released(value.name.clone()));
            self.instrs.push(Instr::ReleaseRef(value.name.clone()));
        }
    }

    /// Move ownership out of the cleanup set without emitting a
    /// release: the reference now lives in a destination slot.
    pub fn transfer(&mut self, value: &TempValue) {
        let pos = self
            .cleanup
            .iter()
            .position(|name| *name == value.name)
            .unwrap_or_else(|| panic!("{} transferred but not owned", value.name));
        self.cleanup.remove(pos);
        self.events
            .push(LifecycleEvent::Transferred(value.name.clone()));
    }

    // ── Error exits ─────────────────────────────────────────────────

    /// Pair a completed call with the standard error-exit sequence.
    ///
    /// No-op when the static may-raise analysis cleared the operation
    /// or the result representation cannot signal failure. The release
    /// list snapshots every live obligation except the failed result
    /// itself, so no reference leaks on the error path.
    pub fn emit_error_check(&mut self, result: &TempValue, needs_check: bool) {
        if !needs_check {
            return;
        }
        let Some(condition) = result.ctype.error_sentinel(&result.name) else {
            return;
        };
        self.emit_error_check_with(condition, result);
    }

    /// Error-exit sequence with an explicit failure condition (used by
    /// the in-place path, whose success flag has no sentinel).
    pub fn emit_error_check_with(&mut self, condition: String, result: &TempValue) {
        let releases: SmallVec<[String; 4]> = self
            .cleanup
            .iter()
            .filter(|name| **name != result.name)
            .cloned()
            .collect();
        self.instrs.push(Instr::ErrorCheck {
            condition,
            releases,
            target: self.exception_exit.clone(),
        });
    }
}
