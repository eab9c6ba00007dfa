//! The reporting sink: an append-only multimap of optimization-gap events.
//!
//! Every missing-helper and missing-optimization event is recorded here
//! for batch diagnostics at the end of compilation. The sink deduplicates
//! by key and accumulates every source location, in insertion order, so
//! one gap hit from fifty call sites becomes one report with fifty
//! locations. Purely observational: nothing here affects generated code.

use rustc_hash::FxHashMap;
use vel_ir::SourceLocation;

use crate::report::{Report, Severity};

/// What kind of gap an entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum GapKind {
    /// A helper name that was neither specialized nor declared
    /// nonspecialized.
    MissingHelper,
    /// A broader optimization opportunity the emitters noticed.
    MissingOptimization,
}

/// One accumulated entry.
#[derive(Clone, Debug, PartialEq, Eq)]
struct GapEntry {
    kind: GapKind,
    key: String,
    locations: Vec<SourceLocation>,
}

/// Append-only collector for optimization-gap events.
///
/// One sink per translation unit; a parallel driver merges per-unit
/// sinks at the very end with [`ReportingSink::merge`].
#[derive(Clone, Debug, Default)]
pub struct ReportingSink {
    /// Entries in first-seen order, for deterministic output.
    entries: Vec<GapEntry>,
    /// Key -> index into `entries`.
    index: FxHashMap<String, usize>,
}

impl ReportingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing specialized helper.
    pub fn report_missing_helper(&mut self, name: &str, location: SourceLocation) {
        self.record(GapKind::MissingHelper, name, location);
    }

    /// Record a missed optimization opportunity.
    pub fn report_missing_optimization(&mut self, description: &str, location: SourceLocation) {
        self.record(GapKind::MissingOptimization, description, location);
    }

    fn record(&mut self, kind: GapKind, key: &str, location: SourceLocation) {
        if let Some(&idx) = self.index.get(key) {
            self.entries[idx].locations.push(location);
            return;
        }
        self.index.insert(key.to_owned(), self.entries.len());
        self.entries.push(GapEntry {
            kind,
            key: key.to_owned(),
            locations: vec![location],
        });
    }

    /// Number of distinct gap keys recorded.
    pub fn distinct_gaps(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accumulated locations for one key, if it was recorded.
    pub fn locations_for(&self, key: &str) -> Option<&[SourceLocation]> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].locations.as_slice())
    }

    /// Fold another sink's entries into this one, preserving the other
    /// sink's insertion order after this one's.
    pub fn merge(&mut self, other: ReportingSink) {
        for entry in other.entries {
            for location in entry.locations {
                self.record(entry.kind, &entry.key, location);
            }
        }
    }

    /// Flatten into human-readable reports.
    ///
    /// Invoked once at the end of compilation by the external driver.
    /// `strict` upgrades the severity (driver policy); the reports never
    /// fail compilation inside the core.
    pub fn emit_report(&self, strict: bool) -> Vec<Report> {
        let severity = if strict {
            Severity::Warning
        } else {
            Severity::Info
        };
        self.entries
            .iter()
            .map(|entry| Report {
                severity,
                message: match entry.kind {
                    GapKind::MissingHelper => {
                        format!("no specialized helper {}", entry.key)
                    }
                    GapKind::MissingOptimization => entry.key.clone(),
                },
                locations: entry.locations.clone(),
            })
            .collect()
    }
}
