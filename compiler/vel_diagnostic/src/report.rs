//! Flattened report records.

use std::fmt;

use vel_ir::SourceLocation;

/// Report severity.
///
/// Reports are diagnostic-only: a compilation with many reports still
/// produces a correct binary. The surrounding driver may upgrade
/// severities with its strictness flag; the core never fails on one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One flattened report: a message plus every source location that hit it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub message: String,
    pub locations: Vec<SourceLocation>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        for loc in &self.locations {
            write!(f, "\n  at {loc}")?;
        }
        Ok(())
    }
}
