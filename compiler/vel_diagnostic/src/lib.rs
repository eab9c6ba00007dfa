//! Missing-helper and missing-optimization reporting for the Vel code
//! generator.
//!
//! Selection misses are never compilation errors: when no specialized
//! helper exists for an operand-shape combination, generation falls back
//! to the generic dynamic-dispatch path and — when the gap is not
//! declared intentional — records the event here. The driver flattens
//! the accumulated events into batch diagnostics once, after all
//! translation units are done.

mod report;
mod sink;

pub use report::{Report, Severity};
pub use sink::ReportingSink;
