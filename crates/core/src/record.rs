//! Timing records and the elapsed-time ledger.
//!
//! A [`SectionStart`] marks an open section and lives only on the registry's
//! stack for its name. When the matching exit arrives it is consumed and a
//! [`SectionRecord`], the completed measurement, is appended to the
//! [`Ledger`]. The ledger is append-only and ordered by exit time; it is the
//! single source of truth that the statistics pass recomputes from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call-site metadata optionally stamped onto a record at exit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file of the exit call.
    pub file: String,
    /// Fully qualified function containing the exit call.
    pub function: String,
    /// Line of the exit call.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Capture the current file, line, and enclosing function as a
/// [`SourceLocation`].
///
/// Stands in for the original call-site macros; pass the result to
/// [`Profiler::exit_section_at`](crate::Profiler::exit_section_at).
#[macro_export]
macro_rules! section_location {
    () => {{
        // Resolving the type name of a local item yields the enclosing
        // function's path at compile time.
        fn here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        $crate::record::SourceLocation {
            file: file!().to_string(),
            function: type_name_of(here)
                .trim_end_matches("::here")
                .to_string(),
            line: line!(),
        }
    }};
}

/// An entered-but-not-exited section: the start-of-section timestamp.
///
/// Owned exclusively by the registry stack for its name; never shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionStart {
    /// Clock reading when the section was entered, in seconds.
    pub started_at: f64,
}

/// A completed section measurement. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Section name.
    pub name: String,
    /// Elapsed seconds between enter and exit.
    pub duration: f64,
    /// Call site of the exit, when the caller supplied one.
    pub location: Option<SourceLocation>,
}

/// Append-only sequence of completed section records, ordered by exit time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<SectionRecord>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed record. Records are never mutated or deduplicated.
    pub fn push(&mut self, record: SectionRecord) {
        self.records.push(record);
    }

    /// All records in completion (exit) order.
    #[must_use]
    pub fn records(&self) -> &[SectionRecord] {
        &self.records
    }

    /// Number of completed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no section has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_preserves_completion_order() {
        let mut ledger = Ledger::new();
        ledger.push(SectionRecord {
            name: "inner".to_string(),
            duration: 0.25,
            location: None,
        });
        ledger.push(SectionRecord {
            name: "outer".to_string(),
            duration: 1.0,
            location: None,
        });

        let names: Vec<&str> = ledger.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["inner", "outer"]);
    }

    #[test]
    fn test_ledger_clear() {
        let mut ledger = Ledger::new();
        ledger.push(SectionRecord {
            name: "x".to_string(),
            duration: 0.1,
            location: None,
        });
        assert_eq!(ledger.len(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_section_location_captures_this_function() {
        let loc = crate::section_location!();
        assert!(loc.file.ends_with("record.rs"));
        assert!(loc.function.contains("test_section_location_captures_this_function"));
        assert!(loc.line > 0);
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            file: "main.rs".to_string(),
            function: "demo::run".to_string(),
            line: 42,
        };
        assert_eq!(loc.to_string(), "main.rs:42 (demo::run)");
    }
}
