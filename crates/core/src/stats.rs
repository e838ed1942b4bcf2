//! Statistics aggregation over the elapsed-time ledger.
//!
//! [`StatsReport::aggregate`] is a single O(n) pass over the ledger that
//! rebuilds every aggregate from scratch. It has no side effects on the
//! ledger, so recomputing any number of times over an unchanged ledger
//! yields identical reports.
//!
//! Sections appear in the report in first-seen ledger order. That order is
//! part of the export contract; text, CSV, and JSON all render rows in it.

use crate::record::{Ledger, SectionRecord, SourceLocation};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Aggregate timing statistics for one section name.
///
/// Derived data: fully recomputable from the ledger at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    /// Section name.
    pub name: String,
    /// Number of completed exits for this name.
    pub count: u64,
    /// Sum of all recorded durations, in seconds.
    pub total_time: f64,
    /// Shortest recorded duration, in seconds.
    pub min_time: f64,
    /// Longest recorded duration, in seconds.
    pub max_time: f64,
    /// `total_time / count`, in seconds.
    pub avg_time: f64,
    /// Most recent call site recorded for this name, when any exit supplied
    /// one (last write wins).
    pub last_location: Option<SourceLocation>,
    /// Running cumulative sum of this name's durations in ledger order:
    /// `timeline[k]` is the sum of the first `k + 1` durations. The last
    /// element equals `total_time`.
    pub timeline: Vec<f64>,
}

impl SectionStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            total_time: 0.0,
            min_time: f64::INFINITY,
            max_time: 0.0,
            avg_time: 0.0,
            last_location: None,
            timeline: Vec::new(),
        }
    }

    fn record(&mut self, record: &SectionRecord) {
        self.count += 1;
        self.total_time += record.duration;
        self.min_time = self.min_time.min(record.duration);
        self.max_time = self.max_time.max(record.duration);
        if let Some(location) = &record.location {
            self.last_location = Some(location.clone());
        }
        self.timeline.push(self.total_time);
    }

    fn finalize(&mut self) {
        if self.count > 0 {
            self.avg_time = self.total_time / self.count as f64;
        }
    }
}

/// Per-section aggregates for every name present in the ledger, in
/// first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    sections: Vec<SectionStats>,
    index: FxHashMap<String, usize>,
}

impl StatsReport {
    /// Recompute every aggregate from the ledger in one pass.
    #[must_use]
    pub fn aggregate(ledger: &Ledger) -> Self {
        let mut report = Self::default();
        for record in ledger.records() {
            let slot = match report.index.get(record.name.as_str()) {
                Some(&slot) => slot,
                None => {
                    let slot = report.sections.len();
                    report.sections.push(SectionStats::new(&record.name));
                    report.index.insert(record.name.clone(), slot);
                    slot
                }
            };
            report.sections[slot].record(record);
        }
        for stats in &mut report.sections {
            stats.finalize();
        }
        report
    }

    /// Aggregates for `name`, if any record exists for it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SectionStats> {
        self.index.get(name).map(|&slot| &self.sections[slot])
    }

    /// All sections in first-seen ledger order.
    #[must_use]
    pub fn sections(&self) -> &[SectionStats] {
        &self.sections
    }

    /// Number of distinct section names recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the ledger held no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn record(name: &str, duration: f64) -> SectionRecord {
        SectionRecord {
            name: name.to_string(),
            duration,
            location: None,
        }
    }

    fn located(name: &str, duration: f64, line: u32) -> SectionRecord {
        SectionRecord {
            name: name.to_string(),
            duration,
            location: Some(SourceLocation {
                file: "bench.rs".to_string(),
                function: "bench::run".to_string(),
                line,
            }),
        }
    }

    #[test]
    fn test_aggregate_counts_and_extremes() {
        let mut ledger = Ledger::new();
        ledger.push(record("sort", 0.010));
        ledger.push(record("sort", 0.020));
        ledger.push(record("sort", 0.005));

        let report = StatsReport::aggregate(&ledger);
        let stats = report.get("sort").unwrap();

        assert_eq!(stats.count, 3);
        assert_abs_diff_eq!(stats.total_time, 0.035, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.min_time, 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.max_time, 0.020, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.avg_time, 0.035 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_timeline_is_per_name_cumulative_sum() {
        let mut ledger = Ledger::new();
        ledger.push(record("a", 0.010));
        ledger.push(record("b", 1.0));
        ledger.push(record("a", 0.020));
        ledger.push(record("a", 0.005));

        let report = StatsReport::aggregate(&ledger);
        let a = report.get("a").unwrap();

        // "b"'s record must not leak into "a"'s cumulative sum.
        assert_eq!(a.timeline.len(), 3);
        assert_abs_diff_eq!(a.timeline[0], 0.010, epsilon = 1e-12);
        assert_abs_diff_eq!(a.timeline[1], 0.030, epsilon = 1e-12);
        assert_abs_diff_eq!(a.timeline[2], 0.035, epsilon = 1e-12);
        assert_abs_diff_eq!(*a.timeline.last().unwrap(), a.total_time, epsilon = 1e-12);

        assert_eq!(report.get("b").unwrap().timeline, vec![1.0]);
    }

    #[test]
    fn test_sections_kept_in_first_seen_order() {
        let mut ledger = Ledger::new();
        ledger.push(record("zulu", 0.1));
        ledger.push(record("alpha", 0.2));
        ledger.push(record("zulu", 0.3));
        ledger.push(record("mike", 0.4));

        let report = StatsReport::aggregate(&ledger);
        let names: Vec<&str> = report.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_last_location_wins() {
        let mut ledger = Ledger::new();
        ledger.push(located("draw", 0.1, 10));
        ledger.push(record("draw", 0.2));
        ledger.push(located("draw", 0.3, 99));

        let report = StatsReport::aggregate(&ledger);
        let location = report.get("draw").unwrap().last_location.as_ref().unwrap();
        assert_eq!(location.line, 99);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut ledger = Ledger::new();
        ledger.push(record("a", 0.25));
        ledger.push(record("b", 0.75));
        ledger.push(record("a", 0.50));

        let first = StatsReport::aggregate(&ledger);
        let second = StatsReport::aggregate(&ledger);
        assert_eq!(first.sections(), second.sections());
    }

    #[test]
    fn test_unknown_section_is_absent_not_zero() {
        let mut ledger = Ledger::new();
        ledger.push(record("present", 0.1));

        let report = StatsReport::aggregate(&ledger);
        assert!(report.get("absent").is_none());
    }

    #[test]
    fn test_empty_ledger_gives_empty_report() {
        let report = StatsReport::aggregate(&Ledger::new());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }
}
