//! The profiler facade: lifecycle, enter/exit, stats, and export.
//!
//! A [`Profiler`] owns one [`SectionRegistry`] and one [`Ledger`] and routes
//! every mutation through them. It is intentionally unsynchronized (calls
//! never block and never yield), so it is safe under single-threaded access
//! or external mutual exclusion. Callers that need process-wide access use
//! [`global`], which wraps one lazily-constructed instance in a `Mutex` and
//! makes that external synchronization explicit in the type.
//!
//! Misuse is checked, not undefined: exiting a section that was never
//! entered returns [`SectionError::StackUnderflow`], and the offending name
//! is tracked as tainted (see [`Profiler::tainted_sections`]) so the
//! unreliability of its statistics stays observable.

use crate::clock::{Clock, MonotonicClock};
use crate::export::{self, ExportError};
use crate::record::{Ledger, SectionRecord, SectionStart, SourceLocation};
use crate::registry::SectionRegistry;
use crate::stats::{SectionStats, StatsReport};
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Contract violations reported by the facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// `exit` was called with no matching open `enter` for that name:
    /// a double exit or an exit without an enter.
    StackUnderflow {
        /// The section name whose stack was empty.
        name: String,
    },
    /// A stats lookup named a section with no records in the ledger.
    UnknownSection {
        /// The unknown section name.
        name: String,
    },
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionError::StackUnderflow { name } => {
                write!(f, "Section '{name}' exited without a matching enter")
            }
            SectionError::UnknownSection { name } => {
                write!(f, "Section '{name}' has no recorded timings")
            }
        }
    }
}

impl std::error::Error for SectionError {}

/// In-process instrumentation profiler.
///
/// Bracket code regions with [`enter_section`](Self::enter_section) /
/// [`exit_section`](Self::exit_section) (or a [`scope`](Self::scope) guard),
/// then read aggregates via [`calculate_stats`](Self::calculate_stats) or
/// export them.
#[derive(Debug, Default)]
pub struct Profiler<C: Clock = MonotonicClock> {
    clock: C,
    registry: SectionRegistry,
    ledger: Ledger,
    underflows: FxHashMap<String, u64>,
}

impl Profiler<MonotonicClock> {
    /// Create a profiler backed by the high-resolution monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> Profiler<C> {
    /// Create a profiler backed by `clock`. Tests inject a
    /// [`ManualClock`](crate::clock::ManualClock) here.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            registry: SectionRegistry::new(),
            ledger: Ledger::new(),
            underflows: FxHashMap::default(),
        }
    }

    /// The clock this profiler reads.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The ledger of completed records, in exit order.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Open a section under `name`. Always succeeds; sections with the same
    /// name nest, sections with different names interleave freely.
    pub fn enter_section(&mut self, name: &str) {
        let started_at = self.clock.now_seconds();
        self.registry.push(name, SectionStart { started_at });
    }

    /// Close the most recently opened section under `name`.
    ///
    /// # Errors
    /// [`SectionError::StackUnderflow`] if no section under `name` is open.
    pub fn exit_section(&mut self, name: &str) -> Result<(), SectionError> {
        self.exit_at(name, None)
    }

    /// Close the most recently opened section under `name`, stamping the
    /// record with the exit call site (see
    /// [`section_location!`](crate::section_location)).
    ///
    /// # Errors
    /// [`SectionError::StackUnderflow`] if no section under `name` is open.
    pub fn exit_section_at(
        &mut self,
        name: &str,
        location: SourceLocation,
    ) -> Result<(), SectionError> {
        self.exit_at(name, Some(location))
    }

    /// The one underlying exit operation; the public variants differ only in
    /// whether a call site is supplied.
    fn exit_at(
        &mut self,
        name: &str,
        location: Option<SourceLocation>,
    ) -> Result<(), SectionError> {
        let now = self.clock.now_seconds();
        let Some(start) = self.registry.pop(name) else {
            *self.underflows.entry(name.to_string()).or_insert(0) += 1;
            tracing::warn!(
                section = name,
                "exit without matching enter; statistics for this section are unreliable"
            );
            return Err(SectionError::StackUnderflow {
                name: name.to_string(),
            });
        };
        self.report_section_time(name, now - start.started_at, location);
        Ok(())
    }

    fn report_section_time(&mut self, name: &str, duration: f64, location: Option<SourceLocation>) {
        self.ledger.push(SectionRecord {
            name: name.to_string(),
            duration,
            location,
        });
    }

    /// Open a section and return a guard that closes it when dropped, on
    /// every exit path. The guard dereferences to the profiler, so nested
    /// scopes and manual enter/exit calls run through it; borrow order then
    /// forces inner guards to drop first.
    pub fn scope(&mut self, name: &str) -> ScopedSection<'_, C> {
        self.enter_section(name);
        ScopedSection {
            name: name.to_string(),
            profiler: self,
        }
    }

    /// Recompute aggregate statistics for every recorded section.
    ///
    /// A full pass over the ledger, rebuilt from scratch on every call:
    /// idempotent and side-effect free.
    #[must_use]
    pub fn calculate_stats(&self) -> StatsReport {
        StatsReport::aggregate(&self.ledger)
    }

    /// Recompute statistics and return a copy of the aggregates for `name`.
    ///
    /// # Errors
    /// [`SectionError::UnknownSection`] if the ledger holds no record for
    /// `name`.
    pub fn section_stats(&self, name: &str) -> Result<SectionStats, SectionError> {
        self.calculate_stats()
            .get(name)
            .cloned()
            .ok_or_else(|| SectionError::UnknownSection {
                name: name.to_string(),
            })
    }

    /// Recompute statistics and print the text table to stdout.
    pub fn print_stats(&self) {
        print!("{}", export::render_text(&self.calculate_stats()));
    }

    /// Recompute statistics and write them as CSV to `path`, truncating any
    /// existing file.
    ///
    /// # Errors
    /// [`ExportError::WriteFailed`] if the file cannot be written.
    pub fn save_stats_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        tracing::debug!(path = %path.as_ref().display(), "exporting stats as CSV");
        export::save_csv(&self.calculate_stats(), path)
    }

    /// Recompute statistics and write them as JSON to `path`, truncating any
    /// existing file.
    ///
    /// # Errors
    /// [`ExportError::SerializeFailed`] or [`ExportError::WriteFailed`] on
    /// encoding or I/O failure.
    pub fn save_stats_to_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        tracing::debug!(path = %path.as_ref().display(), "exporting stats as JSON");
        export::save_json(&self.calculate_stats(), path)
    }

    /// Number of currently-open sections under `name`.
    #[must_use]
    pub fn open_sections(&self, name: &str) -> usize {
        self.registry.open_count(name)
    }

    /// Names whose stacks have underflowed since the last reset, with the
    /// number of underflows seen. Statistics for these sections should be
    /// treated as unreliable.
    pub fn tainted_sections(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.underflows.iter().map(|(name, &count)| (name.as_str(), count))
    }

    /// Whether `name` has underflowed since the last reset.
    #[must_use]
    pub fn is_tainted(&self, name: &str) -> bool {
        self.underflows.contains_key(name)
    }

    /// Clear the ledger, all open-section stacks (abandoning open sections
    /// without recording them), and the taint set. The instance stays
    /// usable.
    pub fn reset(&mut self) {
        let abandoned = self.registry.total_open();
        if abandoned > 0 {
            tracing::debug!(abandoned, "reset abandoning open sections");
        }
        self.ledger.clear();
        self.registry.clear();
        self.underflows.clear();
    }
}

/// RAII timing guard: the section entered at construction is exited when the
/// guard drops, whether the bracketed region returns normally, early, or
/// unwinds.
pub struct ScopedSection<'p, C: Clock> {
    profiler: &'p mut Profiler<C>,
    name: String,
}

impl<C: Clock> Deref for ScopedSection<'_, C> {
    type Target = Profiler<C>;

    fn deref(&self) -> &Profiler<C> {
        self.profiler
    }
}

impl<C: Clock> DerefMut for ScopedSection<'_, C> {
    fn deref_mut(&mut self) -> &mut Profiler<C> {
        self.profiler
    }
}

impl<C: Clock> Drop for ScopedSection<'_, C> {
    fn drop(&mut self) {
        // Underflow here means the caller manually exited this name inside
        // the scope; the taint was already recorded by that exit path.
        let _ = self.profiler.exit_section(&self.name);
    }
}

static GLOBAL: OnceLock<Mutex<Profiler>> = OnceLock::new();

/// Process-wide profiler instance, constructed lazily on first access.
///
/// The `Mutex` is the external synchronization the profiler itself does not
/// provide; prefer a caller-owned [`Profiler`] where one owner is enough.
pub fn global() -> &'static Mutex<Profiler> {
    GLOBAL.get_or_init(|| Mutex::new(Profiler::new()))
}
