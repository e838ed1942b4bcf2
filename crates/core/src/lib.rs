//! Section Timing Profiler Core Library
//!
//! A lightweight in-process instrumentation profiler: bracket arbitrary code
//! regions ("sections") with enter/exit markers and accumulate per-section
//! timing statistics (count, total/min/max/average duration, and a
//! cumulative timeline) that can be printed or exported as CSV and JSON.
//!
//! ## Design
//!
//! - Per-name LIFO stacks of open sections: same-name sections nest,
//!   different names interleave freely
//! - An append-only ledger of completed measurements, in exit order
//! - Statistics recomputed from the ledger in one pass, idempotently
//! - Checked misuse: exit-without-enter is an error and marks the section
//!   as tainted rather than corrupting state
//!
//! ```
//! use sectionprof_core::Profiler;
//!
//! let mut profiler = Profiler::new();
//! profiler.enter_section("load");
//! // ... work ...
//! profiler.exit_section("load").unwrap();
//! profiler.print_stats();
//! ```

// Clock seam and timing records
pub mod clock;
pub mod record;

// Open-section registry and the aggregation pass
pub mod registry;
pub mod stats;

// Rendering, file export, and the facade
pub mod export;
pub mod profiler;

// Re-export the public surface
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use export::{ExportError, CSV_HEADER};
pub use profiler::{global, Profiler, ScopedSection, SectionError};
pub use record::{Ledger, SectionRecord, SectionStart, SourceLocation};
pub use registry::SectionRegistry;
pub use stats::{SectionStats, StatsReport};
