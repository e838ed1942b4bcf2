//! Rendering and file export of aggregated statistics.
//!
//! Three representations of a [`StatsReport`], all in the report's
//! first-seen section order:
//!
//! - a human-readable text table ([`render_text`]);
//! - CSV with a fixed nine-column header and a trailing comma per row
//!   ([`render_csv`], [`save_csv`]); the trailing comma is part of the
//!   format;
//! - JSON `{"profiler": [...]}` where each section object carries the same
//!   scalar fields plus its cumulative `Timeline` ([`render_json`],
//!   [`save_json`]).
//!
//! A section that never recorded a call site renders as `null`/`null`/`0`
//! in the file, function, and line columns.

use crate::stats::{SectionStats, StatsReport};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// CSV header row. The trailing comma matches the per-row column layout.
pub const CSV_HEADER: &str = "Section Name,Count,Total Time,Min Time,Max Time,\
                              Avg Time,Filename,Function Name,Line Number,";

/// Placeholder for a section with no recorded call site.
const NO_LOCATION: &str = "null";

/// Errors surfaced by the export layer.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to serialize the report.
    SerializeFailed(String),
    /// Failed to write the target file.
    WriteFailed(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            ExportError::WriteFailed(msg) => write!(f, "Failed to write: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

fn location_columns(stats: &SectionStats) -> (&str, &str, u32) {
    stats.last_location.as_ref().map_or(
        (NO_LOCATION, NO_LOCATION, 0),
        |location| (location.file.as_str(), location.function.as_str(), location.line),
    )
}

/// Render the report as a text table.
#[must_use]
pub fn render_text(report: &StatsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<32} {:>8} {:>12} {:>12} {:>12} {:>12}  {}",
        "Section", "Count", "Total (s)", "Min (s)", "Max (s)", "Avg (s)", "Call Site"
    );
    for stats in report.sections() {
        let call_site = stats
            .last_location
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let _ = writeln!(
            out,
            "{:<32} {:>8} {:>12.6} {:>12.6} {:>12.6} {:>12.6}  {}",
            stats.name,
            stats.count,
            stats.total_time,
            stats.min_time,
            stats.max_time,
            stats.avg_time,
            call_site
        );
    }
    out
}

/// Render the report as CSV: header plus one row per section.
#[must_use]
pub fn render_csv(report: &StatsReport) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for stats in report.sections() {
        let (file, function, line) = location_columns(stats);
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},",
            stats.name,
            stats.count,
            stats.total_time,
            stats.min_time,
            stats.max_time,
            stats.avg_time,
            file,
            function,
            line
        );
    }
    out
}

#[derive(Serialize)]
struct SectionRow<'a> {
    #[serde(rename = "Section Name")]
    section_name: &'a str,
    #[serde(rename = "Count")]
    count: u64,
    #[serde(rename = "Total Time")]
    total_time: f64,
    #[serde(rename = "Min Time")]
    min_time: f64,
    #[serde(rename = "Max Time")]
    max_time: f64,
    #[serde(rename = "Avg Time")]
    avg_time: f64,
    #[serde(rename = "Filename")]
    filename: &'a str,
    #[serde(rename = "Function Name")]
    function_name: &'a str,
    #[serde(rename = "Line Number")]
    line_number: u32,
    #[serde(rename = "Timeline")]
    timeline: &'a [f64],
}

#[derive(Serialize)]
struct ProfilerDocument<'a> {
    profiler: Vec<SectionRow<'a>>,
}

/// Render the report as the `{"profiler": [...]}` JSON document.
///
/// # Errors
/// Returns [`ExportError::SerializeFailed`] if JSON encoding fails.
pub fn render_json(report: &StatsReport) -> Result<String, ExportError> {
    let document = ProfilerDocument {
        profiler: report
            .sections()
            .iter()
            .map(|stats| {
                let (filename, function_name, line_number) = location_columns(stats);
                SectionRow {
                    section_name: &stats.name,
                    count: stats.count,
                    total_time: stats.total_time,
                    min_time: stats.min_time,
                    max_time: stats.max_time,
                    avg_time: stats.avg_time,
                    filename,
                    function_name,
                    line_number,
                    timeline: &stats.timeline,
                }
            })
            .collect(),
    };

    serde_json::to_string_pretty(&document)
        .map_err(|e| ExportError::SerializeFailed(e.to_string()))
}

/// Write the CSV rendering to `path`, truncating any existing content.
///
/// # Errors
/// Returns [`ExportError::WriteFailed`] if the file cannot be written.
pub fn save_csv<P: AsRef<Path>>(report: &StatsReport, path: P) -> Result<(), ExportError> {
    fs::write(path, render_csv(report)).map_err(|e| ExportError::WriteFailed(e.to_string()))
}

/// Write the JSON rendering to `path`, truncating any existing content.
///
/// # Errors
/// Returns [`ExportError::SerializeFailed`] if encoding fails, or
/// [`ExportError::WriteFailed`] if the file cannot be written.
pub fn save_json<P: AsRef<Path>>(report: &StatsReport, path: P) -> Result<(), ExportError> {
    let contents = render_json(report)?;
    fs::write(path, contents).map_err(|e| ExportError::WriteFailed(e.to_string()))
}
