//! Benchmark workloads that exercise the section profiler.
//!
//! The workloads only exist to generate timing samples: a trigonometric
//! micro-benchmark with nested and tightly repeated sections, and a sorting
//! benchmark comparing stable and unstable sorts over the same random input.

use clap::Parser;
use sectionprof_core::{section_location, Profiler, SectionError};
use std::f32::consts::PI;
use std::path::PathBuf;

const DEGREES_TO_RADIANS: f32 = PI / 180.0;

/// Section profiler demo with configurable workloads
#[derive(Parser, Debug)]
#[command(name = "demo-bench")]
#[command(about = "Section-timing profiler demo workloads", long_about = None)]
struct Args {
    /// Workload to run (trig, sort, all)
    #[arg(short, long, default_value = "all")]
    workload: String,

    /// Number of random angles in the trig workload
    #[arg(short, long, default_value_t = 100_000)]
    entries: usize,

    /// Length of the arrays in the sort workload
    #[arg(short, long, default_value_t = 50_000)]
    sort_len: usize,

    /// Times each workload repeats
    #[arg(short, long, default_value_t = 3)]
    rounds: u32,

    /// Write aggregate statistics as CSV to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write aggregate statistics as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Trigonometric micro-benchmark: random angle generation, then a cos/sin
/// scan with a tight per-iteration section inside the timed loop.
fn trig_workload(profiler: &mut Profiler, entries: usize) -> Result<(), SectionError> {
    let mut scope = profiler.scope("Trig Speed Test");

    scope.enter_section("Random Angle Generation");
    let yaw_degrees: Vec<f32> = (0..entries)
        .map(|_| 360.0 * rand::random::<f32>())
        .collect();
    scope.exit_section_at("Random Angle Generation", section_location!())?;

    let mut biggest_so_far = 0.0_f32;

    scope.enter_section("Total Cos and Sin Compute");
    for &yaw in &yaw_degrees {
        let cos_degrees = (yaw * DEGREES_TO_RADIANS).cos();
        let sin_degrees = (yaw * DEGREES_TO_RADIANS).sin();

        scope.enter_section("Cos and Sin Compute");
        if cos_degrees + sin_degrees > biggest_so_far {
            biggest_so_far = cos_degrees + sin_degrees;
        }
        scope.exit_section("Cos and Sin Compute")?;
    }
    scope.exit_section_at("Total Cos and Sin Compute", section_location!())?;

    println!("Biggest cos+sin = {biggest_so_far}");
    Ok(())
}

/// Sorting benchmark: stable vs unstable sort over the same random input.
fn sort_workload(profiler: &mut Profiler, len: usize) -> Result<(), SectionError> {
    let mut scope = profiler.scope("Sort Speed Test");

    scope.enter_section("Random Array Generation");
    let values: Vec<u64> = (0..len).map(|_| rand::random::<u64>()).collect();
    scope.exit_section_at("Random Array Generation", section_location!())?;

    let mut stable = values.clone();
    scope.enter_section("Stable Sort");
    stable.sort();
    scope.exit_section_at("Stable Sort", section_location!())?;

    let mut unstable = values;
    scope.enter_section("Unstable Sort");
    unstable.sort_unstable();
    scope.exit_section_at("Unstable Sort", section_location!())?;

    println!(
        "Sorted {len} values, smallest = {}",
        stable.first().copied().unwrap_or_default()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("=== Section Profiler Demo ===\n");

    let mut profiler = Profiler::new();

    let (run_trig, run_sort) = match args.workload.to_lowercase().as_str() {
        "trig" => (true, false),
        "sort" => (false, true),
        "all" => (true, true),
        other => {
            println!("Unknown workload '{other}', running all");
            (true, true)
        }
    };

    for round in 1..=args.rounds {
        println!("--- Round {round}/{} ---", args.rounds);
        if run_trig {
            trig_workload(&mut profiler, args.entries)?;
        }
        if run_sort {
            sort_workload(&mut profiler, args.sort_len)?;
        }
    }

    println!();
    profiler.print_stats();

    if let Some(path) = &args.csv {
        profiler.save_stats_to_csv(path)?;
        println!("Wrote CSV stats to {}", path.display());
    }
    if let Some(path) = &args.json {
        profiler.save_stats_to_json(path)?;
        println!("Wrote JSON stats to {}", path.display());
    }

    Ok(())
}
