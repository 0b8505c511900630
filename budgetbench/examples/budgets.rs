//! BudgetBench Example
//!
//! Declares budgets for a few operations with both construction styles and
//! prints the verdict.
//!
//! Run with:
//!   cargo run --example budgets --release
//!
//! A `budget.toml` in the working directory (or any parent) adds budgets by
//! operation label and sets the harness round duration.

use budgetbench::prelude::*;
use budgetbench::{BudgetConfig, LoopHarness};
use std::hint::black_box;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

const PAYLOAD: &[u8] = &[0x5a; 4096];

/// Checksum a fixed buffer; allocation free
fn checksum(b: &mut Bencher) {
    b.set_bytes(PAYLOAD.len() as u64);
    b.iter(|| {
        PAYLOAD
            .iter()
            .fold(0u32, |acc, &x| acc.rotate_left(5) ^ u32::from(black_box(x)))
    });
}

/// Copy the buffer into a fresh Vec each time
fn copy_to_vec(b: &mut Bencher) {
    b.set_bytes(PAYLOAD.len() as u64);
    b.iter(|| black_box(PAYLOAD).to_vec());
}

/// Build a string, growing it without reserving
fn format_lines(b: &mut Bencher) {
    b.iter(|| {
        let mut s = String::new();
        for i in 0u32..32 {
            s.push_str(&i.to_string());
        }
        s
    });
}

fn main() -> ExitCode {
    budgetbench::init_logging(false);

    let config = BudgetConfig::discover().unwrap_or_default();
    let harness = match config.harness() {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("invalid harness configuration: {e}");
            LoopHarness::default()
        }
    };

    let runner = BenchmarkRunner::new()
        .append_named("checksum", checksum, [with_max_allocs(0), with_verbose()])
        .add_constraint(
            Constraint::named("copy_to_vec", copy_to_vec)
                .with_max_allocs(1)
                .with_max_allocated_bytes(4096)
                .with_min_throughput(100.0)
                .with_verbose(),
        )
        // Deliberately tight: string growth reallocates several times
        .append_named("format_lines", format_lines, [with_max_allocs(2), with_verbose()])
        .append_named("checksum_config", checksum, config.options_for("checksum"));

    match runner.run_with(&harness) {
        Ok(()) => {
            println!("\nall budgets met");
            ExitCode::SUCCESS
        }
        Err(violations) => {
            println!("\n{} budget(s) violated:", violations.len());
            for v in violations.violations() {
                println!("  {}", v);
            }
            ExitCode::FAILURE
        }
    }
}
