#![warn(missing_docs)]
//! # BudgetBench
//!
//! Performance budgets for benchmarked operations, checked in one pass.
//!
//! Declare budgets per operation, run them all, and get one verdict:
//! - **Allocation budgets**: maximum allocations and allocated bytes per op
//! - **Latency budgets**: maximum nanoseconds per op
//! - **Throughput budgets**: maximum and minimum MB/s
//! - **No short-circuit**: every constraint runs; every breach is reported
//! - **Two construction styles**: chained builder or option functions
//!
//! ## Quick Start
//!
//! ```ignore
//! use budgetbench::prelude::*;
//!
//! #[global_allocator]
//! static GLOBAL: TrackingAllocator = TrackingAllocator;
//!
//! fn parse(b: &mut Bencher) {
//!     b.set_bytes(512);
//!     b.iter(|| parse_header(&INPUT));
//! }
//!
//! let verdict = BenchmarkRunner::new()
//!     .append(parse, [with_max_allocs(0), with_min_throughput(100.0)])
//!     .add_constraint(Constraint::new(parse).with_max_ns_per_op(500).with_verbose())
//!     .run();
//!
//! if let Err(violations) = verdict {
//!     eprintln!("{}", violations);
//! }
//! ```

mod config;

pub use config::{BudgetConfig, CONFIG_FILE_NAME, HarnessConfig};

// Re-export harness types
pub use budgetbench_core::{
    Bencher, BenchmarkResult, Harness, LoopHarness, THROUGHPUT_UNIT, TrackingAllocator,
    current_allocation, derived_throughput, reset_allocation_counter, tracking_active,
};

// Re-export constraint types
pub use budgetbench_logic::{
    BenchmarkRunner, BudgetKind, BudgetViolations, Budgets, Constraint, ConstraintOption,
    MeasuredOperation, Violation, with_max_allocated_bytes, with_max_allocs, with_max_ns_per_op,
    with_max_throughput, with_min_throughput, with_verbose,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Bencher, BenchmarkRunner, Constraint, TrackingAllocator, with_max_allocated_bytes,
        with_max_allocs, with_max_ns_per_op, with_max_throughput, with_min_throughput,
        with_verbose,
    };
}

/// Install a `tracing` subscriber for BudgetBench's diagnostics.
///
/// Logs at debug level when `verbose`, info otherwise; `RUST_LOG` is not
/// consulted. Does nothing if a global subscriber is already set.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        "budgetbench=debug,budgetbench_core=debug,budgetbench_logic=debug"
    } else {
        "budgetbench=info,budgetbench_core=info,budgetbench_logic=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
