#![warn(missing_docs)]
//! BudgetBench Core - Benchmark Harness
//!
//! This crate provides the execution primitive that budgets are checked
//! against:
//! - `Bencher` handed to each measured operation
//! - Iteration loop that grows rounds until they are long enough to time
//! - `Harness` trait, the boundary the constraint runner consumes
//! - Global allocator interceptor for per-thread allocation counts

mod allocator;
mod bencher;
mod harness;
mod measure;
mod result;

pub use allocator::{
    TrackingAllocator, allocation_totals, current_allocation, reset_allocation_counter,
    tracking_active,
};
pub use bencher::{
    Bencher, DEFAULT_BENCH_TIME, MAX_ITERATIONS, predict_iterations, run_benchmark_loop,
};
pub use harness::{Harness, LoopHarness};
pub use measure::Timer;
pub use result::{BenchmarkResult, THROUGHPUT_UNIT, derived_throughput};
