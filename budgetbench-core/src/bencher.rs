//! Bencher - The Benchmark Iteration API
//!
//! A measured operation receives a `Bencher` and performs its unit of work
//! `b.iterations()` times, usually through [`Bencher::iter`]. The harness
//! grows the iteration count round by round until a round lasts long enough
//! to be measured reliably.

use crate::allocator::allocation_totals;
use crate::measure::Timer;
use crate::result::BenchmarkResult;
use fxhash::FxHashMap;
use std::time::Duration;
use tracing::debug;

/// Default target duration of the final timed round
pub const DEFAULT_BENCH_TIME: Duration = Duration::from_secs(1);

/// Upper bound on iterations in a single round
pub const MAX_ITERATIONS: u64 = 1_000_000_000;

/// Iteration control handed to a measured operation for one round
pub struct Bencher {
    iterations: u64,
    bytes: u64,
    timer: Timer,
    track_allocations: bool,

    // Allocation totals when the timer last started
    start_alloc_bytes: u64,
    start_alloc_count: u64,
    // Allocations accumulated across timed spans
    alloc_bytes: u64,
    alloc_count: u64,

    extra: FxHashMap<String, f64>,
}

impl Bencher {
    /// Create a Bencher for a round of `iterations` operations
    pub fn new(iterations: u64, track_allocations: bool) -> Self {
        Self {
            iterations,
            bytes: 0,
            timer: Timer::new(),
            track_allocations,
            start_alloc_bytes: 0,
            start_alloc_count: 0,
            alloc_bytes: 0,
            alloc_count: 0,
            extra: FxHashMap::default(),
        }
    }

    /// Number of operations this round must perform
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Record the number of bytes processed by one operation.
    ///
    /// Enables the derived MB/s throughput figure.
    pub fn set_bytes(&mut self, bytes: u64) {
        self.bytes = bytes;
    }

    /// Report a custom metric for this round under `unit`.
    ///
    /// Reporting under `"MB/s"` overrides the derived throughput.
    pub fn report_metric(&mut self, value: f64, unit: &str) {
        self.extra.insert(unit.to_string(), value);
    }

    /// Resume timing and allocation counting
    pub fn start_timer(&mut self) {
        if self.timer.is_running() {
            return;
        }
        if self.track_allocations {
            let (bytes, count) = allocation_totals();
            self.start_alloc_bytes = bytes;
            self.start_alloc_count = count;
        }
        self.timer.start();
    }

    /// Pause timing and allocation counting
    pub fn stop_timer(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.timer.stop();
        if self.track_allocations {
            let (bytes, count) = allocation_totals();
            self.alloc_bytes += bytes.wrapping_sub(self.start_alloc_bytes);
            self.alloc_count += count.wrapping_sub(self.start_alloc_count);
        }
    }

    /// Zero the elapsed time and allocation counters without changing
    /// whether the timer is running
    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.alloc_bytes = 0;
        self.alloc_count = 0;
        if self.timer.is_running() && self.track_allocations {
            let (bytes, count) = allocation_totals();
            self.start_alloc_bytes = bytes;
            self.start_alloc_count = count;
        }
    }

    /// Run the closure once per iteration of this round
    #[inline]
    pub fn iter<T, F>(&mut self, mut f: F)
    where
        F: FnMut() -> T,
    {
        for _ in 0..self.iterations {
            let _ = std::hint::black_box(f());
        }
    }

    /// Run the routine once per iteration with an untimed setup before each
    #[inline]
    pub fn iter_with_setup<T, S, F, R>(&mut self, mut setup: S, mut routine: F)
    where
        S: FnMut() -> T,
        F: FnMut(T) -> R,
    {
        for _ in 0..self.iterations {
            self.stop_timer();
            let input = setup();
            self.start_timer();
            let _ = std::hint::black_box(routine(input));
        }
    }

    /// Elapsed measured time so far in this round
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Finalize the round and return its counters
    pub fn finish(mut self) -> BenchmarkResult {
        self.stop_timer();
        BenchmarkResult {
            iterations: self.iterations,
            elapsed: self.timer.elapsed(),
            bytes: self.bytes,
            mem_allocs: self.alloc_count,
            mem_bytes: self.alloc_bytes,
            extra: self.extra,
        }
    }
}

/// Run one timed round of `n` iterations
fn run_round<F>(runner_fn: &F, n: u64, track_allocations: bool) -> BenchmarkResult
where
    F: Fn(&mut Bencher) + ?Sized,
{
    let mut bencher = Bencher::new(n, track_allocations);
    bencher.start_timer();
    runner_fn(&mut bencher);
    bencher.finish()
}

/// Predict the next round's iteration count from the previous round.
///
/// Aims 20% past the goal, grows at most 100x and at least by one, and never
/// exceeds `max_iterations`.
pub fn predict_iterations(goal: Duration, last: &BenchmarkResult, max_iterations: u64) -> u64 {
    let prev_iters = last.iterations.max(1) as u128;
    let prev_ns = last.elapsed.as_nanos().max(1);

    let mut n = goal.as_nanos().saturating_mul(prev_iters) / prev_ns;
    n += n / 5;
    let n = u64::try_from(n).unwrap_or(u64::MAX);

    n.min(last.iterations.saturating_mul(100))
        .max(last.iterations.saturating_add(1))
        .min(max_iterations)
}

/// Run the full benchmark loop: one single-iteration round, then rounds of
/// predicted size until a round lasts at least `bench_time`.
///
/// Returns the counters of the final round.
///
/// # Arguments
/// * `runner_fn` - The measured operation
/// * `bench_time` - Target duration of the final round
/// * `max_iterations` - Cap on iterations in any round
/// * `track_allocations` - Read allocation counters during timed spans
pub fn run_benchmark_loop<F>(
    runner_fn: &F,
    bench_time: Duration,
    max_iterations: u64,
    track_allocations: bool,
) -> BenchmarkResult
where
    F: Fn(&mut Bencher) + ?Sized,
{
    let max_iterations = max_iterations.max(1);
    let mut result = run_round(runner_fn, 1, track_allocations);

    while result.elapsed < bench_time && result.iterations < max_iterations {
        let n = predict_iterations(bench_time, &result, max_iterations);
        debug!(
            iterations = n,
            previous_ns = result.elapsed.as_nanos() as u64,
            "growing benchmark round"
        );
        result = run_round(runner_fn, n, track_allocations);
    }

    result
}
