//! Harness Boundary
//!
//! The runner never drives iterations itself; it hands each measured
//! operation to a [`Harness`] and receives raw counters back.

use crate::bencher::{DEFAULT_BENCH_TIME, MAX_ITERATIONS, run_benchmark_loop};
use crate::result::BenchmarkResult;
use crate::Bencher;
use std::time::Duration;

/// Executes a measured operation repeatedly and reports raw counters
pub trait Harness {
    /// Measure `op`, returning the counters of the final timed round
    fn measure(&self, op: &dyn Fn(&mut Bencher)) -> BenchmarkResult;

    /// Whether results carry allocation counters. When false, allocation
    /// figures read zero.
    fn counts_allocations(&self) -> bool {
        true
    }
}

/// Default harness: grows the iteration count until a round lasts
/// `bench_time`
#[derive(Debug, Clone, PartialEq)]
pub struct LoopHarness {
    /// Target duration of the final timed round
    pub bench_time: Duration,
    /// Cap on iterations in any round
    pub max_iterations: u64,
    /// Read allocation counters during timed spans
    pub track_allocations: bool,
}

impl Default for LoopHarness {
    fn default() -> Self {
        Self {
            bench_time: DEFAULT_BENCH_TIME,
            max_iterations: MAX_ITERATIONS,
            track_allocations: true,
        }
    }
}

impl LoopHarness {
    /// Default harness with a different target round duration
    pub fn with_bench_time(bench_time: Duration) -> Self {
        Self {
            bench_time,
            ..Self::default()
        }
    }
}

impl Harness for LoopHarness {
    fn measure(&self, op: &dyn Fn(&mut Bencher)) -> BenchmarkResult {
        run_benchmark_loop(
            op,
            self.bench_time,
            self.max_iterations,
            self.track_allocations,
        )
    }

    fn counts_allocations(&self) -> bool {
        self.track_allocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_harness() {
        let harness = LoopHarness::default();
        assert_eq!(harness.bench_time, Duration::from_secs(1));
        assert_eq!(harness.max_iterations, 1_000_000_000);
        assert!(harness.track_allocations);
        assert!(harness.counts_allocations());

        let untracked = LoopHarness {
            track_allocations: false,
            ..LoopHarness::default()
        };
        assert!(!untracked.counts_allocations());
    }

    #[test]
    fn test_measure_through_trait_object() {
        let harness = LoopHarness {
            max_iterations: 64,
            ..LoopHarness::with_bench_time(Duration::from_secs(5))
        };
        let dyn_harness: &dyn Harness = &harness;

        let result = dyn_harness.measure(&|b: &mut Bencher| {
            b.set_bytes(8);
            b.iter(|| 1u64 + 1);
        });

        assert_eq!(result.iterations, 64);
        assert_eq!(result.bytes, 8);
    }
}
