//! Benchmark Results
//!
//! Raw counters produced by one harness invocation, plus the per-operation
//! figures and throughput derived from them.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Unit under which a benchmark reports its own throughput figure
pub const THROUGHPUT_UNIT: &str = "MB/s";

/// Counters from the final timed round of a benchmark
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Number of operations performed in the final round
    pub iterations: u64,
    /// Measured wall time of the final round
    pub elapsed: Duration,
    /// Bytes processed per operation (set via `Bencher::set_bytes`)
    pub bytes: u64,
    /// Total allocations made while the timer was running
    pub mem_allocs: u64,
    /// Total bytes allocated while the timer was running
    pub mem_bytes: u64,
    /// Metrics reported by the benchmark itself, keyed by unit
    #[serde(default)]
    pub extra: FxHashMap<String, f64>,
}

impl BenchmarkResult {
    /// Nanoseconds per operation
    pub fn ns_per_op(&self) -> u64 {
        if self.iterations == 0 {
            return 0;
        }
        (self.elapsed.as_nanos() / self.iterations as u128) as u64
    }

    /// Allocations per operation
    pub fn allocs_per_op(&self) -> u64 {
        if self.iterations == 0 {
            return 0;
        }
        self.mem_allocs / self.iterations
    }

    /// Allocated bytes per operation
    pub fn alloc_bytes_per_op(&self) -> u64 {
        if self.iterations == 0 {
            return 0;
        }
        self.mem_bytes / self.iterations
    }

    /// Throughput in MB/s.
    ///
    /// A figure the benchmark reported under [`THROUGHPUT_UNIT`] wins;
    /// otherwise it is derived from bytes per op, iterations and elapsed time.
    pub fn mb_per_sec(&self) -> f64 {
        if let Some(&reported) = self.extra.get(THROUGHPUT_UNIT) {
            return reported;
        }
        derived_throughput(self.bytes, self.iterations, self.elapsed.as_secs_f64())
    }

    /// Memory summary: bytes and allocations per operation
    pub fn mem_string(&self) -> String {
        format!(
            "{:>8} B/op\t{:>8} allocs/op",
            self.alloc_bytes_per_op(),
            self.allocs_per_op()
        )
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}\t{:>10} ns/op", self.iterations, self.ns_per_op())?;
        if self.bytes > 0 || self.extra.contains_key(THROUGHPUT_UNIT) {
            write!(f, "\t{:>7.2} {}", self.mb_per_sec(), THROUGHPUT_UNIT)?;
        }
        let mut units: Vec<_> = self
            .extra
            .iter()
            .filter(|(unit, _)| unit.as_str() != THROUGHPUT_UNIT)
            .collect();
        units.sort_by(|a, b| a.0.cmp(b.0));
        for (unit, value) in units {
            write!(f, "\t{:>10.4} {}", value, unit)?;
        }
        Ok(())
    }
}

/// Throughput in MB/s from raw counters: `(bytes * n / 1e6) / seconds`.
///
/// Zero unless all three inputs are strictly positive.
pub fn derived_throughput(bytes: u64, n: u64, seconds: f64) -> f64 {
    if bytes == 0 || n == 0 || seconds <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * n as f64 / 1e6) / seconds
}
