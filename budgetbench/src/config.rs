//! Configuration loading from budget.toml
//!
//! Harness settings and per-operation budgets can be declared in a
//! `budget.toml` file. The file is discovered by walking up from the current
//! directory.

use budgetbench_core::{LoopHarness, MAX_ITERATIONS};
use budgetbench_logic::{Budgets, ConstraintOption};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up by [`BudgetConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "budget.toml";

/// BudgetBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BudgetConfig {
    /// Harness configuration
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Budgets keyed by operation label
    #[serde(default)]
    pub budgets: BTreeMap<String, Budgets>,
}

/// Settings for the default loop harness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Target duration of the final timed round (e.g., "1s", "200ms")
    #[serde(default = "default_bench_time")]
    pub bench_time: String,
    /// Cap on iterations in any round
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Read allocation counters during timed spans. When false, allocation
    /// budgets measure zero and always pass; the runner logs a warning.
    #[serde(default = "default_track")]
    pub track_allocations: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            bench_time: default_bench_time(),
            max_iterations: default_max_iterations(),
            track_allocations: default_track(),
        }
    }
}

fn default_bench_time() -> String {
    "1s".to_string()
}
fn default_max_iterations() -> u64 {
    MAX_ITERATIONS
}
fn default_track() -> bool {
    true
}

impl BudgetConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the nearest `budget.toml` in the current directory or an
    /// ancestor. A file that fails to parse is logged and skipped.
    pub fn discover() -> Option<Self> {
        let cwd = std::env::current_dir().ok()?;
        let path = cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file())?;
        Self::load(&path)
            .map_err(|e| {
                tracing::warn!(path = %path.display(), "ignoring {}: {}", CONFIG_FILE_NAME, e);
            })
            .ok()
    }

    /// Build the loop harness described by `[harness]`
    pub fn harness(&self) -> anyhow::Result<LoopHarness> {
        Ok(LoopHarness {
            bench_time: Self::parse_duration(&self.harness.bench_time)?,
            max_iterations: self.harness.max_iterations,
            track_allocations: self.harness.track_allocations,
        })
    }

    /// Budgets declared for `label`
    pub fn budgets_for(&self, label: &str) -> Option<Budgets> {
        self.budgets.get(label).copied()
    }

    /// Options applying the budgets declared for `label` (empty if none)
    pub fn options_for(&self, label: &str) -> Vec<ConstraintOption> {
        self.budgets
            .get(label)
            .map(Budgets::to_options)
            .unwrap_or_default()
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# BudgetBench Configuration

[harness]
# Target duration of the final timed round
bench_time = "1s"
# Cap on iterations in any round
max_iterations = 1000000000
# Count allocations (requires TrackingAllocator as the global allocator)
track_allocations = true

# Budgets keyed by operation label. Omitted fields are unchecked.
# [budgets.parse_header]
# max_allocs_per_op = 0
# max_allocated_bytes_per_op = 0
# max_ns_per_op = 500
# max_throughput = 10000.0
# min_throughput = 100.0
"#
        .to_string()
    }

    /// Parse a `bench_time` value: a number with an `ns`, `us`, `ms` or `s`
    /// suffix ("200ms", "1.5s")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        let (number, nanos_per_unit) = [("ns", 1.0), ("us", 1e3), ("ms", 1e6), ("s", 1e9)]
            .into_iter()
            .find_map(|(suffix, scale)| s.strip_suffix(suffix).map(|n| (n, scale)))
            .with_context(|| format!("bench_time {:?} needs a unit: ns, us, ms or s", s))?;

        let value: f64 = number
            .trim()
            .parse()
            .with_context(|| format!("bench_time {:?} is not a number", s))?;
        anyhow::ensure!(value.is_finite() && value > 0.0, "bench_time {:?} must be positive", s);

        Ok(Duration::from_nanos((value * nanos_per_unit) as u64))
    }
}
