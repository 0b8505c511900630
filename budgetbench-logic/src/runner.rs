//! Benchmark Runner
//!
//! An ordered, append-only list of constraints. Appending returns a new
//! runner and leaves the receiver untouched, so a shared prefix can be
//! forked freely. [`BenchmarkRunner::run`] measures every constraint in
//! registration order and reports all violations at once.

use crate::constraint::{Constraint, ConstraintOption, MeasuredOperation};
use crate::violation::{BudgetKind, BudgetViolations, Violation};
use budgetbench_core::{BenchmarkResult, Bencher, Harness, LoopHarness, tracking_active};
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Ordered set of constraints evaluated together
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner {
    constraints: Vec<Constraint>,
}

impl BenchmarkRunner {
    /// Create an empty runner
    pub fn new() -> Self {
        Self::default()
    }

    /// New runner with `constraint` appended
    pub fn add_constraint(&self, constraint: Constraint) -> Self {
        let mut constraints = Vec::with_capacity(self.constraints.len() + 1);
        constraints.extend(self.constraints.iter().cloned());
        constraints.push(constraint);
        Self { constraints }
    }

    /// New runner with a constraint on `func` built from `options`
    pub fn append<F>(&self, func: F, options: impl IntoIterator<Item = ConstraintOption>) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        self.add_constraint(Constraint::new(func).with_options(options))
    }

    /// Like [`append`](Self::append), with an explicit diagnostic label
    pub fn append_named<F>(
        &self,
        label: impl Into<String>,
        func: F,
        options: impl IntoIterator<Item = ConstraintOption>,
    ) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        self.add_constraint(Constraint::named(label, func).with_options(options))
    }

    /// Like [`append`](Self::append), for an existing shared operation
    pub fn append_operation(
        &self,
        operation: MeasuredOperation,
        options: impl IntoIterator<Item = ConstraintOption>,
    ) -> Self {
        self.add_constraint(Constraint::for_operation(operation).with_options(options))
    }

    /// Registered constraints, in execution order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of registered constraints
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether no constraints are registered
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Measure every constraint with the default [`LoopHarness`]
    pub fn run(&self) -> Result<(), BudgetViolations> {
        self.run_with(&LoopHarness::default())
    }

    /// Measure every constraint with `harness`.
    ///
    /// Every constraint runs even after earlier ones fail. Returns `Ok(())`
    /// only when no budget was breached; otherwise every violation, in
    /// discovery order.
    pub fn run_with<H>(&self, harness: &H) -> Result<(), BudgetViolations>
    where
        H: Harness + ?Sized,
    {
        self.run_reporting(harness, &mut io::stdout())
    }

    /// Body of [`run_with`](Self::run_with), writing progress lines of
    /// verbose constraints to `out`
    fn run_reporting<H, W>(&self, harness: &H, out: &mut W) -> Result<(), BudgetViolations>
    where
        H: Harness + ?Sized,
        W: Write,
    {
        if let Some(reason) = self.untracked_allocations(harness) {
            warn!("allocation budgets declared but {}; allocation counts will read zero", reason);
        }

        let mut violations = Vec::new();

        for (index, constraint) in self.constraints.iter().enumerate() {
            let id = constraint.operation().identifier(index);
            if constraint.is_verbose() {
                report_progress(out, format_args!("Executing : {}", id));
            }
            debug!(operation = %id, index, "measuring");

            let result = harness.measure(constraint.operation().as_fn());

            if constraint.is_verbose() {
                report_progress(out, format_args!("{}\t{}", result, result.mem_string()));
            }
            debug!(
                operation = %id,
                iterations = result.iterations,
                ns_per_op = result.ns_per_op(),
                allocs_per_op = result.allocs_per_op(),
                bytes_per_op = result.alloc_bytes_per_op(),
                mb_per_sec = result.mb_per_sec(),
                "measured"
            );

            let found = evaluate(&id, constraint, &result);
            for v in &found {
                warn!(operation = %v.operation, budget = v.budget, actual = v.actual, "{}", v.kind);
            }
            violations.extend(found);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(BudgetViolations::new(violations))
        }
    }

    /// Why allocation budgets cannot fail under `harness`, if they cannot
    fn untracked_allocations<H>(&self, harness: &H) -> Option<&'static str>
    where
        H: Harness + ?Sized,
    {
        if !self
            .constraints
            .iter()
            .any(|c| c.budgets().checks_allocations())
        {
            return None;
        }
        if !harness.counts_allocations() {
            Some("the harness does not count allocations")
        } else if !tracking_active() {
            Some("TrackingAllocator is not the global allocator")
        } else {
            None
        }
    }
}

/// Write one progress line. Output failures never affect the verdict.
fn report_progress<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        debug!("progress line not written: {}", e);
    }
}

/// Compare every declared budget against one result
fn evaluate(id: &str, constraint: &Constraint, result: &BenchmarkResult) -> Vec<Violation> {
    let budgets = constraint.budgets();
    let mut violations = Vec::new();
    let mut breach = |kind: BudgetKind, budget: f64, actual: f64| {
        violations.push(Violation {
            operation: id.to_string(),
            kind,
            budget,
            actual,
        });
    };

    if let Some(max) = budgets.max_allocs_per_op {
        let actual = result.allocs_per_op();
        if actual > max {
            breach(BudgetKind::MaxAllocsPerOp, max as f64, actual as f64);
        }
    }

    if let Some(max) = budgets.max_allocated_bytes_per_op {
        let actual = result.alloc_bytes_per_op();
        if actual > max {
            breach(BudgetKind::MaxAllocatedBytesPerOp, max as f64, actual as f64);
        }
    }

    if let Some(max) = budgets.max_ns_per_op {
        let actual = result.ns_per_op();
        if actual > max {
            breach(BudgetKind::MaxNsPerOp, max as f64, actual as f64);
        }
    }

    // Derived once; zero when the operation never set bytes
    let throughput = result.mb_per_sec();

    if let Some(max) = budgets.max_throughput {
        if throughput > max {
            breach(BudgetKind::MaxThroughput, max, throughput);
        }
    }

    if let Some(min) = budgets.min_throughput {
        if throughput < min {
            breach(BudgetKind::MinThroughput, min, throughput);
        }
    }

    violations
}
