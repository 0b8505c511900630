#![warn(missing_docs)]
//! BudgetBench Logic - Constraint Evaluation Engine
//!
//! Declares performance budgets for measured operations and evaluates them
//! against harness results. Every registered constraint is measured and
//! every breached budget is reported in one aggregate error.

mod constraint;
mod runner;
mod violation;

pub use constraint::{
    Budgets, Constraint, ConstraintOption, MeasuredOperation, with_max_allocated_bytes,
    with_max_allocs, with_max_ns_per_op, with_max_throughput, with_min_throughput, with_verbose,
};
pub use runner::BenchmarkRunner;
pub use violation::{BudgetKind, BudgetViolations, Violation};
