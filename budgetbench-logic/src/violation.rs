//! Budget Violations
//!
//! A violation records one measured figure breaching one declared budget.
//! All violations from a run are folded into a single [`BudgetViolations`]
//! error.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which budget a violation breached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    /// Allocations per operation above the maximum
    MaxAllocsPerOp,
    /// Allocated bytes per operation above the maximum
    MaxAllocatedBytesPerOp,
    /// Nanoseconds per operation above the maximum
    MaxNsPerOp,
    /// Throughput above the maximum
    MaxThroughput,
    /// Throughput below the minimum
    MinThroughput,
}

impl BudgetKind {
    /// Human-readable description of the breach
    pub fn description(self) -> &'static str {
        match self {
            BudgetKind::MaxAllocsPerOp => "exceeded max allocations per op",
            BudgetKind::MaxAllocatedBytesPerOp => "exceeded max allocated bytes per op",
            BudgetKind::MaxNsPerOp => "exceeded max ns per op",
            BudgetKind::MaxThroughput => "exceeded max MB/s",
            BudgetKind::MinThroughput => "was below min MB/s",
        }
    }
}

impl fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One measured figure breaching one budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the measured operation
    pub operation: String,
    /// Breached budget
    pub kind: BudgetKind,
    /// Declared budget value
    pub budget: f64,
    /// Measured value
    pub actual: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} (measured {}, budget {})",
            self.operation, self.kind, self.actual, self.budget
        )
    }
}

/// Every violation found in one run, in discovery order
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{}", join_violations(.violations))]
pub struct BudgetViolations {
    violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BudgetViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Individual violations, in discovery order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false for a returned error; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations recorded against one operation identifier
    pub fn for_operation<'a>(&'a self, operation: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.operation == operation)
    }
}

impl IntoIterator for BudgetViolations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}
