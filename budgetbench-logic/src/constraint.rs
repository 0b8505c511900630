//! Constraints
//!
//! A constraint pairs a measured operation with the budgets it must stay
//! within. Two syntaxes build one: chained `with_*` methods on the value, or
//! free option functions applied in order by the runner. Both funnel through
//! [`Constraint::apply`].

use budgetbench_core::Bencher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

type OperationFn = dyn Fn(&mut Bencher) + Send + Sync;

/// A unit of work the harness runs repeatedly.
///
/// Cheap to clone; clones share the same callable.
#[derive(Clone)]
pub struct MeasuredOperation {
    func: Arc<OperationFn>,
    label: Option<String>,
    type_name: &'static str,
}

impl MeasuredOperation {
    /// Wrap an operation, identified by its type name in diagnostics
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            label: None,
            type_name: std::any::type_name::<F>(),
        }
    }

    /// Wrap an operation with an explicit diagnostic label
    pub fn named<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        Self {
            label: Some(label.into()),
            ..Self::new(func)
        }
    }

    /// Explicit label, if one was supplied
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Identifier used in diagnostics for the operation registered at
    /// `index`.
    ///
    /// Explicit labels are used verbatim. A function item is named by its
    /// path. Any other type name (closures, fn pointers, boxed or shared
    /// trait objects) is shared between distinct operations, so it is
    /// suffixed with the registration index.
    pub fn identifier(&self, index: usize) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        if names_fn_item(self.type_name) {
            self.type_name.to_string()
        } else {
            format!("{}#{}", self.type_name, index)
        }
    }

    /// The callable, as handed to the harness
    pub fn as_fn(&self) -> &(dyn Fn(&mut Bencher) + Send + Sync) {
        self.func.as_ref()
    }

    /// Whether both handles share one callable
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Whether a type name is the path of a function item, unique per function
fn names_fn_item(type_name: &str) -> bool {
    !(type_name.contains("fn(")
        || type_name.starts_with('&')
        || type_name.contains("dyn ")
        || type_name.contains("{{closure}}"))
}

impl fmt::Debug for MeasuredOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasuredOperation")
            .field("label", &self.label)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Declared budgets. `None` leaves a metric unchecked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Budgets {
    /// Maximum allocations per operation
    pub max_allocs_per_op: Option<u64>,
    /// Maximum allocated bytes per operation
    pub max_allocated_bytes_per_op: Option<u64>,
    /// Maximum nanoseconds per operation
    pub max_ns_per_op: Option<u64>,
    /// Maximum throughput in MB/s
    pub max_throughput: Option<f64>,
    /// Minimum throughput in MB/s
    pub min_throughput: Option<f64>,
}

impl Budgets {
    /// Whether no budget is declared
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether any allocation budget is declared
    pub fn checks_allocations(&self) -> bool {
        self.max_allocs_per_op.is_some() || self.max_allocated_bytes_per_op.is_some()
    }

    /// The declared budgets as options, in field order
    pub fn to_options(&self) -> Vec<ConstraintOption> {
        let mut options = Vec::new();
        if let Some(v) = self.max_allocs_per_op {
            options.push(with_max_allocs(v));
        }
        if let Some(v) = self.max_allocated_bytes_per_op {
            options.push(with_max_allocated_bytes(v));
        }
        if let Some(v) = self.max_ns_per_op {
            options.push(with_max_ns_per_op(v));
        }
        if let Some(v) = self.max_throughput {
            options.push(with_max_throughput(v));
        }
        if let Some(v) = self.min_throughput {
            options.push(with_min_throughput(v));
        }
        options
    }
}

/// Sets one field of a [`Constraint`] when applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintOption {
    /// Set the maximum allocations per operation
    MaxAllocsPerOp(u64),
    /// Set the maximum allocated bytes per operation
    MaxAllocatedBytesPerOp(u64),
    /// Set the maximum nanoseconds per operation
    MaxNsPerOp(u64),
    /// Set the maximum throughput (MB/s)
    MaxThroughput(f64),
    /// Set the minimum throughput (MB/s)
    MinThroughput(f64),
    /// Print progress lines around this constraint's measurement
    Verbose,
}

/// Option setting the maximum allocations per operation
pub fn with_max_allocs(max: u64) -> ConstraintOption {
    ConstraintOption::MaxAllocsPerOp(max)
}

/// Option setting the maximum allocated bytes per operation
pub fn with_max_allocated_bytes(max: u64) -> ConstraintOption {
    ConstraintOption::MaxAllocatedBytesPerOp(max)
}

/// Option setting the maximum nanoseconds per operation
pub fn with_max_ns_per_op(max: u64) -> ConstraintOption {
    ConstraintOption::MaxNsPerOp(max)
}

/// Option setting the maximum throughput (MB/s)
pub fn with_max_throughput(max: f64) -> ConstraintOption {
    ConstraintOption::MaxThroughput(max)
}

/// Option setting the minimum throughput (MB/s)
pub fn with_min_throughput(min: f64) -> ConstraintOption {
    ConstraintOption::MinThroughput(min)
}

/// Option enabling progress lines
pub fn with_verbose() -> ConstraintOption {
    ConstraintOption::Verbose
}

/// A measured operation and the budgets it must meet
#[derive(Debug, Clone)]
pub struct Constraint {
    operation: MeasuredOperation,
    verbose: bool,
    budgets: Budgets,
}

impl Constraint {
    /// Constraint on `func` with no budgets
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        Self::for_operation(MeasuredOperation::new(func))
    }

    /// Constraint on `func`, labelled for diagnostics
    pub fn named<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Bencher) + Send + Sync + 'static,
    {
        Self::for_operation(MeasuredOperation::named(label, func))
    }

    /// Constraint on an existing (possibly shared) operation
    pub fn for_operation(operation: MeasuredOperation) -> Self {
        Self {
            operation,
            verbose: false,
            budgets: Budgets::default(),
        }
    }

    /// Apply one option, overwriting the field it sets
    pub fn apply(&mut self, option: ConstraintOption) {
        let budgets = &mut self.budgets;
        match option {
            ConstraintOption::MaxAllocsPerOp(v) => budgets.max_allocs_per_op = Some(v),
            ConstraintOption::MaxAllocatedBytesPerOp(v) => {
                budgets.max_allocated_bytes_per_op = Some(v)
            }
            ConstraintOption::MaxNsPerOp(v) => budgets.max_ns_per_op = Some(v),
            ConstraintOption::MaxThroughput(v) => budgets.max_throughput = Some(v),
            ConstraintOption::MinThroughput(v) => budgets.min_throughput = Some(v),
            ConstraintOption::Verbose => self.verbose = true,
        }
    }

    /// Apply options in order; later options win for the same field
    pub fn with_options(mut self, options: impl IntoIterator<Item = ConstraintOption>) -> Self {
        for option in options {
            self.apply(option);
        }
        self
    }

    fn with(mut self, option: ConstraintOption) -> Self {
        self.apply(option);
        self
    }

    /// Fail when allocations per operation exceed `max`
    pub fn with_max_allocs(self, max: u64) -> Self {
        self.with(with_max_allocs(max))
    }

    /// Fail when allocated bytes per operation exceed `max`
    pub fn with_max_allocated_bytes(self, max: u64) -> Self {
        self.with(with_max_allocated_bytes(max))
    }

    /// Fail when nanoseconds per operation exceed `max`
    pub fn with_max_ns_per_op(self, max: u64) -> Self {
        self.with(with_max_ns_per_op(max))
    }

    /// Fail when throughput exceeds `max` MB/s
    pub fn with_max_throughput(self, max: f64) -> Self {
        self.with(with_max_throughput(max))
    }

    /// Fail when throughput falls below `min` MB/s
    pub fn with_min_throughput(self, min: f64) -> Self {
        self.with(with_min_throughput(min))
    }

    /// Print progress lines around the measurement
    pub fn with_verbose(self) -> Self {
        self.with(with_verbose())
    }

    /// Apply every budget declared in `budgets`, leaving the rest as they are
    pub fn with_budgets(self, budgets: &Budgets) -> Self {
        self.with_options(budgets.to_options())
    }

    /// The measured operation
    pub fn operation(&self) -> &MeasuredOperation {
        &self.operation
    }

    /// Declared budgets
    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    /// Whether progress lines are printed
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
