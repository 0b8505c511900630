//! Integration tests for BudgetBench
//!
//! These tests measure real operations end to end, with the tracking
//! allocator installed for this test binary.

use budgetbench::prelude::*;
use budgetbench::{
    BudgetConfig, BudgetKind, LoopHarness, MeasuredOperation, current_allocation,
    reset_allocation_counter, tracking_active,
};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

/// Short rounds keep the suite fast; budgets below leave wide margins
fn harness() -> LoopHarness {
    LoopHarness::with_bench_time(Duration::from_millis(20))
}

/// One heap allocation per operation, 512 bytes processed per operation
fn boxed_op(b: &mut Bencher) {
    b.set_bytes(512);
    b.iter(|| Box::new(black_box(7u64)));
}

/// A few hundred nanoseconds of arithmetic, no allocation
fn summing_op(b: &mut Bencher) {
    b.iter(|| {
        let mut sum = 0u64;
        for i in 0..1000u64 {
            sum = sum.wrapping_add(black_box(i));
        }
        sum
    });
}

#[test]
fn test_tracking_allocator_counts_this_thread() {
    reset_allocation_counter();
    let v = black_box(vec![0u8; 100]);
    let (bytes, count) = current_allocation();
    drop(v);

    assert!(tracking_active());
    assert!(count >= 1);
    assert!(bytes >= 100);
}

#[test]
fn test_max_allocations() {
    let err = BenchmarkRunner::new()
        .append_named("boxed", boxed_op, [with_max_allocs(0), with_verbose()])
        .run_with(&harness())
        .expect_err("expected to fail with_max_allocs(0)");

    assert_eq!(err.len(), 1);
    assert_eq!(err.violations()[0].operation, "boxed");
    assert_eq!(err.violations()[0].kind, BudgetKind::MaxAllocsPerOp);
    assert!(err.to_string().contains("max allocations"));

    let ok = BenchmarkRunner::new()
        .append(boxed_op, [with_max_allocs(5), with_verbose()])
        .run_with(&harness());
    assert!(ok.is_ok(), "not expected to fail with_max_allocs(5): {:?}", ok);
}

#[test]
fn test_zero_allocation_operation_passes_zero_budget() {
    let result = BenchmarkRunner::new()
        .append(summing_op, [with_max_allocs(0), with_max_allocated_bytes(0)])
        .run_with(&harness());
    assert!(result.is_ok(), "{:?}", result);
}

#[test]
fn test_max_allocated_bytes() {
    let err = BenchmarkRunner::new()
        .append(boxed_op, [with_max_allocated_bytes(1)])
        .run_with(&harness());
    assert!(err.is_err(), "expected to fail with_max_allocated_bytes(1)");

    let ok = BenchmarkRunner::new()
        .append(boxed_op, [with_max_allocated_bytes(5000)])
        .run_with(&harness());
    assert!(ok.is_ok(), "not expected to fail with_max_allocated_bytes(5000)");
}

#[test]
fn test_max_ns_per_op() {
    let err = BenchmarkRunner::new()
        .append(summing_op, [with_max_ns_per_op(5)])
        .run_with(&harness());
    assert!(err.is_err(), "expected to fail with_max_ns_per_op(5)");

    let ok = BenchmarkRunner::new()
        .append(summing_op, [with_max_ns_per_op(1_000_000)])
        .run_with(&harness());
    assert!(ok.is_ok(), "not expected to fail with_max_ns_per_op(1_000_000)");
}

#[test]
fn test_min_max_throughput() {
    let runs = [
        (with_max_throughput(1.0), false),
        (with_max_throughput(1_000_000.0), true),
        (with_min_throughput(1_000_000.0), false),
        (with_min_throughput(1.0), true),
    ];

    for (option, should_pass) in runs {
        let result = BenchmarkRunner::new()
            .append(boxed_op, [option])
            .run_with(&harness());
        assert_eq!(result.is_ok(), should_pass, "{:?}: {:?}", option, result);
    }
}

#[test]
fn test_same_operation_registered_twice() {
    let op = MeasuredOperation::named("boxed", boxed_op);
    let err = BenchmarkRunner::new()
        .append_operation(op.clone(), [with_min_throughput(1_000_000.0)])
        .append_operation(op, [with_min_throughput(1.0)])
        .run_with(&harness())
        .unwrap_err();

    assert_eq!(err.len(), 1);
    assert_eq!(err.violations()[0].kind, BudgetKind::MinThroughput);
    assert_eq!(err.violations()[0].budget, 1_000_000.0);
}

#[test]
fn test_every_constraint_runs() {
    let calls: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());

    let counted = |slot: usize, allocate: bool| {
        let calls = Arc::clone(&calls);
        move |b: &mut Bencher| {
            calls[slot].fetch_add(1, Ordering::Relaxed);
            if allocate {
                b.iter(|| Box::new(black_box(1u8)));
            } else {
                b.iter(|| black_box(1u8));
            }
        }
    };

    let err = BenchmarkRunner::new()
        .append_named("first", counted(0, true), [with_max_allocs(0)])
        .append_named("second", counted(1, false), [with_max_allocs(0)])
        .append_named("third", counted(2, true), [with_max_allocs(0)])
        .run_with(&harness())
        .unwrap_err();

    let names: Vec<_> = err.violations().iter().map(|v| v.operation.as_str()).collect();
    assert_eq!(names, vec!["first", "third"]);
    for slot in calls.iter() {
        assert!(slot.load(Ordering::Relaxed) > 0);
    }
}

#[test]
fn test_builder_and_options_give_same_verdict() {
    let built = BenchmarkRunner::new().add_constraint(
        Constraint::named("boxed", boxed_op)
            .with_max_allocs(0)
            .with_max_throughput(1_000_000.0),
    );
    let optioned = BenchmarkRunner::new().append_named(
        "boxed",
        boxed_op,
        [with_max_allocs(0), with_max_throughput(1_000_000.0)],
    );

    let a = built.run_with(&harness()).unwrap_err();
    let b = optioned.run_with(&harness()).unwrap_err();
    let kinds = |e: &budgetbench::BudgetViolations| {
        e.violations().iter().map(|v| v.kind).collect::<Vec<_>>()
    };
    assert_eq!(kinds(&a), kinds(&b));
    assert_eq!(kinds(&a), vec![BudgetKind::MaxAllocsPerOp]);
}

#[test]
fn test_budgets_from_config() {
    let config: BudgetConfig = toml::from_str(
        r#"
        [harness]
        bench_time = "20ms"

        [budgets.boxed]
        max_allocs_per_op = 0
        max_ns_per_op = 1000000
    "#,
    )
    .unwrap();

    let err = BenchmarkRunner::new()
        .append_named("boxed", boxed_op, config.options_for("boxed"))
        .append_named("summing", summing_op, config.options_for("summing"))
        .run_with(&config.harness().unwrap())
        .unwrap_err();

    assert_eq!(err.len(), 1);
    assert_eq!(err.violations()[0].operation, "boxed");
}

#[test]
fn test_init_logging_is_idempotent() {
    budgetbench::init_logging(true);
    budgetbench::init_logging(false);
}
