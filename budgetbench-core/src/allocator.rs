//! Allocation Tracking
//!
//! `TrackingAllocator` wraps the system allocator and counts every allocation
//! made on the current thread. Install it in the benchmark binary:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: budgetbench::TrackingAllocator = budgetbench::TrackingAllocator;
//! ```
//!
//! Counters are thread-local so allocations on other threads never leak into
//! a measurement taken on this one.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static ALLOC_BYTES: Cell<u64> = const { Cell::new(0) };
    static ALLOC_COUNT: Cell<u64> = const { Cell::new(0) };
    static BASELINE: Cell<(u64, u64)> = const { Cell::new((0, 0)) };
}

/// Set once the tracking allocator has served its first allocation.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Global allocator that counts allocations per thread
pub struct TrackingAllocator;

#[inline(always)]
fn record(size: usize) {
    if !ACTIVE.load(Ordering::Relaxed) {
        ACTIVE.store(true, Ordering::Relaxed);
    }
    // try_with: TLS may already be torn down during thread exit
    let _ = ALLOC_BYTES.try_with(|b| b.set(b.get().wrapping_add(size as u64)));
    let _ = ALLOC_COUNT.try_with(|c| c.set(c.get().wrapping_add(1)));
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // A growth or shrink counts as a fresh allocation of the new size
        record(new_size);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

/// Cumulative `(bytes, count)` allocated on this thread since it started
pub fn allocation_totals() -> (u64, u64) {
    let bytes = ALLOC_BYTES.try_with(Cell::get).unwrap_or(0);
    let count = ALLOC_COUNT.try_with(Cell::get).unwrap_or(0);
    (bytes, count)
}

/// Start a fresh window for [`current_allocation`] on this thread
pub fn reset_allocation_counter() {
    let totals = allocation_totals();
    let _ = BASELINE.try_with(|b| b.set(totals));
}

/// `(bytes, count)` allocated on this thread since the last
/// [`reset_allocation_counter`]
pub fn current_allocation() -> (u64, u64) {
    let (bytes, count) = allocation_totals();
    let (base_bytes, base_count) = BASELINE.try_with(Cell::get).unwrap_or((0, 0));
    (
        bytes.wrapping_sub(base_bytes),
        count.wrapping_sub(base_count),
    )
}

/// Whether `TrackingAllocator` is serving allocations in this process.
///
/// When it is not installed as the global allocator every counter stays at
/// zero and allocation budgets cannot fail.
pub fn tracking_active() -> bool {
    ACTIVE.load(Ordering::Relaxed)
}
