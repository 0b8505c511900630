//! Timing
//!
//! Wall-clock stopwatch for the bencher. Measured time accumulates across
//! start/stop pairs so untimed setup can be carved out of a round.

use std::time::{Duration, Instant};

/// Stopwatch accumulating elapsed time while running
#[derive(Debug, Clone, Default)]
pub struct Timer {
    started: Option<Instant>,
    accumulated: Duration,
}

impl Timer {
    /// Create a stopped timer with nothing accumulated
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or keep) running
    #[inline(always)]
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stop running, folding the current span into the total
    #[inline(always)]
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.accumulated += started.elapsed();
        }
    }

    /// Discard accumulated time. A running timer keeps running from now.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    /// Whether the timer is currently running
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Total measured time, including the span in progress
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.accumulated + started.elapsed(),
            None => self.accumulated,
        }
    }
}
