//! Render progress logging.
//!
//! A pure observer: workers tick a shared counter and the reporter logs the
//! remaining work and an ETA. Nothing here touches pixel values.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts finished work units and logs progress about every tenth of the job.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    done: AtomicUsize,
    unit: &'static str,
    start: Instant,
}

impl ProgressReporter {
    /// Start tracking `total` units, named `unit` in log lines.
    pub fn new(total: usize, unit: &'static str) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            unit,
            start: Instant::now(),
        }
    }

    /// Mark one unit finished. Safe to call from any thread.
    pub fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        log::trace!("{} {} remaining", self.total.saturating_sub(done), self.unit);

        let step = (self.total / 10).max(1);
        if done % step == 0 && done < self.total {
            let elapsed = self.start.elapsed();
            log::info!(
                "{} of {} {} remaining, {:.1}s elapsed, ETA {:.1}s",
                self.total - done,
                self.total,
                self.unit,
                elapsed.as_secs_f32(),
                self.eta(done, elapsed).as_secs_f32()
            );
        }
    }

    /// Units finished so far.
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.done())
    }

    /// Log the total time taken.
    pub fn finish(&self) {
        log::info!(
            "Finished {} {} in {:.2}s",
            self.done(),
            self.unit,
            self.start.elapsed().as_secs_f32()
        );
    }

    /// Linear extrapolation from the average time per unit.
    fn eta(&self, done: usize, elapsed: Duration) -> Duration {
        if done == 0 {
            return Duration::ZERO;
        }
        let remaining = self.total.saturating_sub(done) as f64;
        Duration::from_secs_f64(elapsed.as_secs_f64() * remaining / done as f64)
    }
}
