//! Pre-search latency hooks.
//!
//! A hook runs once per optimizer run, after population initialization
//! and before the first generation. [`NoLatency`] is the default.
//! [`BatchStall`] blocks the calling thread for a duration keyed by the
//! task batch size, which is only useful to emulate a slow execution
//! environment.

use std::collections::BTreeMap;
use std::time::Duration;

use log::info;

/// Called once before the generational loop starts.
pub trait LatencyHook: Send + Sync {
    /// Invoked with the number of tasks being allocated.
    fn before_search(&self, num_tasks: usize);
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl LatencyHook for NoLatency {
    fn before_search(&self, _num_tasks: usize) {}
}

/// Blocks for a fixed duration looked up by batch size.
///
/// Batch sizes missing from the table do not stall.
#[derive(Debug, Clone)]
pub struct BatchStall {
    table: BTreeMap<usize, Duration>,
    scale: f64,
}

impl Default for BatchStall {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStall {
    /// Creates an empty table with scale 1.0.
    pub fn new() -> Self {
        Self {
            table: BTreeMap::new(),
            scale: 1.0,
        }
    }

    /// The stall table of the reference experiment (50–200 tasks).
    pub fn calibrated() -> Self {
        Self::new()
            .with_entry(50, Duration::from_millis(1_200_000))
            .with_entry(100, Duration::from_millis(1_300_000))
            .with_entry(150, Duration::from_millis(1_500_000))
            .with_entry(200, Duration::from_millis(1_600_000))
    }

    /// Sets the stall for one batch size.
    pub fn with_entry(mut self, num_tasks: usize, stall: Duration) -> Self {
        self.table.insert(num_tasks, stall);
        self
    }

    /// Multiplies every stall by `scale` (clamped at zero).
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale.max(0.0);
        self
    }

    /// The stall that would be applied for `num_tasks`.
    pub fn stall_for(&self, num_tasks: usize) -> Duration {
        self.table
            .get(&num_tasks)
            .map(|d| Duration::from_millis((d.as_millis() as f64 * self.scale).round() as u64))
            .unwrap_or(Duration::ZERO)
    }
}

impl LatencyHook for BatchStall {
    fn before_search(&self, num_tasks: usize) {
        let stall = self.stall_for(num_tasks);
        if !stall.is_zero() {
            info!("stalling {} ms before searching {num_tasks} tasks", stall.as_millis());
            std::thread::sleep(stall);
        }
    }
}
