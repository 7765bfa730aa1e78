//! Task model.
//!
//! A task is a unit of work with a fixed resource demand. Tasks are created
//! once per scenario batch and never mutated afterwards.
//!
//! # Identity
//! Task IDs are dense within a batch (`0..n`) because an [`Allocation`]
//! is indexed directly by task ID.
//!
//! [`Allocation`]: super::Allocation

use serde::{Deserialize, Serialize};

/// A computational task with fixed CPU and memory requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier (index into the allocation vector).
    pub id: usize,
    /// CPU demand (MIPS).
    pub cpu_required: u32,
    /// Memory demand (MB).
    pub ram_required: u32,
}

impl Task {
    /// Creates a task with the given demand.
    pub fn new(id: usize, cpu_required: u32, ram_required: u32) -> Self {
        Self {
            id,
            cpu_required,
            ram_required,
        }
    }

    /// Whether this task fits into the given raw capacity.
    #[inline]
    pub fn fits_within(&self, cpu: u32, ram: u32) -> bool {
        self.cpu_required <= cpu && self.ram_required <= ram
    }
}
