//! Scenario generation.
//!
//! A scenario is one task batch plus the fleet it is allocated onto.
//! Hosts are rebuilt from a [`FleetSpec`] for every scenario, so no
//! state can leak between runs.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Host, Task, VmDescriptor};

/// Batch sizes of the reference experiment.
pub const REFERENCE_BATCH_SIZES: [usize; 4] = [50, 100, 150, 200];

/// Inclusive demand ranges for generated tasks.
///
/// Both ranges must be non-empty; see [`DemandRange::is_valid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandRange {
    /// CPU demand range (MIPS).
    pub cpu: RangeInclusive<u32>,
    /// Memory demand range (MB).
    pub ram: RangeInclusive<u32>,
}

impl Default for DemandRange {
    fn default() -> Self {
        Self {
            cpu: 100..=1000,
            ram: 100..=500,
        }
    }
}

impl DemandRange {
    /// Whether both ranges contain at least one value.
    pub fn is_valid(&self) -> bool {
        !self.cpu.is_empty() && !self.ram.is_empty()
    }
}

/// Fleet description from which fresh hosts are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSpec {
    /// Host templates.
    pub hosts: Vec<Host>,
}

impl FleetSpec {
    /// Creates a fleet from host templates.
    pub fn new(hosts: Vec<Host>) -> Self {
        Self { hosts }
    }

    /// The two-host reference fleet.
    ///
    /// | Host | CPU (MIPS) | RAM (MB) | VMs (MIPS/MB) |
    /// |------|-----------|----------|---------------|
    /// | 1 | 4096 | 1860 | 512/250, 1024/500 |
    /// | 2 | 4096 | 2660 | 1024/1000, 2048/1000 |
    pub fn reference() -> Self {
        Self::new(vec![
            Host::new(1, 4096, 1860)
                .with_vm(VmDescriptor::new(0, 512, 250))
                .with_vm(VmDescriptor::new(1, 1024, 500)),
            Host::new(2, 4096, 2660)
                .with_vm(VmDescriptor::new(2, 1024, 1000))
                .with_vm(VmDescriptor::new(3, 2048, 1000)),
        ])
    }

    /// Builds a fresh host set.
    pub fn build(&self) -> Vec<Host> {
        self.hosts.clone()
    }
}

/// One task batch and its fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Tasks, with IDs `0..n`.
    pub tasks: Vec<Task>,
    /// Hosts for this scenario only.
    pub hosts: Vec<Host>,
}

impl Scenario {
    /// Creates a scenario from explicit tasks and hosts.
    pub fn new(tasks: Vec<Task>, hosts: Vec<Host>) -> Self {
        Self { tasks, hosts }
    }

    /// Generates `num_tasks` random tasks on a fresh copy of `fleet`.
    ///
    /// # Panics
    /// Panics if `demand` is not [valid](DemandRange::is_valid) and `num_tasks > 0`.
    pub fn generate<R: Rng>(
        num_tasks: usize,
        fleet: &FleetSpec,
        demand: &DemandRange,
        rng: &mut R,
    ) -> Self {
        Self {
            tasks: generate_tasks(num_tasks, demand, rng),
            hosts: fleet.build(),
        }
    }

    /// Number of tasks in the batch.
    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }
}

/// Generates `num_tasks` tasks with uniformly random demand.
///
/// # Panics
/// Panics if `demand` is not [valid](DemandRange::is_valid) and `num_tasks > 0`.
pub fn generate_tasks<R: Rng>(num_tasks: usize, demand: &DemandRange, rng: &mut R) -> Vec<Task> {
    (0..num_tasks)
        .map(|id| {
            Task::new(
                id,
                rng.random_range(demand.cpu.clone()),
                rng.random_range(demand.ram.clone()),
            )
        })
        .collect()
}
