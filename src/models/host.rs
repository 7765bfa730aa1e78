//! Host and VM models.
//!
//! A host is a physical machine with fixed CPU and memory capacity.
//! Hosts are immutable for the duration of a scheduling run: the load
//! committed while scoring an allocation lives in a [`UsageLedger`] that
//! belongs to a single evaluation and is zeroed before it is dropped.
//!
//! VM descriptors describe nominal sub-partitions of a host. They are not
//! scheduled; only the first VM of a host is ever consulted, and only by
//! the VM-capacity feasibility variant.

use serde::{Deserialize, Serialize};

use super::Task;

/// A physical host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Host identifier (reported to the user).
    pub id: u32,
    /// CPU capacity (MIPS).
    pub total_cpu: u32,
    /// Memory capacity (MB).
    pub total_ram: u32,
    /// VM capacity profiles attached to this host.
    #[serde(default)]
    pub vms: Vec<VmDescriptor>,
}

/// A capacity profile nominally hosted on a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDescriptor {
    /// VM identifier.
    pub id: u32,
    /// CPU capacity (MIPS).
    pub cpu_capacity: u32,
    /// Memory capacity (MB).
    pub ram_capacity: u32,
}

/// Live load counters for one host during one evaluation.
///
/// Invariant: `used_cpu <= total_cpu` and `used_ram <= total_ram` of the
/// owning host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUsage {
    /// Committed CPU (MIPS).
    pub used_cpu: u32,
    /// Committed memory (MB).
    pub used_ram: u32,
}

impl Host {
    /// Creates a host without VMs.
    pub fn new(id: u32, total_cpu: u32, total_ram: u32) -> Self {
        Self {
            id,
            total_cpu,
            total_ram,
            vms: Vec::new(),
        }
    }

    /// Attaches a VM descriptor.
    pub fn with_vm(mut self, vm: VmDescriptor) -> Self {
        self.vms.push(vm);
        self
    }

    /// The first attached VM, if any.
    pub fn first_vm(&self) -> Option<&VmDescriptor> {
        self.vms.first()
    }

    /// Whether `task` fits into the remaining headroom given `usage`.
    pub fn has_headroom(&self, usage: &HostUsage, task: &Task) -> bool {
        u64::from(usage.used_cpu) + u64::from(task.cpu_required) <= u64::from(self.total_cpu)
            && u64::from(usage.used_ram) + u64::from(task.ram_required)
                <= u64::from(self.total_ram)
    }

    /// Whether `task` fits into the raw capacity of the first VM.
    ///
    /// Live usage is ignored. A host with no VMs is checked against its own
    /// raw capacity.
    pub fn first_vm_fits(&self, task: &Task) -> bool {
        match self.first_vm() {
            Some(vm) => vm.fits(task),
            None => task.fits_within(self.total_cpu, self.total_ram),
        }
    }

    /// CPU and memory utilization ratios (0.0..=1.0) for `usage`.
    ///
    /// A zero capacity dimension reports 0.0.
    pub fn utilization(&self, usage: &HostUsage) -> (f64, f64) {
        (
            ratio(usage.used_cpu, self.total_cpu),
            ratio(usage.used_ram, self.total_ram),
        )
    }
}

impl VmDescriptor {
    /// Creates a VM descriptor.
    pub fn new(id: u32, cpu_capacity: u32, ram_capacity: u32) -> Self {
        Self {
            id,
            cpu_capacity,
            ram_capacity,
        }
    }

    /// Whether `task` fits into this VM's raw capacity.
    #[inline]
    pub fn fits(&self, task: &Task) -> bool {
        task.fits_within(self.cpu_capacity, self.ram_capacity)
    }
}

impl HostUsage {
    /// Whether nothing is committed.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.used_cpu == 0 && self.used_ram == 0
    }
}

/// Per-evaluation usage counters, one [`HostUsage`] per host index.
///
/// Each fitness evaluation owns its ledger, so concurrent evaluations
/// never share load state.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    usage: Vec<HostUsage>,
}

impl UsageLedger {
    /// Creates a zeroed ledger for `num_hosts` hosts.
    pub fn new(num_hosts: usize) -> Self {
        Self {
            usage: vec![HostUsage::default(); num_hosts],
        }
    }

    /// Usage of the host at `host_index`.
    pub fn get(&self, host_index: usize) -> &HostUsage {
        &self.usage[host_index]
    }

    /// Commits `task`'s demand to the host at `host_index`.
    ///
    /// Counters saturate at the host's capacity.
    pub fn commit(&mut self, host_index: usize, host: &Host, task: &Task) {
        let usage = &mut self.usage[host_index];
        usage.used_cpu = usage
            .used_cpu
            .saturating_add(task.cpu_required)
            .min(host.total_cpu);
        usage.used_ram = usage
            .used_ram
            .saturating_add(task.ram_required)
            .min(host.total_ram);
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        self.usage.fill(HostUsage::default());
    }

    /// Whether every counter is zero.
    pub fn is_zeroed(&self) -> bool {
        self.usage.iter().all(HostUsage::is_idle)
    }

    /// Snapshot of all counters.
    pub fn snapshot(&self) -> Vec<HostUsage> {
        self.usage.clone()
    }
}

/// Total CPU capacity across hosts (MIPS).
pub fn fleet_cpu_capacity(hosts: &[Host]) -> u64 {
    hosts.iter().map(|h| u64::from(h.total_cpu)).sum()
}

/// Total memory capacity across hosts (MB).
pub fn fleet_ram_capacity(hosts: &[Host]) -> u64 {
    hosts.iter().map(|h| u64::from(h.total_ram)).sum()
}

fn ratio(used: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(used) / f64::from(total)
    }
}
