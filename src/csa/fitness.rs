//! Allocation fitness evaluation.
//!
//! Scores one allocation by replaying every task onto its assigned host
//! in task order. Feasible tasks commit their demand into a per-call
//! [`UsageLedger`]; infeasible tasks count as SLA violations and
//! contribute nothing else.
//!
//! Higher fitness is better.
//!
//! # Policies
//!
//! | Policy | Fitness |
//! |--------|---------|
//! | `UtilizationWeighted` | `0.6·cpu + 0.2·ram − 0.1·power − 0.1·slav` |
//! | `PenaltyReward` | `−1000·violations + (cpu_used + ram_used) / 1000` |
//!
//! Utilization ratios are committed totals over fleet-wide capacity.

use serde::{Deserialize, Serialize};

use crate::models::{
    fleet_cpu_capacity, fleet_ram_capacity, Allocation, Host, HostUsage, Task, UsageLedger,
};

/// Scoring policy applied to the totals of one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessPolicy {
    /// Weighted blend of utilization, power and SLA violation ratio.
    #[default]
    UtilizationWeighted,
    /// Large penalty per violation, small reward per committed unit.
    PenaltyReward,
}

/// How a task is tested against its assigned host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityCheck {
    /// Demand must fit the host's remaining headroom in this pass.
    #[default]
    Headroom,
    /// Demand must fit the raw capacity of the host's first VM.
    ///
    /// Hosts without VMs are checked against their own raw capacity.
    FirstVmCapacity,
}

/// Per-host power estimate from current utilization.
///
/// `power = cpu_utilization · cpu_weight + ram_utilization · ram_weight`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerModel {
    /// Weight of the CPU utilization ratio.
    pub cpu_weight: f64,
    /// Weight of the memory utilization ratio.
    pub ram_weight: f64,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self {
            cpu_weight: 100.0,
            ram_weight: 50.0,
        }
    }
}

impl PowerModel {
    /// Power estimate for `host` under `usage`.
    pub fn power(&self, host: &Host, usage: &HostUsage) -> f64 {
        let (cpu, ram) = host.utilization(usage);
        cpu * self.cpu_weight + ram * self.ram_weight
    }
}

/// Detailed outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Scalar fitness under the configured policy.
    pub fitness: f64,
    /// CPU committed across all hosts (MIPS).
    pub total_cpu_used: u64,
    /// Memory committed across all hosts (MB).
    pub total_ram_used: u64,
    /// Sum of per-task power estimates.
    pub total_power: f64,
    /// Number of infeasible tasks.
    pub sla_violations: usize,
    /// Number of tasks evaluated.
    pub num_tasks: usize,
    /// Load committed per host index at the end of the pass.
    pub host_usage: Vec<HostUsage>,
}

impl Evaluation {
    /// Fraction of tasks that violated their SLA (0.0 for an empty batch).
    pub fn sla_violation_ratio(&self) -> f64 {
        if self.num_tasks == 0 {
            0.0
        } else {
            self.sla_violations as f64 / self.num_tasks as f64
        }
    }
}

struct PassTotals {
    cpu_used: u64,
    ram_used: u64,
    power: f64,
    violations: usize,
    num_tasks: usize,
}

impl FitnessPolicy {
    fn score(self, totals: &PassTotals, fleet_cpu: u64, fleet_ram: u64) -> f64 {
        match self {
            FitnessPolicy::UtilizationWeighted => {
                let cpu = ratio(totals.cpu_used, fleet_cpu);
                let ram = ratio(totals.ram_used, fleet_ram);
                let slav = ratio(totals.violations as u64, totals.num_tasks as u64);
                0.6 * cpu + 0.2 * ram - 0.1 * totals.power - 0.1 * slav
            }
            FitnessPolicy::PenaltyReward => {
                -1000.0 * totals.violations as f64
                    + (totals.cpu_used + totals.ram_used) as f64 / 1000.0
            }
        }
    }
}

/// Scores allocations of one task batch against one fleet.
///
/// The evaluator only borrows tasks and hosts; every call allocates its
/// own usage ledger, so evaluations are independent and may run in
/// parallel.
///
/// # Example
///
/// ```
/// use u_hostalloc::csa::{FitnessEvaluator, FitnessPolicy};
/// use u_hostalloc::models::{Allocation, Host, Task};
///
/// let tasks = vec![Task::new(0, 500, 200), Task::new(1, 5000, 200)];
/// let hosts = vec![Host::new(1, 4096, 1860)];
/// let evaluator = FitnessEvaluator::new(&tasks, &hosts)
///     .with_policy(FitnessPolicy::PenaltyReward);
///
/// let eval = evaluator.evaluate_detailed(&Allocation::new(2));
/// assert_eq!(eval.sla_violations, 1);
/// assert!((eval.fitness - (-1000.0 + 0.7)).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    tasks: &'a [Task],
    hosts: &'a [Host],
    policy: FitnessPolicy,
    feasibility: FeasibilityCheck,
    power_model: PowerModel,
    fleet_cpu: u64,
    fleet_ram: u64,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an evaluator with the default policy and checks.
    pub fn new(tasks: &'a [Task], hosts: &'a [Host]) -> Self {
        Self {
            tasks,
            hosts,
            policy: FitnessPolicy::default(),
            feasibility: FeasibilityCheck::default(),
            power_model: PowerModel::default(),
            fleet_cpu: fleet_cpu_capacity(hosts),
            fleet_ram: fleet_ram_capacity(hosts),
        }
    }

    /// Sets the scoring policy.
    pub fn with_policy(mut self, policy: FitnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the feasibility check.
    pub fn with_feasibility(mut self, feasibility: FeasibilityCheck) -> Self {
        self.feasibility = feasibility;
        self
    }

    /// Sets the power model.
    pub fn with_power_model(mut self, power_model: PowerModel) -> Self {
        self.power_model = power_model;
        self
    }

    /// Tasks being scored.
    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    /// Hosts being scored against.
    pub fn hosts(&self) -> &'a [Host] {
        self.hosts
    }

    /// Active scoring policy.
    pub fn policy(&self) -> FitnessPolicy {
        self.policy
    }

    /// Scalar fitness of `allocation`.
    ///
    /// The allocation must have been built for this fleet: host indices
    /// outside `[0, hosts.len())` panic.
    pub fn evaluate(&self, allocation: &Allocation) -> f64 {
        self.evaluate_detailed(allocation).fitness
    }

    /// Full evaluation record of `allocation`.
    pub fn evaluate_detailed(&self, allocation: &Allocation) -> Evaluation {
        let mut ledger = UsageLedger::new(self.hosts.len());
        let mut totals = PassTotals {
            cpu_used: 0,
            ram_used: 0,
            power: 0.0,
            violations: 0,
            num_tasks: self.tasks.len(),
        };

        for task in self.tasks {
            let host_index = allocation.host_for(task.id);
            let host = &self.hosts[host_index];

            if self.is_feasible(host, ledger.get(host_index), task) {
                ledger.commit(host_index, host, task);
                totals.cpu_used += u64::from(task.cpu_required);
                totals.ram_used += u64::from(task.ram_required);
                totals.power += self.power_model.power(host, ledger.get(host_index));
            } else {
                totals.violations += 1;
            }
        }

        let host_usage = ledger.snapshot();
        ledger.reset();
        debug_assert!(ledger.is_zeroed());

        Evaluation {
            fitness: self.policy.score(&totals, self.fleet_cpu, self.fleet_ram),
            total_cpu_used: totals.cpu_used,
            total_ram_used: totals.ram_used,
            total_power: totals.power,
            sla_violations: totals.violations,
            num_tasks: totals.num_tasks,
            host_usage,
        }
    }

    fn is_feasible(&self, host: &Host, usage: &HostUsage, task: &Task) -> bool {
        match self.feasibility {
            FeasibilityCheck::Headroom => host.has_headroom(usage, task),
            FeasibilityCheck::FirstVmCapacity => host.first_vm_fits(task),
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
