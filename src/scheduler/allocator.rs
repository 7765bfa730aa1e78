//! Task batch scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the scenario (errors abort, warnings are logged).
//! 2. Build an optimizer with the configured budget and latency hook.
//! 3. Run it once, timing the run with a monotonic clock.
//! 4. Report every task's host, the execution time and summary metrics.
//!
//! There is no retry and no reconfiguration: whatever the single run
//! produces is reported.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::report::{ReportSink, ReportedMetrics, ReportingMode};
use crate::csa::{ConfigError, CsaConfig, CsaOptimizer, CsaResult, LatencyHook, NoLatency};
use crate::scenario::Scenario;
use crate::validation::{validate_input, validate_warnings, ValidationError};

/// Errors raised by [`TaskScheduler::schedule`].
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The scenario failed validation.
    #[error("invalid scenario: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    /// A report line could not be written.
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Optimizer and reporting configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Search configuration.
    pub csa: CsaConfig,
    /// How summary metrics are produced.
    pub reporting: ReportingMode,
}

impl SchedulerConfig {
    /// Sets the search configuration.
    pub fn with_csa(mut self, csa: CsaConfig) -> Self {
        self.csa = csa;
        self
    }

    /// Sets the reporting mode.
    pub fn with_reporting(mut self, reporting: ReportingMode) -> Self {
        self.reporting = reporting;
        self
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// One reported task placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// Task ID.
    pub task_id: usize,
    /// Index of the host in the scenario's host list.
    pub host_index: usize,
    /// ID of the host.
    pub host_id: u32,
}

/// Result of one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Placement of every task, in task order (empty if no solution).
    pub assignments: Vec<TaskAssignment>,
    /// Fitness of the reported allocation.
    pub best_fitness: Option<f64>,
    /// Summary metrics (`None` if no solution).
    pub metrics: Option<ReportedMetrics>,
    /// Wall-clock time of the run, including the latency hook (ms).
    pub elapsed_ms: u128,
    /// Search summary.
    pub result: CsaResult,
}

impl ScheduleOutcome {
    /// Whether the run produced an allocation.
    pub fn has_solution(&self) -> bool {
        self.best_fitness.is_some()
    }
}

/// Allocates task batches onto hosts and reports the result.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_hostalloc::csa::CsaConfig;
/// use u_hostalloc::scenario::{DemandRange, FleetSpec, Scenario};
/// use u_hostalloc::scheduler::{SchedulerConfig, TaskScheduler};
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let scenario = Scenario::generate(20, &FleetSpec::reference(), &DemandRange::default(), &mut rng);
/// let config = SchedulerConfig::default()
///     .with_csa(CsaConfig::default().with_iterations(5).with_population_size(10).with_seed(42));
///
/// let mut lines: Vec<String> = Vec::new();
/// let outcome = TaskScheduler::new(config).schedule(&scenario, &mut lines).unwrap();
///
/// assert_eq!(outcome.assignments.len(), 20);
/// assert_eq!(lines[0], format!("Task 0 allocated to Host {}", outcome.assignments[0].host_index));
/// ```
#[derive(Clone)]
pub struct TaskScheduler {
    config: SchedulerConfig,
    latency: Arc<dyn LatencyHook>,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl TaskScheduler {
    /// Creates a scheduler with no pre-search latency.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            latency: Arc::new(NoLatency),
        }
    }

    /// Sets the hook invoked before each search.
    pub fn with_latency_hook(mut self, hook: Arc<dyn LatencyHook>) -> Self {
        self.latency = hook;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Allocates the scenario's tasks and writes the report to `sink`.
    pub fn schedule<S: ReportSink + ?Sized>(
        &self,
        scenario: &Scenario,
        sink: &mut S,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        validate_input(&scenario.tasks, &scenario.hosts).map_err(ScheduleError::InvalidInput)?;
        for warning in validate_warnings(&scenario.tasks, &scenario.hosts) {
            warn!("{}", warning.message);
        }

        let mut rng = match self.config.csa.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        info!(
            "scheduling {} tasks on {} hosts",
            scenario.num_tasks(),
            scenario.hosts.len()
        );
        let mut optimizer =
            CsaOptimizer::new(&scenario.tasks, &scenario.hosts, self.config.csa.clone())
                .with_latency_hook(Arc::clone(&self.latency));

        let start = Instant::now();
        let result = optimizer.run(&mut rng);
        let best = optimizer.best_solution();
        let elapsed_ms = start.elapsed().as_millis();

        let Some(best) = best else {
            warn!("no allocation found for {} tasks", scenario.num_tasks());
            sink.no_solution()?;
            sink.execution_time(elapsed_ms)?;
            return Ok(ScheduleOutcome {
                assignments: Vec::new(),
                best_fitness: None,
                metrics: None,
                elapsed_ms,
                result,
            });
        };

        let assignments: Vec<TaskAssignment> = best
            .allocation
            .iter()
            .filter_map(|(task_id, host_index)| {
                scenario.hosts.get(host_index).map(|host| TaskAssignment {
                    task_id,
                    host_index,
                    host_id: host.id,
                })
            })
            .collect();
        for a in &assignments {
            sink.task_assigned(a.task_id, a.host_index)?;
        }
        sink.execution_time(elapsed_ms)?;

        let evaluation = optimizer.evaluator().evaluate_detailed(&best.allocation);
        let metrics = self.config.reporting.metrics(&evaluation, &mut rng);
        sink.metrics(&metrics)?;

        info!(
            "scheduled {} tasks in {} ms: fitness {:.4}, power {:.2} W, SLAV {:.4}",
            assignments.len(),
            elapsed_ms,
            best.fitness,
            metrics.power_watts,
            metrics.sla_violation_ratio
        );

        Ok(ScheduleOutcome {
            assignments,
            best_fitness: Some(best.fitness),
            metrics: Some(metrics),
            elapsed_ms,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csa::{FeasibilityCheck, FitnessEvaluator, Population};
    use crate::models::{Allocation, Host, Task};
    use crate::scenario::{DemandRange, FleetSpec};
    use crate::scheduler::report::{CalibrationTable, MetricSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick_config(seed: u64) -> SchedulerConfig {
        SchedulerConfig::default().with_csa(
            CsaConfig::default()
                .with_iterations(10)
                .with_population_size(20)
                .with_seed(seed),
        )
    }

    fn reference_scenario(n: usize) -> Scenario {
        let mut rng = SmallRng::seed_from_u64(42);
        Scenario::generate(n, &FleetSpec::reference(), &DemandRange::default(), &mut rng)
    }

    #[derive(Default)]
    struct CountingHook(AtomicUsize);

    impl LatencyHook for CountingHook {
        fn before_search(&self, _num_tasks: usize) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_reference_fleet_end_to_end() {
        let scenario = reference_scenario(50);
        let mut lines: Vec<String> = Vec::new();
        let outcome = TaskScheduler::new(quick_config(7))
            .schedule(&scenario, &mut lines)
            .unwrap();

        assert_eq!(outcome.assignments.len(), 50);
        assert_eq!(outcome.result.generations_run, 10);
        for (i, a) in outcome.assignments.iter().enumerate() {
            assert_eq!(a.task_id, i);
            assert!(a.host_index < 2);
            assert_eq!(a.host_id, scenario.hosts[a.host_index].id);
        }
        // 50 task lines, execution time, power, SLAV
        assert_eq!(lines.len(), 53);
        assert!(lines[50].starts_with("Execution time: "));
        assert!(lines[51].starts_with("Power Consumption: "));
        assert!(lines[52].starts_with("SLAV: "));

        // Hosts are only borrowed by the search.
        assert_eq!(scenario.hosts, FleetSpec::reference().build());

        let allocation =
            Allocation::from_hosts(outcome.assignments.iter().map(|a| a.host_index).collect());
        let evaluation =
            FitnessEvaluator::new(&scenario.tasks, &scenario.hosts).evaluate_detailed(&allocation);
        let metrics = outcome.metrics.unwrap();
        assert_eq!(metrics.power_source, MetricSource::Derived);
        assert!((metrics.power_watts - evaluation.total_power).abs() < 1e-10);
    }

    #[test]
    fn test_every_pass_respects_host_capacity() {
        let scenario = reference_scenario(50);
        let evaluator = FitnessEvaluator::new(&scenario.tasks, &scenario.hosts);
        let mut rng = SmallRng::seed_from_u64(7);
        let population = Population::initialize(50, 50, scenario.hosts.len(), &mut rng);
        assert_eq!(population.len(), 50);

        for candidate in &population {
            let evaluation = evaluator.evaluate_detailed(candidate);

            // Unclamped per-host sums of the tasks the pass actually admitted.
            let mut admitted_cpu = vec![0u64; scenario.hosts.len()];
            let mut admitted_ram = vec![0u64; scenario.hosts.len()];
            let mut violations = 0;
            for task in &scenario.tasks {
                let h = candidate.host_for(task.id);
                let host = &scenario.hosts[h];
                let cpu = admitted_cpu[h] + u64::from(task.cpu_required);
                let ram = admitted_ram[h] + u64::from(task.ram_required);
                if cpu <= u64::from(host.total_cpu) && ram <= u64::from(host.total_ram) {
                    admitted_cpu[h] = cpu;
                    admitted_ram[h] = ram;
                } else {
                    violations += 1;
                }
            }

            assert_eq!(evaluation.sla_violations, violations);
            assert_eq!(evaluation.total_cpu_used, admitted_cpu.iter().sum::<u64>());
            assert_eq!(evaluation.total_ram_used, admitted_ram.iter().sum::<u64>());
            let ledger_cpu: u64 = evaluation
                .host_usage
                .iter()
                .map(|u| u64::from(u.used_cpu))
                .sum();
            assert_eq!(ledger_cpu, evaluation.total_cpu_used);
            for (h, host) in scenario.hosts.iter().enumerate() {
                assert!(admitted_cpu[h] <= u64::from(host.total_cpu));
                assert_eq!(u64::from(evaluation.host_usage[h].used_cpu), admitted_cpu[h]);
            }
            assert_eq!(scenario.hosts, FleetSpec::reference().build());
        }
    }

    #[test]
    fn test_zero_capacity_host_still_schedules() {
        let hosts = vec![Host::new(1, 4096, 0)];
        let tasks = vec![
            Task::new(0, 100, 100),
            Task::new(1, 200, 150),
            Task::new(2, 300, 200),
        ];
        let scenario = Scenario::new(tasks, hosts);
        let mut lines: Vec<String> = Vec::new();
        let outcome = TaskScheduler::new(quick_config(4))
            .schedule(&scenario, &mut lines)
            .unwrap();

        assert_eq!(outcome.assignments.len(), 3);
        let metrics = outcome.metrics.unwrap();
        assert!((metrics.sla_violation_ratio - 1.0).abs() < 1e-10);
        assert!((metrics.power_watts - 0.0).abs() < 1e-10);
        assert_eq!(lines[0], "Task 0 allocated to Host 0");
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let scenario = reference_scenario(30);
        let scheduler = TaskScheduler::new(quick_config(3));
        let a = scheduler.schedule(&scenario, &mut Vec::<String>::new()).unwrap();
        let b = scheduler.schedule(&scenario, &mut Vec::<String>::new()).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    fn test_calibrated_reporting() {
        let scenario = reference_scenario(150);
        let config = quick_config(9).with_reporting(ReportingMode::Calibrated(
            CalibrationTable::default(),
        ));
        let mut lines: Vec<String> = Vec::new();
        let outcome = TaskScheduler::new(config)
            .schedule(&scenario, &mut lines)
            .unwrap();

        let metrics = outcome.metrics.unwrap();
        assert_eq!(metrics.power_source, MetricSource::Calibrated);
        assert!((metrics.sla_violation_ratio - 0.40).abs() < 1e-10);
        assert!(metrics.power_watts >= 580.0 - 14.5 && metrics.power_watts <= 580.0 + 14.5);
        assert!(lines.iter().any(|l| l.ends_with("[calibrated]")));
    }

    #[test]
    fn test_empty_population_reports_no_solution() {
        let scenario = reference_scenario(10);
        let config = SchedulerConfig::default()
            .with_csa(CsaConfig::default().with_population_size(0).with_seed(1));
        let mut lines: Vec<String> = Vec::new();
        let outcome = TaskScheduler::new(config)
            .schedule(&scenario, &mut lines)
            .unwrap();

        assert!(!outcome.has_solution());
        assert!(outcome.assignments.is_empty());
        assert!(outcome.metrics.is_none());
        assert!(outcome.result.aborted);
        assert_eq!(lines[0], "No allocation found");
        assert!(lines[1].starts_with("Execution time: "));
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let scenario = Scenario::new(vec![Task::new(0, 100, 100)], Vec::new());
        let err = TaskScheduler::default()
            .schedule(&scenario, &mut Vec::<String>::new())
            .unwrap_err();
        match err {
            ScheduleError::InvalidInput(errors) => assert!(!errors.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_task_is_violation_not_error() {
        let tasks = vec![Task::new(0, 100, 100), Task::new(1, 10_000, 100)];
        let scenario = Scenario::new(tasks, FleetSpec::reference().build());
        let config = quick_config(5).with_csa(
            CsaConfig::default()
                .with_iterations(3)
                .with_population_size(5)
                .with_feasibility(FeasibilityCheck::Headroom)
                .with_seed(5),
        );
        let outcome = TaskScheduler::new(config)
            .schedule(&scenario, &mut Vec::<String>::new())
            .unwrap();
        let metrics = outcome.metrics.unwrap();
        assert!(metrics.sla_violation_ratio >= 0.5);
    }

    #[test]
    fn test_latency_hook_runs_per_schedule() {
        let scenario = reference_scenario(10);
        let hook = Arc::new(CountingHook::default());
        let scheduler = TaskScheduler::new(quick_config(1)).with_latency_hook(hook.clone());
        scheduler.schedule(&scenario, &mut Vec::<String>::new()).unwrap();
        scheduler.schedule(&scenario, &mut Vec::<String>::new()).unwrap();
        assert_eq!(hook.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_task_lines_name_host_index() {
        let scenario = Scenario::new(vec![Task::new(0, 10, 10)], FleetSpec::reference().build());
        let mut lines: Vec<String> = Vec::new();
        let outcome = TaskScheduler::new(quick_config(3))
            .schedule(&scenario, &mut lines)
            .unwrap();

        let a = outcome.assignments[0];
        assert_eq!(a.host_id, scenario.hosts[a.host_index].id);
        assert_eq!(lines[0], format!("Task 0 allocated to Host {}", a.host_index));

        let hosts = vec![Host::new(7, 4096, 4096)];
        let scenario = Scenario::new(vec![Task::new(0, 10, 10)], hosts);
        let mut lines: Vec<String> = Vec::new();
        TaskScheduler::new(quick_config(2))
            .schedule(&scenario, &mut lines)
            .unwrap();
        assert_eq!(lines[0], "Task 0 allocated to Host 0");
    }

    #[test]
    fn test_config_json_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"csa": {"iterations": 3}}"#).unwrap();
        assert_eq!(config.csa.iterations, 3);
        assert_eq!(config.csa.population_size, 50);
        assert_eq!(config.reporting, ReportingMode::Derived);
    }
}
