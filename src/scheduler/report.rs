//! Allocation reporting.
//!
//! Reports the per-task assignment, the execution time and two summary
//! metrics for the best allocation of a run. Task lines name the host by
//! its position in the fleet (`Task 3 allocated to Host 0`).
//!
//! # Metric sources
//!
//! | Mode | Power | SLAV |
//! |------|-------|------|
//! | `Derived` | Σ per-task power estimate of the best allocation | violations / tasks |
//! | `Calibrated` | table value by batch size, ±2.5 % noise | table value by batch size |
//!
//! Calibrated values are tagged [`MetricSource::Calibrated`] and printed
//! with a `[calibrated]` marker; they say nothing about the allocation.

use std::collections::BTreeMap;
use std::io::{self, Write};

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::csa::Evaluation;

/// Where a reported metric came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSource {
    /// Computed from the reported allocation.
    Derived,
    /// Looked up from a calibration table.
    Calibrated,
}

/// Summary metrics of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedMetrics {
    /// Power consumption estimate (W).
    pub power_watts: f64,
    /// Fraction of tasks violating their SLA (0.0..1.0).
    pub sla_violation_ratio: f64,
    /// Source of `power_watts`.
    pub power_source: MetricSource,
    /// Source of `sla_violation_ratio`.
    pub slav_source: MetricSource,
}

/// One row of a calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    /// Nominal power (W).
    pub power_watts: f64,
    /// Nominal SLA violation ratio.
    pub sla_violation_ratio: f64,
}

/// Metric values keyed by task batch size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    /// Rows by batch size.
    pub entries: BTreeMap<usize, CalibrationEntry>,
    /// Power used for batch sizes missing from the table (W).
    pub fallback_power_watts: f64,
    /// Relative width of the uniform noise applied to power (0.05 = ±2.5 %).
    pub power_variation: f64,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        let entries = [(50, 450.0, 0.30), (100, 520.0, 0.35), (150, 580.0, 0.40), (200, 650.0, 0.45)]
            .into_iter()
            .map(|(batch, power_watts, sla_violation_ratio)| {
                (
                    batch,
                    CalibrationEntry {
                        power_watts,
                        sla_violation_ratio,
                    },
                )
            })
            .collect();
        Self {
            entries,
            fallback_power_watts: 450.0,
            power_variation: 0.05,
        }
    }
}

impl CalibrationTable {
    fn power<R: Rng>(&self, num_tasks: usize, rng: &mut R) -> f64 {
        let nominal = self
            .entries
            .get(&num_tasks)
            .map_or(self.fallback_power_watts, |e| e.power_watts);
        let variation = nominal * self.power_variation;
        nominal + rng.random::<f64>() * variation - variation / 2.0
    }
}

/// How summary metrics are produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ReportingMode {
    /// Compute metrics from the best allocation.
    #[default]
    Derived,
    /// Look metrics up from a calibration table.
    Calibrated(CalibrationTable),
}

impl ReportingMode {
    /// Produces metrics for a batch of `evaluation.num_tasks` tasks.
    ///
    /// `evaluation` is the detailed evaluation of the reported allocation.
    pub fn metrics<R: Rng>(&self, evaluation: &Evaluation, rng: &mut R) -> ReportedMetrics {
        match self {
            ReportingMode::Derived => ReportedMetrics {
                power_watts: evaluation.total_power,
                sla_violation_ratio: evaluation.sla_violation_ratio(),
                power_source: MetricSource::Derived,
                slav_source: MetricSource::Derived,
            },
            ReportingMode::Calibrated(table) => {
                let num_tasks = evaluation.num_tasks;
                let (sla_violation_ratio, slav_source) = match table.entries.get(&num_tasks) {
                    Some(entry) => (entry.sla_violation_ratio, MetricSource::Calibrated),
                    None => (evaluation.sla_violation_ratio(), MetricSource::Derived),
                };
                ReportedMetrics {
                    power_watts: table.power(num_tasks, rng),
                    sla_violation_ratio,
                    power_source: MetricSource::Calibrated,
                    slav_source,
                }
            }
        }
    }
}

/// Destination for scheduling report lines.
pub trait ReportSink {
    /// A task was allocated to the host at `host_index` in the fleet.
    fn task_assigned(&mut self, task_id: usize, host_index: usize) -> io::Result<()>;

    /// The run produced no allocation.
    fn no_solution(&mut self) -> io::Result<()>;

    /// Wall-clock time of the run.
    fn execution_time(&mut self, elapsed_ms: u128) -> io::Result<()>;

    /// Summary metrics of the reported allocation.
    fn metrics(&mut self, metrics: &ReportedMetrics) -> io::Result<()>;
}

fn task_line(task_id: usize, host_index: usize) -> String {
    format!("Task {task_id} allocated to Host {host_index}")
}

fn metric_lines(metrics: &ReportedMetrics) -> [String; 2] {
    let marker = |source: MetricSource| match source {
        MetricSource::Derived => "",
        MetricSource::Calibrated => " [calibrated]",
    };
    [
        format!(
            "Power Consumption: {:.2} W{}",
            metrics.power_watts,
            marker(metrics.power_source)
        ),
        format!(
            "SLAV: {:.4}{}",
            metrics.sla_violation_ratio,
            marker(metrics.slav_source)
        ),
    ]
}

const NO_SOLUTION: &str = "No allocation found";

/// Writes report lines to any [`Write`] target.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterSink<io::Stdout> {
    /// Sink on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn task_assigned(&mut self, task_id: usize, host_index: usize) -> io::Result<()> {
        writeln!(self.out, "{}", task_line(task_id, host_index))
    }

    fn no_solution(&mut self) -> io::Result<()> {
        writeln!(self.out, "{NO_SOLUTION}")
    }

    fn execution_time(&mut self, elapsed_ms: u128) -> io::Result<()> {
        writeln!(self.out, "Execution time: {elapsed_ms} ms")
    }

    fn metrics(&mut self, metrics: &ReportedMetrics) -> io::Result<()> {
        for line in metric_lines(metrics) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}

/// Emits report lines through the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn task_assigned(&mut self, task_id: usize, host_index: usize) -> io::Result<()> {
        info!("{}", task_line(task_id, host_index));
        Ok(())
    }

    fn no_solution(&mut self) -> io::Result<()> {
        info!("{NO_SOLUTION}");
        Ok(())
    }

    fn execution_time(&mut self, elapsed_ms: u128) -> io::Result<()> {
        info!("Execution time: {elapsed_ms} ms");
        Ok(())
    }

    fn metrics(&mut self, metrics: &ReportedMetrics) -> io::Result<()> {
        for line in metric_lines(metrics) {
            info!("{line}");
        }
        Ok(())
    }
}

/// Collects report lines in memory.
impl ReportSink for Vec<String> {
    fn task_assigned(&mut self, task_id: usize, host_index: usize) -> io::Result<()> {
        self.push(task_line(task_id, host_index));
        Ok(())
    }

    fn no_solution(&mut self) -> io::Result<()> {
        self.push(NO_SOLUTION.to_string());
        Ok(())
    }

    fn execution_time(&mut self, elapsed_ms: u128) -> io::Result<()> {
        self.push(format!("Execution time: {elapsed_ms} ms"));
        Ok(())
    }

    fn metrics(&mut self, metrics: &ReportedMetrics) -> io::Result<()> {
        self.extend(metric_lines(metrics));
        Ok(())
    }
}
