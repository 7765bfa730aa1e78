//! Batch scheduling and reporting.
//!
//! [`TaskScheduler`] runs one search per scenario and reports the best
//! allocation through a [`ReportSink`].
//!
//! # Reporting
//!
//! Each run reports one line per task (`Task 3 allocated to Host 1`),
//! the execution time, and power/SLAV metrics. Metrics are derived from
//! the reported allocation unless [`ReportingMode::Calibrated`] is chosen.

mod allocator;
pub mod report;

pub use allocator::{
    ScheduleError, ScheduleOutcome, SchedulerConfig, TaskAssignment, TaskScheduler,
};
pub use report::{
    CalibrationEntry, CalibrationTable, LogSink, MetricSource, ReportSink, ReportedMetrics,
    ReportingMode, WriterSink,
};
