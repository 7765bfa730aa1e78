//! Input validation for allocation problems.
//!
//! Checks structural integrity of a task batch and fleet before searching.
//! Only defects that would break indexing are errors:
//! - Task IDs that cannot index an allocation (outside `0..n`)
//! - Duplicate task IDs
//! - Empty fleets
//!
//! Everything else is legal input and is reported by [`validate_warnings`]:
//! zero-capacity hosts, oversized VM descriptors, duplicate host and VM
//! IDs, and tasks that fit no host. Such defects only turn the affected
//! tasks into SLA violations.

use std::collections::HashSet;

use crate::models::{Host, Task};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A task ID lies outside `0..n` for a batch of `n` tasks.
    NonDenseTaskId,
    /// There are no hosts.
    EmptyFleet,
    /// A host has zero CPU or memory capacity.
    ZeroCapacity,
    /// A VM descriptor exceeds its host's capacity.
    VmExceedsHost,
    /// A task exceeds the raw capacity of every host.
    UnsatisfiableTask,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the input data for an allocation problem.
///
/// Checks:
/// 1. Task IDs are unique and lie in `0..tasks.len()`
/// 2. At least one host exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], hosts: &[Host]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut task_ids = HashSet::new();
    for task in tasks {
        if task.id >= tasks.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonDenseTaskId,
                format!(
                    "Task ID {} is outside 0..{} and cannot index an allocation",
                    task.id,
                    tasks.len()
                ),
            ));
        }
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
    }

    if hosts.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyFleet,
            "No hosts to allocate tasks to",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reports legal but suspicious input.
///
/// Checks:
/// 1. Host IDs and VM IDs are unique
/// 2. Every host has non-zero CPU and memory capacity
/// 3. No VM descriptor exceeds its host
/// 4. Every task fits the raw capacity of at least one host
///
/// Tasks failing (4), and tasks placed on hosts failing (2), are always
/// counted as SLA violations.
pub fn validate_warnings(tasks: &[Task], hosts: &[Host]) -> Vec<ValidationError> {
    let mut warnings = Vec::new();

    let mut host_ids = HashSet::new();
    let mut vm_ids = HashSet::new();
    for host in hosts {
        if !host_ids.insert(host.id) {
            warnings.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate host ID: {}", host.id),
            ));
        }

        if host.total_cpu == 0 || host.total_ram == 0 {
            warnings.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!(
                    "Host {} has zero capacity ({} MIPS, {} MB)",
                    host.id, host.total_cpu, host.total_ram
                ),
            ));
        }

        for vm in &host.vms {
            if !vm_ids.insert(vm.id) {
                warnings.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate VM ID: {}", vm.id),
                ));
            }
            if vm.cpu_capacity > host.total_cpu || vm.ram_capacity > host.total_ram {
                warnings.push(ValidationError::new(
                    ValidationErrorKind::VmExceedsHost,
                    format!("VM {} does not fit on host {}", vm.id, host.id),
                ));
            }
        }
    }

    warnings.extend(
        tasks
            .iter()
            .filter(|task| {
                !hosts
                    .iter()
                    .any(|h| task.fits_within(h.total_cpu, h.total_ram))
            })
            .map(|task| {
                ValidationError::new(
                    ValidationErrorKind::UnsatisfiableTask,
                    format!(
                        "Task {} ({} MIPS, {} MB) fits no host",
                        task.id, task.cpu_required, task.ram_required
                    ),
                )
            }),
    );

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VmDescriptor;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(0, 500, 200),
            Task::new(1, 700, 300),
            Task::new(2, 100, 100),
        ]
    }

    fn sample_hosts() -> Vec<Host> {
        vec![
            Host::new(1, 4096, 1860).with_vm(VmDescriptor::new(0, 512, 250)),
            Host::new(2, 4096, 2660).with_vm(VmDescriptor::new(1, 1024, 1000)),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_tasks(), &sample_hosts()).is_ok());
        assert!(validate_warnings(&sample_tasks(), &sample_hosts()).is_empty());
    }

    #[test]
    fn test_task_order_does_not_matter() {
        let mut tasks = sample_tasks();
        tasks.reverse();
        assert!(validate_input(&tasks, &sample_hosts()).is_ok());
    }

    #[test]
    fn test_non_dense_task_id() {
        let tasks = vec![Task::new(0, 1, 1), Task::new(5, 1, 1)];
        let errors = validate_input(&tasks, &sample_hosts()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NonDenseTaskId));
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![Task::new(0, 1, 1), Task::new(0, 2, 2)];
        let errors = validate_input(&tasks, &sample_hosts()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("task")));
    }

    #[test]
    fn test_duplicate_host_and_vm_ids_are_warnings() {
        let hosts = vec![
            Host::new(1, 100, 100).with_vm(VmDescriptor::new(0, 10, 10)),
            Host::new(1, 100, 100).with_vm(VmDescriptor::new(0, 10, 10)),
        ];
        assert!(validate_input(&[], &hosts).is_ok());
        let warnings = validate_warnings(&[], &hosts);
        assert!(warnings.iter().any(|e| e.message.contains("host ID")));
        assert!(warnings.iter().any(|e| e.message.contains("VM ID")));
    }

    #[test]
    fn test_empty_fleet() {
        let errors = validate_input(&sample_tasks(), &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyFleet);
    }

    #[test]
    fn test_zero_capacity_is_warning() {
        let hosts = vec![Host::new(1, 4096, 0), Host::new(2, 4096, 2660)];
        assert!(validate_input(&sample_tasks(), &hosts).is_ok());
        let warnings = validate_warnings(&sample_tasks(), &hosts);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ValidationErrorKind::ZeroCapacity);
    }

    #[test]
    fn test_vm_exceeds_host_is_warning() {
        let hosts = vec![Host::new(1, 1000, 1000).with_vm(VmDescriptor::new(0, 2000, 10))];
        assert!(validate_input(&sample_tasks(), &hosts).is_ok());
        let warnings = validate_warnings(&sample_tasks(), &hosts);
        assert!(warnings
            .iter()
            .any(|e| e.kind == ValidationErrorKind::VmExceedsHost));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let tasks = vec![Task::new(3, 1, 1), Task::new(3, 1, 1)];
        let errors = validate_input(&tasks, &[]).unwrap_err();
        // two out-of-range IDs, one duplicate, empty fleet
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_unsatisfiable_warning() {
        let tasks = vec![Task::new(0, 100, 100), Task::new(1, 5000, 100)];
        let warnings = validate_warnings(&tasks, &sample_hosts());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ValidationErrorKind::UnsatisfiableTask);
        assert!(warnings[0].message.contains("Task 1"));
    }
}
