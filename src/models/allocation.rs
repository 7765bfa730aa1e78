//! Allocation (solution) model.
//!
//! An allocation is a complete task → host mapping: a dense vector indexed
//! by task ID whose values are host indices into the fleet slice.
//!
//! # Caller contract
//! [`Allocation::assign`] does not validate the host index. Allocations
//! built for one fleet must not be evaluated against a fleet of a
//! different size. Use [`Allocation::is_within`] to check explicitly.

use serde::{Deserialize, Serialize};

/// Errors raised when constructing an allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// The requested length was negative.
    #[error("allocation length must not be negative (got {0})")]
    NegativeLength(i64),
}

/// A task → host index mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    hosts: Vec<usize>,
}

impl Allocation {
    /// Creates an allocation for `num_tasks` tasks, all mapped to host 0.
    pub fn new(num_tasks: usize) -> Self {
        Self {
            hosts: vec![0; num_tasks],
        }
    }

    /// Creates an allocation from a signed length.
    ///
    /// # Errors
    /// [`AllocationError::NegativeLength`] if `num_tasks < 0`.
    pub fn try_new(num_tasks: i64) -> Result<Self, AllocationError> {
        let len =
            usize::try_from(num_tasks).map_err(|_| AllocationError::NegativeLength(num_tasks))?;
        Ok(Self::new(len))
    }

    /// Wraps an existing host index vector.
    pub fn from_hosts(hosts: Vec<usize>) -> Self {
        Self { hosts }
    }

    /// Maps `task_id` to `host_index`.
    ///
    /// # Panics
    /// Panics if `task_id >= self.len()`.
    #[inline]
    pub fn assign(&mut self, task_id: usize, host_index: usize) {
        self.hosts[task_id] = host_index;
    }

    /// Host index assigned to `task_id`.
    ///
    /// # Panics
    /// Panics if `task_id >= self.len()`.
    #[inline]
    pub fn host_for(&self, task_id: usize) -> usize {
        self.hosts[task_id]
    }

    /// Number of tasks covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the allocation covers no tasks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Host indices in task order.
    pub fn as_slice(&self) -> &[usize] {
        &self.hosts
    }

    /// Iterates `(task_id, host_index)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.hosts.iter().copied().enumerate()
    }

    /// Whether every host index lies in `[0, num_hosts)`.
    pub fn is_within(&self, num_hosts: usize) -> bool {
        self.hosts.iter().all(|&h| h < num_hosts)
    }

    /// Number of distinct hosts receiving at least one task.
    pub fn hosts_used(&self) -> usize {
        let mut seen: Vec<usize> = self.hosts.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_host_zero() {
        let alloc = Allocation::new(4);
        assert_eq!(alloc.len(), 4);
        assert!(alloc.iter().all(|(_, h)| h == 0));
    }

    #[test]
    fn test_try_new() {
        assert_eq!(Allocation::try_new(3).unwrap().len(), 3);
        assert!(Allocation::try_new(0).unwrap().is_empty());
        assert_eq!(
            Allocation::try_new(-1),
            Err(AllocationError::NegativeLength(-1))
        );
    }

    #[test]
    fn test_assign_and_lookup() {
        let mut alloc = Allocation::new(3);
        alloc.assign(1, 2);
        alloc.assign(2, 1);
        assert_eq!(alloc.host_for(0), 0);
        assert_eq!(alloc.host_for(1), 2);
        assert_eq!(alloc.host_for(2), 1);
        assert_eq!(alloc.as_slice(), &[0, 2, 1]);
    }

    #[test]
    fn test_assign_does_not_validate_host() {
        let mut alloc = Allocation::new(2);
        alloc.assign(0, 99);
        assert_eq!(alloc.host_for(0), 99);
        assert!(!alloc.is_within(2));
        assert!(alloc.is_within(100));
    }

    #[test]
    #[should_panic]
    fn test_task_out_of_range_panics() {
        let alloc = Allocation::new(2);
        let _ = alloc.host_for(2);
    }

    #[test]
    fn test_hosts_used() {
        assert_eq!(Allocation::from_hosts(vec![1, 1, 0, 1]).hosts_used(), 2);
        assert_eq!(Allocation::new(0).hosts_used(), 0);
    }
}
