//! Population of candidate allocations.
//!
//! # Initialization
//!
//! Every candidate is built independently: each task draws its host
//! uniformly from `[0, num_hosts)`. There is no feasibility or load
//! awareness at construction time.

use log::warn;
use rand::Rng;

use crate::models::Allocation;

/// Ordered collection of candidate allocations.
///
/// Candidates have no identity beyond their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    members: Vec<Allocation>,
}

impl Population {
    /// Creates an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `size` random allocations of `num_tasks` tasks over `num_hosts` hosts.
    ///
    /// A zero `size` or an empty fleet yields an empty population and a
    /// diagnostic; it is never an error.
    pub fn initialize<R: Rng>(
        size: usize,
        num_tasks: usize,
        num_hosts: usize,
        rng: &mut R,
    ) -> Self {
        if size == 0 {
            warn!("population size must be positive; starting with an empty population");
            return Self::new();
        }
        if num_hosts == 0 {
            warn!("no hosts to allocate {num_tasks} tasks to; starting with an empty population");
            return Self::new();
        }

        let members = (0..size)
            .map(|_| Self::random_allocation(num_tasks, num_hosts, rng))
            .collect();
        Self { members }
    }

    /// Creates one allocation by uniform random host choice per task.
    ///
    /// `num_hosts` must be positive.
    pub fn random_allocation<R: Rng>(
        num_tasks: usize,
        num_hosts: usize,
        rng: &mut R,
    ) -> Allocation {
        let mut allocation = Allocation::new(num_tasks);
        for task_id in 0..num_tasks {
            allocation.assign(task_id, rng.random_range(0..num_hosts));
        }
        allocation
    }

    /// Number of candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no candidates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The candidate at position 0.
    pub fn first(&self) -> Option<&Allocation> {
        self.members.first()
    }

    /// The candidate at `index`.
    pub fn get(&self, index: usize) -> Option<&Allocation> {
        self.members.get(index)
    }

    /// Candidates in order.
    pub fn as_slice(&self) -> &[Allocation] {
        &self.members
    }

    /// Iterates candidates in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Allocation> {
        self.members.iter()
    }

    /// Replaces every candidate with `members`.
    pub fn replace(&mut self, members: Vec<Allocation>) {
        self.members = members;
    }

    /// Removes and returns every candidate, leaving the population empty.
    pub fn take(&mut self) -> Vec<Allocation> {
        std::mem::take(&mut self.members)
    }

    /// Keeps only the first `len` candidates.
    pub fn truncate(&mut self, len: usize) {
        self.members.truncate(len);
    }
}

impl From<Vec<Allocation>> for Population {
    fn from(members: Vec<Allocation>) -> Self {
        Self { members }
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Allocation;
    type IntoIter = std::slice::Iter<'a, Allocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_exact_size() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::initialize(50, 30, 2, &mut rng);
        assert_eq!(pop.len(), 50);
        for alloc in &pop {
            assert_eq!(alloc.len(), 30);
            assert!(alloc.is_within(2));
        }
    }

    #[test]
    fn test_initialize_zero_is_empty() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::initialize(0, 30, 2, &mut rng);
        assert!(pop.is_empty());
        assert!(pop.first().is_none());
    }

    #[test]
    fn test_initialize_without_hosts_is_empty() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(Population::initialize(10, 30, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_random_allocation_uses_all_hosts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let alloc = Population::random_allocation(200, 4, &mut rng);
        assert!(alloc.is_within(4));
        assert_eq!(alloc.hosts_used(), 4);
    }

    #[test]
    fn test_seeded_initialization_is_reproducible() {
        let a = Population::initialize(5, 10, 3, &mut SmallRng::seed_from_u64(9));
        let b = Population::initialize(5, 10, 3, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_take_replace_truncate() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = Population::initialize(6, 4, 2, &mut rng);
        let members = pop.take();
        assert!(pop.is_empty());
        assert_eq!(members.len(), 6);

        pop.replace(members);
        pop.truncate(2);
        assert_eq!(pop.len(), 2);
        assert!(pop.get(2).is_none());
    }
}
