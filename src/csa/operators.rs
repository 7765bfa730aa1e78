//! Configurable perturbation operators for allocations.
//!
//! The generational loop is selection-only unless operators are
//! configured here. When enabled, survivors are used as parents to refill
//! the population after selection.
//!
//! # Usage
//!
//! ```
//! use u_hostalloc::csa::operators::{CrossoverType, MutationType, PerturbationOperators};
//!
//! let ops = PerturbationOperators::default();
//! assert!(!ops.is_enabled());
//!
//! let ops = PerturbationOperators::new()
//!     .with_crossover(CrossoverType::Uniform)
//!     .with_mutation(MutationType::Reassign);
//! assert!(ops.is_enabled());
//! ```

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Allocation;

/// Crossover strategy for two parent allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Each task's host is taken from either parent with equal probability.
    Uniform,
    /// Tasks before a random cut come from one parent, the rest from the other.
    OnePoint,
}

/// Mutation strategy for a single allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationType {
    /// Move one random task to a uniformly random host.
    Reassign,
    /// Exchange the hosts of two random tasks.
    Swap,
}

/// Runtime-selectable perturbation operators.
///
/// Both operators are optional; with neither configured the search is
/// pure truncation selection over the initial random population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerturbationOperators {
    /// Crossover strategy, if any.
    pub crossover: Option<CrossoverType>,
    /// Mutation strategy, if any.
    pub mutation: Option<MutationType>,
}

impl PerturbationOperators {
    /// No operators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover: CrossoverType) -> Self {
        self.crossover = Some(crossover);
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation: MutationType) -> Self {
        self.mutation = Some(mutation);
        self
    }

    /// Whether any operator is configured.
    pub fn is_enabled(&self) -> bool {
        self.crossover.is_some() || self.mutation.is_some()
    }

    /// Performs crossover using the configured strategy.
    ///
    /// Without a crossover strategy the parents are cloned unchanged.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Allocation,
        p2: &Allocation,
        rng: &mut R,
    ) -> (Allocation, Allocation) {
        match self.crossover {
            Some(CrossoverType::Uniform) => uniform_crossover(p1, p2, rng),
            Some(CrossoverType::OnePoint) => one_point_crossover(p1, p2, rng),
            None => (p1.clone(), p2.clone()),
        }
    }

    /// Performs mutation using the configured strategy (no-op if none).
    pub fn mutate<R: Rng>(&self, allocation: &mut Allocation, num_hosts: usize, rng: &mut R) {
        match self.mutation {
            Some(MutationType::Reassign) => reassign_mutation(allocation, num_hosts, rng),
            Some(MutationType::Swap) => swap_mutation(allocation, rng),
            None => {}
        }
    }

    /// Breeds `count` offspring from randomly paired `parents`.
    ///
    /// Returns an empty vector if there are no parents or no operators.
    pub fn breed<R: Rng>(
        &self,
        parents: &[Allocation],
        count: usize,
        num_hosts: usize,
        rng: &mut R,
    ) -> Vec<Allocation> {
        if parents.is_empty() || !self.is_enabled() {
            return Vec::new();
        }

        let mut offspring = Vec::with_capacity(count);
        while offspring.len() < count {
            let (Some(p1), Some(p2)) = (parents.choose(rng), parents.choose(rng)) else {
                break;
            };
            let (mut c1, mut c2) = self.crossover(p1, p2, rng);
            self.mutate(&mut c1, num_hosts, rng);
            offspring.push(c1);
            if offspring.len() < count {
                self.mutate(&mut c2, num_hosts, rng);
                offspring.push(c2);
            }
        }
        offspring
    }
}

/// Uniform crossover: every task picks its host from either parent.
///
/// The second child receives the complementary choices.
pub fn uniform_crossover<R: Rng>(
    p1: &Allocation,
    p2: &Allocation,
    rng: &mut R,
) -> (Allocation, Allocation) {
    let len = p1.len().min(p2.len());
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    for task_id in 0..len {
        if rng.random_bool(0.5) {
            c1.assign(task_id, p2.host_for(task_id));
            c2.assign(task_id, p1.host_for(task_id));
        }
    }
    (c1, c2)
}

/// One-point crossover: swap the tails of both parents after a random cut.
pub fn one_point_crossover<R: Rng>(
    p1: &Allocation,
    p2: &Allocation,
    rng: &mut R,
) -> (Allocation, Allocation) {
    let len = p1.len().min(p2.len());
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    if len < 2 {
        return (c1, c2);
    }
    let cut = rng.random_range(1..len);
    for task_id in cut..len {
        c1.assign(task_id, p2.host_for(task_id));
        c2.assign(task_id, p1.host_for(task_id));
    }
    (c1, c2)
}

/// Moves one random task to a uniformly random host in `[0, num_hosts)`.
pub fn reassign_mutation<R: Rng>(allocation: &mut Allocation, num_hosts: usize, rng: &mut R) {
    if allocation.is_empty() || num_hosts == 0 {
        return;
    }
    let task_id = rng.random_range(0..allocation.len());
    allocation.assign(task_id, rng.random_range(0..num_hosts));
}

/// Exchanges the hosts of two random tasks.
pub fn swap_mutation<R: Rng>(allocation: &mut Allocation, rng: &mut R) {
    let len = allocation.len();
    if len < 2 {
        return;
    }
    let a = rng.random_range(0..len);
    let b = rng.random_range(0..len);
    let host_a = allocation.host_for(a);
    allocation.assign(a, allocation.host_for(b));
    allocation.assign(b, host_a);
}
