//! Survivor selection and best-solution tracking.
//!
//! # Admission
//!
//! Candidates are swept in population order. The first candidate is always
//! admitted; every later candidate is admitted only if its fitness beats a
//! threshold chosen by [`SurvivorRule`]:
//!
//! - `FirstWins`: the fitness of the *first* admitted candidate. A weak
//!   early entry lets many later candidates through.
//! - `RunningMax`: the best fitness admitted so far in this sweep.
//!
//! # Truncation
//!
//! With [`Truncation::Capped`] the admitted list is cut to
//! `min(population_size, num_tasks)` by position, not by fitness.

use serde::{Deserialize, Serialize};

use crate::models::Allocation;

/// Threshold used to admit candidates into the next generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurvivorRule {
    /// Compare against the first admitted candidate.
    #[default]
    FirstWins,
    /// Compare against the best candidate admitted so far.
    RunningMax,
}

/// Whether the admitted list is cut to a dynamic cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Truncation {
    /// Keep every admitted candidate.
    None,
    /// Keep at most `min(population_size, num_tasks)` candidates.
    #[default]
    Capped,
}

/// How the reported best solution is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestStrategy {
    /// The first candidate of the current population.
    Positional,
    /// The highest fitness observed across all evaluated generations.
    #[default]
    RunningMax,
}

/// Dynamic survivor cap: `min(population_size, num_tasks)`.
#[inline]
pub fn survivor_cap(population_size: usize, num_tasks: usize) -> usize {
    population_size.min(num_tasks)
}

/// Sweeps `candidates` in order and returns the admitted ones with their fitness.
///
/// `fitness[i]` is the fitness of `candidates[i]`.
pub fn select_survivors(
    candidates: Vec<Allocation>,
    fitness: &[f64],
    rule: SurvivorRule,
) -> (Vec<Allocation>, Vec<f64>) {
    debug_assert_eq!(candidates.len(), fitness.len());

    let mut survivors = Vec::new();
    let mut survivor_fitness: Vec<f64> = Vec::new();
    let mut threshold = f64::NEG_INFINITY;

    for (candidate, &f) in candidates.into_iter().zip(fitness) {
        let admit = survivors.is_empty() || f > threshold;
        if !admit {
            continue;
        }
        threshold = match rule {
            SurvivorRule::FirstWins if survivors.is_empty() => f,
            SurvivorRule::FirstWins => threshold,
            SurvivorRule::RunningMax => f,
        };
        survivors.push(candidate);
        survivor_fitness.push(f);
    }

    (survivors, survivor_fitness)
}

/// Applies `truncation` to an admitted list.
pub fn truncate_survivors(
    survivors: &mut Vec<Allocation>,
    survivor_fitness: &mut Vec<f64>,
    truncation: Truncation,
    cap: usize,
) {
    if truncation == Truncation::Capped && survivors.len() > cap {
        survivors.truncate(cap);
        survivor_fitness.truncate(cap);
    }
}

/// Best allocation found, with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct BestSolution {
    /// The allocation.
    pub allocation: Allocation,
    /// Its fitness.
    pub fitness: f64,
}

/// Running maximum over every evaluated candidate.
///
/// Ties keep the earliest observation.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best: Option<BestSolution>,
}

impl BestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `allocation` if it beats the current best.
    pub fn observe(&mut self, allocation: &Allocation, fitness: f64) {
        let better = match &self.best {
            None => true,
            Some(best) => fitness > best.fitness,
        };
        if better {
            self.best = Some(BestSolution {
                allocation: allocation.clone(),
                fitness,
            });
        }
    }

    /// The best solution so far.
    pub fn best(&self) -> Option<&BestSolution> {
        self.best.as_ref()
    }

    /// Forgets everything observed.
    pub fn clear(&mut self) {
        self.best = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Allocation> {
        (0..n).map(|i| Allocation::from_hosts(vec![i])).collect()
    }

    fn tags(list: &[Allocation]) -> Vec<usize> {
        list.iter().map(|a| a.host_for(0)).collect()
    }

    #[test]
    fn test_first_wins_compares_against_first_entry() {
        let fitness = [1.0, 5.0, 2.0, 0.5, 3.0];
        let (survivors, f) = select_survivors(candidates(5), &fitness, SurvivorRule::FirstWins);
        // Everything above 1.0 gets in, even after a better candidate.
        assert_eq!(tags(&survivors), vec![0, 1, 2, 4]);
        assert_eq!(f, vec![1.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn test_running_max_compares_against_best_admitted() {
        let fitness = [1.0, 5.0, 2.0, 0.5, 6.0];
        let (survivors, _) = select_survivors(candidates(5), &fitness, SurvivorRule::RunningMax);
        assert_eq!(tags(&survivors), vec![0, 1, 4]);
    }

    #[test]
    fn test_first_candidate_always_admitted() {
        let fitness = [f64::NEG_INFINITY, -1.0];
        let (survivors, _) = select_survivors(candidates(2), &fitness, SurvivorRule::FirstWins);
        assert_eq!(tags(&survivors), vec![0, 1]);
    }

    #[test]
    fn test_equal_fitness_not_admitted() {
        let fitness = [2.0, 2.0, 2.0];
        let (survivors, _) = select_survivors(candidates(3), &fitness, SurvivorRule::FirstWins);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn test_empty_sweep() {
        let (survivors, f) = select_survivors(Vec::new(), &[], SurvivorRule::FirstWins);
        assert!(survivors.is_empty());
        assert!(f.is_empty());
    }

    #[test]
    fn test_truncation_capped() {
        let fitness = [0.0, 1.0, 2.0, 3.0, 4.0];
        let (mut s, mut f) = select_survivors(candidates(5), &fitness, SurvivorRule::FirstWins);
        truncate_survivors(&mut s, &mut f, Truncation::Capped, survivor_cap(50, 3));
        assert_eq!(tags(&s), vec![0, 1, 2]);
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn test_truncation_none() {
        let fitness = [0.0, 1.0, 2.0, 3.0, 4.0];
        let (mut s, mut f) = select_survivors(candidates(5), &fitness, SurvivorRule::FirstWins);
        truncate_survivors(&mut s, &mut f, Truncation::None, 2);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_survivor_cap() {
        assert_eq!(survivor_cap(50, 200), 50);
        assert_eq!(survivor_cap(50, 20), 20);
    }

    #[test]
    fn test_best_tracker() {
        let mut tracker = BestTracker::new();
        assert!(tracker.best().is_none());

        let a = Allocation::from_hosts(vec![0]);
        let b = Allocation::from_hosts(vec![1]);
        tracker.observe(&a, 1.0);
        tracker.observe(&b, 1.0);
        assert_eq!(tracker.best().unwrap().allocation, a);

        tracker.observe(&b, 2.0);
        assert_eq!(tracker.best().unwrap().allocation, b);
        assert_eq!(tracker.best().unwrap().fitness, 2.0);

        tracker.clear();
        assert!(tracker.best().is_none());
    }
}
