//! Generational search driver.
//!
//! # Algorithm
//!
//! 1. Initialize a random population of `population_size` allocations.
//! 2. Invoke the latency hook.
//! 3. For each of `iterations` generations:
//!    - evaluate every candidate (sequentially or in parallel),
//!    - admit survivors in population order ([`SurvivorRule`]),
//!    - optionally cap survivors at `min(population_size, num_tasks)`,
//!    - optionally refill with offspring bred from survivors,
//!    - stop early if the population is empty.
//! 4. Report the best solution ([`BestStrategy`]).
//!
//! [`SurvivorRule`]: super::SurvivorRule

use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::CsaConfig;
use super::fitness::FitnessEvaluator;
use super::latency::{LatencyHook, NoLatency};
use super::population::Population;
use super::selection::{
    select_survivors, survivor_cap, truncate_survivors, BestSolution, BestStrategy, BestTracker,
    Truncation,
};
use crate::models::{Allocation, Host, Task};

/// Statistics of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Zero-based generation index.
    pub generation: usize,
    /// Candidates evaluated.
    pub evaluated: usize,
    /// Candidates admitted (after truncation).
    pub survivors: usize,
    /// Population size after refilling.
    pub population: usize,
    /// Best fitness among evaluated candidates (`None` if none were).
    pub best_fitness: Option<f64>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsaResult {
    /// Generations actually executed.
    pub generations_run: usize,
    /// Whether the run stopped because the population was empty.
    pub aborted: bool,
    /// Fitness of the reported best solution.
    pub best_fitness: Option<f64>,
    /// Per-generation statistics.
    pub history: Vec<GenerationStats>,
}

/// Population-based allocation optimizer over one task batch and fleet.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_hostalloc::csa::{CsaConfig, CsaOptimizer};
/// use u_hostalloc::models::{Host, Task};
///
/// let tasks: Vec<Task> = (0..10).map(|i| Task::new(i, 300, 100)).collect();
/// let hosts = vec![Host::new(1, 4096, 1860), Host::new(2, 4096, 2660)];
/// let config = CsaConfig::default().with_iterations(5).with_population_size(8);
///
/// let mut optimizer = CsaOptimizer::new(&tasks, &hosts, config);
/// let mut rng = SmallRng::seed_from_u64(42);
/// let result = optimizer.run(&mut rng);
///
/// assert_eq!(result.generations_run, 5);
/// let best = optimizer.best_solution().unwrap();
/// assert!(best.allocation.is_within(hosts.len()));
/// ```
pub struct CsaOptimizer<'a> {
    evaluator: FitnessEvaluator<'a>,
    config: CsaConfig,
    population: Population,
    tracker: BestTracker,
    latency: Arc<dyn LatencyHook>,
}

impl<'a> CsaOptimizer<'a> {
    /// Creates an optimizer with an empty population.
    pub fn new(tasks: &'a [Task], hosts: &'a [Host], config: CsaConfig) -> Self {
        let evaluator = FitnessEvaluator::new(tasks, hosts)
            .with_policy(config.fitness_policy)
            .with_feasibility(config.feasibility)
            .with_power_model(config.power_model);
        Self {
            evaluator,
            config,
            population: Population::new(),
            tracker: BestTracker::new(),
            latency: Arc::new(NoLatency),
        }
    }

    /// Sets the hook invoked before the first generation.
    pub fn with_latency_hook(mut self, hook: Arc<dyn LatencyHook>) -> Self {
        self.latency = hook;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &CsaConfig {
        &self.config
    }

    /// The fitness evaluator in use.
    pub fn evaluator(&self) -> &FitnessEvaluator<'a> {
        &self.evaluator
    }

    /// The current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Mutable access to the current population.
    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    fn num_tasks(&self) -> usize {
        self.evaluator.tasks().len()
    }

    fn num_hosts(&self) -> usize {
        self.evaluator.hosts().len()
    }

    /// Replaces the population with `size` random allocations.
    ///
    /// Clears the best-solution tracker.
    pub fn initialize_population<R: Rng>(&mut self, size: usize, rng: &mut R) {
        self.population = Population::initialize(size, self.num_tasks(), self.num_hosts(), rng);
        self.tracker.clear();
    }

    /// Initializes the population and runs the configured number of generations.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> CsaResult {
        self.initialize_population(self.config.population_size, rng);
        self.latency.before_search(self.num_tasks());
        self.run_generations(self.config.iterations, rng)
    }

    /// Runs up to `iterations` generations on the current population.
    pub fn run_generations<R: Rng>(&mut self, iterations: usize, rng: &mut R) -> CsaResult {
        let mut history = Vec::with_capacity(iterations);
        let mut aborted = false;

        for generation in 0..iterations {
            if self.population.is_empty() {
                warn!("population is empty; stopping after {generation} generations");
                aborted = true;
                break;
            }

            let stats = self.step(generation, rng);
            debug!(
                "generation {}: evaluated {}, survivors {}, best {:?}",
                generation, stats.evaluated, stats.survivors, stats.best_fitness
            );
            history.push(stats);

            if self.population.is_empty() {
                warn!("population emptied in generation {generation}; stopping");
                aborted = true;
                break;
            }
        }

        let best_fitness = self.best_solution().map(|b| b.fitness);
        info!(
            "search finished: {} generations, {} candidates, best fitness {:?}",
            history.len(),
            self.population.len(),
            best_fitness
        );

        CsaResult {
            generations_run: history.len(),
            aborted,
            best_fitness,
            history,
        }
    }

    /// Runs one generation.
    pub fn step<R: Rng>(&mut self, generation: usize, rng: &mut R) -> GenerationStats {
        let candidates = self.population.take();
        let fitness = self.evaluate_all(&candidates);
        let evaluated = candidates.len();

        for (candidate, &f) in candidates.iter().zip(&fitness) {
            self.tracker.observe(candidate, f);
        }
        let generation_best = fitness.iter().copied().reduce(f64::max);

        let (mut survivors, mut survivor_fitness) =
            select_survivors(candidates, &fitness, self.config.survivor_rule);
        let cap = survivor_cap(self.config.population_size, self.num_tasks());
        truncate_survivors(
            &mut survivors,
            &mut survivor_fitness,
            self.config.truncation,
            cap,
        );
        let admitted = survivors.len();

        let target = match self.config.truncation {
            Truncation::Capped => cap,
            Truncation::None => self.config.population_size,
        };
        if survivors.len() < target {
            let offspring = self.config.operators.breed(
                &survivors,
                target - survivors.len(),
                self.num_hosts(),
                rng,
            );
            survivors.extend(offspring);
        }

        self.population.replace(survivors);

        GenerationStats {
            generation,
            evaluated,
            survivors: admitted,
            population: self.population.len(),
            best_fitness: generation_best,
        }
    }

    fn evaluate_all(&self, candidates: &[Allocation]) -> Vec<f64> {
        let evaluator = &self.evaluator;
        if self.config.parallel {
            candidates.par_iter().map(|c| evaluator.evaluate(c)).collect()
        } else {
            candidates.iter().map(|c| evaluator.evaluate(c)).collect()
        }
    }

    /// The best solution under the configured [`BestStrategy`].
    ///
    /// Returns `None` when there is nothing to report.
    pub fn best_solution(&self) -> Option<BestSolution> {
        let best = match self.config.best_strategy {
            BestStrategy::Positional => self.population.first().map(|allocation| BestSolution {
                allocation: allocation.clone(),
                fitness: self.evaluator.evaluate(allocation),
            }),
            BestStrategy::RunningMax => match self.tracker.best() {
                Some(best) => Some(best.clone()),
                None => self.scan_population(),
            },
        };
        if best.is_none() {
            warn!("no solution available: population is empty");
        }
        best
    }

    fn scan_population(&self) -> Option<BestSolution> {
        let mut tracker = BestTracker::new();
        for candidate in &self.population {
            tracker.observe(candidate, self.evaluator.evaluate(candidate));
        }
        tracker.best().cloned()
    }
}
