//! Optimizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fitness::{FeasibilityCheck, FitnessPolicy, PowerModel};
use super::operators::PerturbationOperators;
use super::selection::{BestStrategy, SurvivorRule, Truncation};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Search budget and policy selection for one optimizer run.
///
/// # Example
///
/// ```
/// use u_hostalloc::csa::{CsaConfig, FitnessPolicy};
///
/// let config = CsaConfig::default()
///     .with_iterations(20)
///     .with_population_size(10)
///     .with_policy(FitnessPolicy::PenaltyReward)
///     .with_seed(42);
/// assert_eq!(config.iterations, 20);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsaConfig {
    /// Number of generations (default: 100).
    pub iterations: usize,
    /// Initial population size (default: 50).
    pub population_size: usize,
    /// Scoring policy.
    pub fitness_policy: FitnessPolicy,
    /// Per-task feasibility check.
    pub feasibility: FeasibilityCheck,
    /// Power estimate weights.
    pub power_model: PowerModel,
    /// Admission threshold for the next generation.
    pub survivor_rule: SurvivorRule,
    /// Whether survivors are capped at `min(population_size, num_tasks)`.
    pub truncation: Truncation,
    /// How the best solution is reported.
    pub best_strategy: BestStrategy,
    /// Optional crossover/mutation applied after selection.
    pub operators: PerturbationOperators,
    /// Evaluate candidates of a generation in parallel.
    pub parallel: bool,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for CsaConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            population_size: 50,
            fitness_policy: FitnessPolicy::default(),
            feasibility: FeasibilityCheck::default(),
            power_model: PowerModel::default(),
            survivor_rule: SurvivorRule::default(),
            truncation: Truncation::default(),
            best_strategy: BestStrategy::default(),
            operators: PerturbationOperators::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl CsaConfig {
    /// Sets the number of generations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the initial population size.
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Sets the scoring policy.
    pub fn with_policy(mut self, policy: FitnessPolicy) -> Self {
        self.fitness_policy = policy;
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

    /// Sets the survivor admission rule.
    pub fn with_survivor_rule(mut self, rule: SurvivorRule) -> Self {
        self.survivor_rule = rule;
        self
    }

    /// Sets the truncation mode.
    pub fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = truncation;
        self
    }

    /// Sets the best-solution strategy.
    pub fn with_best_strategy(mut self, strategy: BestStrategy) -> Self {
        self.best_strategy = strategy;
        self
    }

    /// Sets the perturbation operators.
    pub fn with_operators(mut self, operators: PerturbationOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
