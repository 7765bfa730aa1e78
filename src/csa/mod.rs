//! Population-based allocation search ("CSA").
//!
//! A random population of task → host allocations is scored and filtered
//! generation by generation. Scoring replays each allocation against the
//! fleet with a private usage ledger, so the shared host set is never
//! mutated and candidates can be evaluated in parallel.
//!
//! # Submodules
//!
//! - [`fitness`]: evaluation pass and the two scoring policies
//! - [`population`]: random population construction
//! - [`selection`]: survivor admission, truncation, best tracking
//! - [`operators`]: optional crossover and mutation
//! - [`latency`]: pre-search latency hooks
//!
//! # Behaviour notes
//!
//! With the default configuration the search is selection-only: no new
//! allocations are created after initialization, and survivors are
//! admitted by comparison against the *first* admitted candidate.

mod config;
pub mod fitness;
pub mod latency;
pub mod operators;
pub mod population;
mod runner;
pub mod selection;

pub use config::{ConfigError, CsaConfig};
pub use fitness::{Evaluation, FeasibilityCheck, FitnessEvaluator, FitnessPolicy, PowerModel};
pub use latency::{BatchStall, LatencyHook, NoLatency};
pub use operators::{CrossoverType, MutationType, PerturbationOperators};
pub use population::Population;
pub use runner::{CsaOptimizer, CsaResult, GenerationStats};
pub use selection::{BestSolution, BestStrategy, SurvivorRule, Truncation};
