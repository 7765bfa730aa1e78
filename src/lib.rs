//! Population-based task-to-host allocation.
//!
//! Allocates a batch of tasks, each with a CPU and memory demand, onto a
//! small fleet of hosts. A random population of allocations is scored on
//! utilization, power and SLA violations and filtered over a fixed number
//! of generations; the best allocation is reported with its metrics.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Host`, `VmDescriptor`, `Allocation`, `UsageLedger`
//! - **`csa`**: Fitness evaluation, population, selection, operators, optimizer driver
//! - **`scheduler`**: One-shot batch scheduling and report sinks
//! - **`scenario`**: Reference fleet and random task batch generation
//! - **`validation`**: Input integrity checks (duplicate IDs, empty fleet, capacities)
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_hostalloc::csa::CsaConfig;
//! use u_hostalloc::scenario::{DemandRange, FleetSpec, Scenario};
//! use u_hostalloc::scheduler::{LogSink, SchedulerConfig, TaskScheduler};
//!
//! let mut rng = SmallRng::seed_from_u64(1);
//! let scenario = Scenario::generate(50, &FleetSpec::reference(), &DemandRange::default(), &mut rng);
//! let config = SchedulerConfig::default()
//!     .with_csa(CsaConfig::default().with_iterations(10).with_population_size(20).with_seed(1));
//!
//! let outcome = TaskScheduler::new(config).schedule(&scenario, &mut LogSink).unwrap();
//! assert!(outcome.has_solution());
//! ```
//!
//! # References
//!
//! - Beloglazov & Buyya (2012), "Optimal online deterministic algorithms and
//!   adaptive heuristics for energy and performance efficient dynamic
//!   consolidation of virtual machines in cloud data centers"

pub mod csa;
pub mod models;
pub mod scenario;
pub mod scheduler;
pub mod validation;
