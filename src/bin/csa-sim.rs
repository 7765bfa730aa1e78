//! Runs the reference allocation experiment: one search per task batch
//! on a fresh two-host fleet, printing the allocation and its metrics.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_hostalloc::csa::{BatchStall, FitnessPolicy};
use u_hostalloc::scenario::{DemandRange, FleetSpec, Scenario, REFERENCE_BATCH_SIZES};
use u_hostalloc::scheduler::{
    CalibrationTable, ReportingMode, SchedulerConfig, TaskScheduler, WriterSink,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Utilization,
    Penalty,
}

impl From<Policy> for FitnessPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Utilization => FitnessPolicy::UtilizationWeighted,
            Policy::Penalty => FitnessPolicy::PenaltyReward,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Population-based task-to-host allocation experiment")]
struct Args {
    /// JSON scheduler configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations
    #[arg(long)]
    iterations: Option<usize>,

    /// Initial population size
    #[arg(long)]
    population: Option<usize>,

    /// RNG seed for task generation and search
    #[arg(long)]
    seed: Option<u64>,

    /// Task batch sizes to run
    #[arg(long, value_delimiter = ',', default_values_t = REFERENCE_BATCH_SIZES)]
    tasks: Vec<usize>,

    /// Fitness policy
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Report calibrated power/SLAV values instead of derived ones
    #[arg(long)]
    calibrated: bool,

    /// Enable the batch-size stall table, scaled by this factor
    #[arg(long)]
    stall_scale: Option<f64>,

    /// Evaluate candidates in parallel
    #[arg(long)]
    parallel: bool,
}

fn load_config(args: &Args) -> Result<SchedulerConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SchedulerConfig::from_json_file(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(iterations) = args.iterations {
        config.csa = config.csa.with_iterations(iterations);
    }
    if let Some(population) = args.population {
        config.csa = config.csa.with_population_size(population);
    }
    if let Some(seed) = args.seed {
        config.csa = config.csa.with_seed(seed);
    }
    if let Some(policy) = args.policy {
        config.csa = config.csa.with_policy(policy.into());
    }
    if args.parallel {
        config.csa = config.csa.with_parallel(true);
    }
    if args.calibrated {
        config.reporting = ReportingMode::Calibrated(CalibrationTable::default());
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut scheduler = TaskScheduler::new(config.clone());
    if let Some(scale) = args.stall_scale {
        let stall = BatchStall::calibrated().with_scale(scale);
        scheduler = scheduler.with_latency_hook(Arc::new(stall));
    }

    let mut rng = match config.csa.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let fleet = FleetSpec::reference();
    let demand = DemandRange::default();
    let mut sink = WriterSink::stdout();

    for &n in &args.tasks {
        println!("Running simulation for {n} tasks...");
        let scenario = Scenario::generate(n, &fleet, &demand, &mut rng);
        scheduler.schedule(&scenario, &mut sink)?;
    }
    Ok(())
}
