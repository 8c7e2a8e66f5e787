pub mod bee;
pub mod colony;
pub mod config;
pub mod distance;
pub mod error;
pub mod generator;
pub mod parser;
pub mod results;
pub mod solver;
pub mod utils;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{info, warn};

pub use bee::{Bee, Role};
pub use colony::Colony;
pub use config::{Command, Config, GenerateConfig, Invocation};
pub use distance::DistanceTable;
pub use error::{Result, TspError};
pub use parser::Node;
pub use results::{CsvResultSink, MemorySink, ResultRecord, ResultSink};
pub use solver::{AbcParams, BestSolution, Engine, Improvement, RunReport, Source};

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: usize,
    pub seed: u64,
    pub report: RunReport,
}

/// Runs `trials` independent engines in parallel over one shared distance table.
///
/// Trial `k` draws from a `StdRng` seeded with `base_seed + k`, so a given seed
/// reproduces every trial regardless of thread scheduling. Outcomes come back in
/// trial order.
pub fn solve_trials(
    table: &DistanceTable,
    params: &AbcParams,
    trials: usize,
    base_seed: u64,
    target_length: Option<f64>,
) -> Result<Vec<TrialOutcome>> {
    if trials == 0 {
        return Err(TspError::config("trials", trials, "must be positive"));
    }
    let mut engine = Engine::new(table, params.clone())?;
    if let Some(target) = target_length {
        engine = engine.with_target_length(target)?;
    }

    (0..trials)
        .into_par_iter()
        .map(|trial| -> Result<TrialOutcome> {
            let seed = base_seed.wrapping_add(trial as u64);
            let mut rng = StdRng::seed_from_u64(seed);
            let report = engine.run(&mut rng)?;
            Ok(TrialOutcome {
                trial,
                seed,
                report,
            })
        })
        .collect()
}

/// Trial with the shortest best tour; the lowest trial index wins ties.
pub fn best_trial(outcomes: &[TrialOutcome]) -> Option<&TrialOutcome> {
    outcomes
        .iter()
        .filter(|o| !o.report.best.is_empty())
        .fold(None, |best: Option<&TrialOutcome>, o| match best {
            Some(b) if b.report.best.length <= o.report.best.length => best,
            _ => Some(o),
        })
}

pub fn run(command: &Command) -> Result<()> {
    match command {
        Command::Solve(config) => run_solve(config),
        Command::Generate(config) => run_generate(config),
    }
}

fn run_solve(config: &Config) -> Result<()> {
    config.validate()?;

    let nodes = parser::parse_node_file(&config.file_path)?;
    let table = DistanceTable::build(&nodes)?;
    let name = utils::instance_name(&config.file_path);
    info!(instance = %name, nodes = nodes.len(), "loaded instance");

    let references = match &config.optimal_file {
        Some(path) => Some(utils::load_reference_lengths(path)?),
        None => None,
    };
    let reference = references
        .as_ref()
        .and_then(|r| r.get(&name).copied());

    let target_length = if config.stop_at_optimal {
        let Some(reference) = reference else {
            return Err(TspError::config(
                "stop-at-optimal",
                &name,
                "no reference length for this instance",
            ));
        };
        Some(reference)
    } else {
        config.target_length
    };

    let base_seed = config.seed.unwrap_or_else(rand::random);
    info!(seed = base_seed, trials = config.trials, "solving");

    let outcomes = solve_trials(
        &table,
        &config.params,
        config.trials,
        base_seed,
        target_length,
    )?;

    if let Some(path) = &config.output {
        let mut sink = CsvResultSink::append(path, config.summary_only)?;
        record_outcomes(&mut sink, &outcomes, &nodes)?;
    }

    for outcome in &outcomes {
        println!(
            "Trial {} (seed {}): best length {:.3} after {} cycles",
            outcome.trial, outcome.seed, outcome.report.best.length, outcome.report.cycles_run
        );
    }

    let Some(best) = best_trial(&outcomes) else {
        warn!("no trial produced a tour; the colony needs foragers or scouts");
        return Ok(());
    };
    let ids: Vec<usize> = best.report.best.tour.iter().map(|&idx| nodes[idx].id).collect();
    println!("Best tour: {:?}", ids);
    println!("Best tour length: {:.3}", best.report.best.length);
    if let Some(references) = &references {
        match utils::evaluate_solution(&name, best.report.best.length, references) {
            Some((reference, gap)) => {
                println!("Reference length: {:.3} (gap {:.2}%)", reference, gap)
            }
            None => warn!(instance = %name, "no reference length for instance"),
        }
    }
    Ok(())
}

/// Feeds every trial's improvements and final best to `sink`, in trial order.
pub fn record_outcomes(
    sink: &mut dyn ResultSink,
    outcomes: &[TrialOutcome],
    nodes: &[Node],
) -> Result<()> {
    for outcome in outcomes {
        for improvement in &outcome.report.history {
            sink.record_improvement(&ResultRecord::from_improvement(improvement, nodes))?;
        }
        match outcome.report.last_improvement() {
            Some(last) => sink.record_summary(&ResultRecord::from_improvement(last, nodes))?,
            None => warn!(trial = outcome.trial, "trial finished without a tour"),
        }
    }
    sink.finish()
}

fn run_generate(config: &GenerateConfig) -> Result<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let nodes = generator::generate_nodes(config.nodes, config.x_max, config.y_max, &mut rng)?;
    generator::write_node_file(&config.file_path, &nodes)?;
    info!(
        path = %config.file_path.display(),
        nodes = nodes.len(),
        "wrote random instance"
    );
    Ok(())
}
