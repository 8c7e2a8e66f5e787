use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::error::{Result, TspError};
use crate::solver::AbcParams;

#[derive(Debug, Clone)]
pub struct Config {
    pub file_path: PathBuf,
    pub params: AbcParams,
    pub trials: usize,
    pub seed: Option<u64>,
    pub target_length: Option<f64>,
    pub optimal_file: Option<PathBuf>, // Reference lengths, `name: length` per line
    pub stop_at_optimal: bool,
    pub output: Option<PathBuf>,
    pub summary_only: bool, // Skip per-improvement rows in `output`
}

impl Config {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Config {
            file_path: file_path.into(),
            params: AbcParams::default(),
            trials: 1,
            seed: None,
            target_length: None,
            optimal_file: None,
            stop_at_optimal: false,
            output: None,
            summary_only: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if self.trials == 0 {
            return Err(TspError::config("trials", self.trials, "must be positive"));
        }
        if let Some(target) = self.target_length {
            if !target.is_finite() {
                return Err(TspError::config("target", target, "must be finite"));
            }
        }
        if self.stop_at_optimal && self.target_length.is_some() {
            return Err(TspError::config(
                "stop-at-optimal",
                true,
                "cannot be combined with --target",
            ));
        }
        if self.stop_at_optimal && self.optimal_file.is_none() {
            return Err(TspError::config(
                "stop-at-optimal",
                true,
                "requires --optimal <FILE>",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub file_path: PathBuf,
    pub nodes: usize,
    pub x_max: u32,
    pub y_max: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Solve(Config),
    Generate(GenerateConfig),
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub log_level: Level,
    pub command: Command,
}

impl Invocation {
    /// Parses a full argument list, program name first.
    pub fn build<I, T>(args: I) -> std::result::Result<Invocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        let log_level = if cli.verbose {
            Level::DEBUG
        } else if cli.quiet {
            Level::WARN
        } else {
            Level::INFO
        };
        let command = match cli.command {
            CliCommand::Solve(args) => Command::Solve(args.into()),
            CliCommand::Generate(args) => Command::Generate(args.into()),
        };
        Ok(Invocation { log_level, command })
    }
}

#[derive(Parser, Debug)]
#[command(name = "bee-tsp", version)]
#[command(about = "Artificial bee colony heuristic for the Euclidean travelling salesman problem", long_about = None)]
struct Cli {
    /// Log progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Search for a short tour through the nodes of a node file
    Solve(SolveArgs),
    /// Write a random planar instance as a node file
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Node file with `id,x,y` lines
    #[arg(value_name = "FILE")]
    file_path: PathBuf,

    /// Number of bees
    #[arg(short = 'n', long, default_value_t = 180)]
    population: usize,

    /// Share of the colony recruited as onlookers
    #[arg(long, default_value_t = 0.5)]
    onlookers: f64,

    /// Share of the colony working as foragers
    #[arg(long, default_value_t = 0.5)]
    foragers: f64,

    /// Share of the colony sent scouting at the end of every cycle
    #[arg(long, default_value_t = 0.2)]
    scouts: f64,

    /// Rejected forage steps before a forager abandons its tour
    #[arg(short = 'l', long, default_value_t = 500)]
    stagnation_limit: usize,

    /// Number of cycles per trial
    #[arg(short = 'c', long, default_value_t = 2500)]
    cycles: usize,

    /// Independent trials, run in parallel
    #[arg(short = 't', long, default_value_t = 1)]
    trials: usize,

    /// Base random seed; trial `k` uses `seed + k`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop a trial once its best tour is this short
    #[arg(long, value_name = "LENGTH")]
    target: Option<f64>,

    /// Reference lengths file (`name: length` per line)
    #[arg(long, value_name = "FILE")]
    optimal: Option<PathBuf>,

    /// Use the reference length as the stopping target
    #[arg(long, conflicts_with = "target")]
    stop_at_optimal: bool,

    /// Append result rows to this CSV file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write only the final best of each trial, not every improvement
    #[arg(long)]
    summary_only: bool,

    /// Log progress every N cycles (0 disables)
    #[arg(long, default_value_t = 1000)]
    report_every: usize,
}

impl From<SolveArgs> for Config {
    fn from(args: SolveArgs) -> Self {
        let params = AbcParams::default()
            .with_population(args.population)
            .with_role_fractions(args.onlookers, args.foragers)
            .with_scout_fraction(args.scouts)
            .with_stagnation_limit(args.stagnation_limit)
            .with_cycle_limit(args.cycles)
            .with_report_every(args.report_every);
        Config {
            file_path: args.file_path,
            params,
            trials: args.trials,
            seed: args.seed,
            target_length: args.target,
            optimal_file: args.optimal,
            stop_at_optimal: args.stop_at_optimal,
            output: args.output,
            summary_only: args.summary_only,
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Node file to write
    #[arg(value_name = "FILE")]
    file_path: PathBuf,

    /// Number of nodes
    #[arg(short, long, default_value_t = 10)]
    nodes: usize,

    /// Largest x coordinate
    #[arg(long, default_value_t = 100)]
    x_max: u32,

    /// Largest y coordinate
    #[arg(long, default_value_t = 100)]
    y_max: u32,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,
}

impl From<GenerateArgs> for GenerateConfig {
    fn from(args: GenerateArgs) -> Self {
        GenerateConfig {
            file_path: args.file_path,
            nodes: args.nodes,
            x_max: args.x_max,
            y_max: args.y_max,
            seed: args.seed,
        }
    }
}
