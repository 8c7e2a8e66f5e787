use std::fmt;

use rand::Rng;
use tracing::{debug, info};

use crate::bee::{Role, forage, recruit, scout};
use crate::colony::{Colony, check_fraction};
use crate::distance::DistanceTable;
use crate::error::{Result, TspError};

#[derive(Debug, Clone, PartialEq)]
pub struct AbcParams {
    pub population: usize,
    pub onlooker_fraction: f64,
    pub forager_fraction: f64,
    pub scout_fraction: f64, // Share of the population turned scout each cycle
    pub stagnation_limit: usize,
    pub cycle_limit: usize,
    pub report_every: usize, // 0 disables progress logging
}

impl Default for AbcParams {
    fn default() -> Self {
        AbcParams {
            population: 180,
            onlooker_fraction: 0.5,
            forager_fraction: 0.5,
            scout_fraction: 0.2,
            stagnation_limit: 500,
            cycle_limit: 2500,
            report_every: 1000,
        }
    }
}

impl AbcParams {
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    pub fn with_role_fractions(mut self, onlooker_fraction: f64, forager_fraction: f64) -> Self {
        self.onlooker_fraction = onlooker_fraction;
        self.forager_fraction = forager_fraction;
        self
    }

    pub fn with_scout_fraction(mut self, scout_fraction: f64) -> Self {
        self.scout_fraction = scout_fraction;
        self
    }

    pub fn with_stagnation_limit(mut self, stagnation_limit: usize) -> Self {
        self.stagnation_limit = stagnation_limit;
        self
    }

    pub fn with_cycle_limit(mut self, cycle_limit: usize) -> Self {
        self.cycle_limit = cycle_limit;
        self
    }

    pub fn with_report_every(mut self, report_every: usize) -> Self {
        self.report_every = report_every;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(TspError::config("population", self.population, "must be positive"));
        }
        if self.cycle_limit == 0 {
            return Err(TspError::config("cycle_limit", self.cycle_limit, "must be positive"));
        }
        if self.stagnation_limit == 0 {
            return Err(TspError::config(
                "stagnation_limit",
                self.stagnation_limit,
                "must be positive",
            ));
        }
        check_fraction("onlooker_fraction", self.onlooker_fraction)?;
        check_fraction("forager_fraction", self.forager_fraction)?;
        check_fraction("scout_fraction", self.scout_fraction)?;
        let total = self.onlooker_fraction + self.forager_fraction;
        if total > 1.0 + f64::EPSILON {
            return Err(TspError::config(
                "onlooker_fraction + forager_fraction",
                total,
                "role fractions must not sum to more than 1",
            ));
        }
        Ok(())
    }

    /// Number of worst foragers reassigned to scouting per cycle: `ceil(population * scout_fraction)`.
    pub fn scout_quota(&self) -> usize {
        ((self.population as f64 * self.scout_fraction).ceil() as usize).min(self.population)
    }
}

/// Where an improvement of the best tour came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Forager,
    Recruit,
}

impl Source {
    pub fn code(&self) -> char {
        match self {
            Source::Forager => 'F',
            Source::Recruit => 'R',
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Best tour seen so far. Its length only ever decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct BestSolution {
    pub tour: Vec<usize>,
    pub length: f64,
}

impl Default for BestSolution {
    fn default() -> Self {
        BestSolution {
            tour: Vec::new(),
            length: f64::INFINITY,
        }
    }
}

impl BestSolution {
    pub fn is_empty(&self) -> bool {
        self.tour.is_empty()
    }

    /// Takes `tour` if it is strictly shorter than the current best.
    pub fn offer(&mut self, length: f64, tour: &[usize]) -> bool {
        if length < self.length {
            self.length = length;
            self.tour = tour.to_vec();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub cycle: usize,
    pub bee_index: usize,
    pub source: Source,
    pub tour: Vec<usize>,
    pub length: f64,
}

/// Mutable state of one optimization run.
#[derive(Debug, Clone)]
pub struct Hive {
    pub colony: Colony,
    pub best: BestSolution,
    pub cycles_run: usize,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub best: BestSolution,
    pub history: Vec<Improvement>,
    pub cycles_run: usize,
    /// Shortest forager tour right after role assignment.
    pub initial_best_length: Option<f64>,
    pub stopped_early: bool,
}

impl RunReport {
    pub fn last_improvement(&self) -> Option<&Improvement> {
        self.history.last()
    }
}

type StopCondition<'a> = Box<dyn Fn(&BestSolution) -> bool + Send + Sync + 'a>;

/// Drives forage, scout and recruit cycles over a colony.
pub struct Engine<'a> {
    table: &'a DistanceTable,
    params: AbcParams,
    stop_condition: Option<StopCondition<'a>>,
}

impl<'a> Engine<'a> {
    pub fn new(table: &'a DistanceTable, params: AbcParams) -> Result<Self> {
        params.validate()?;
        Ok(Engine {
            table,
            params,
            stop_condition: None,
        })
    }

    /// Ends the run after the first cycle whose best solution satisfies `condition`.
    pub fn with_stop_condition(
        mut self,
        condition: impl Fn(&BestSolution) -> bool + Send + Sync + 'a,
    ) -> Self {
        self.stop_condition = Some(Box::new(condition));
        self
    }

    pub fn with_target_length(self, target: f64) -> Result<Self> {
        if !target.is_finite() {
            return Err(TspError::config("target_length", target, "must be finite"));
        }
        Ok(self.with_stop_condition(move |best| best.length <= target))
    }

    pub fn init_hive<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Hive> {
        let mut colony = Colony::initialize(self.params.population, self.table, rng)?;
        colony.assign_roles(
            self.params.onlooker_fraction,
            self.params.forager_fraction,
            self.table,
            rng,
        )?;
        Ok(Hive {
            colony,
            best: BestSolution::default(),
            cycles_run: 0,
        })
    }

    /// Runs one waggle-dance round and returns the improvements it made to the best tour.
    pub fn run_cycle<R: Rng + ?Sized>(&self, hive: &mut Hive, rng: &mut R) -> Vec<Improvement> {
        let Hive {
            colony,
            best,
            cycles_run,
        } = hive;
        let cycle = *cycles_run + 1;
        let bees = colony.bees_mut();
        let mut improvements = Vec::new();

        // Forage / scout pass
        let mut results: Vec<(usize, f64)> = Vec::new();
        for (idx, bee) in bees.iter_mut().enumerate() {
            match bee.role() {
                Role::Forager => {
                    let (length, _) =
                        forage(bee, self.table, self.params.stagnation_limit, rng);
                    results.push((idx, length));
                }
                Role::Scout => scout(bee, self.table, rng),
                Role::Onlooker => {}
            }
        }

        let cycle_best = results
            .iter()
            .copied()
            .fold(None, |acc: Option<(usize, f64)>, (idx, length)| match acc {
                Some((_, l)) if l <= length => acc,
                _ => Some((idx, length)),
            });

        // Worst foragers scout next cycle; stable sort keeps population order on ties.
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        for &(idx, _) in results.iter().take(self.params.scout_quota()) {
            bees[idx].set_role(Role::Scout);
        }

        if let Some((idx, length)) = cycle_best {
            if best.offer(length, bees[idx].tour()) {
                info!(cycle, bee = idx, length, source = %Source::Forager, "new best tour");
                improvements.push(Improvement {
                    cycle,
                    bee_index: idx,
                    source: Source::Forager,
                    tour: best.tour.clone(),
                    length: best.length,
                });
            }
        }

        // Recruit pass
        let mut recruit_best: Option<usize> = None;
        for (idx, bee) in bees.iter_mut().enumerate() {
            match bee.role() {
                Role::Onlooker => {
                    if let Some((length, tour)) = recruit(bee, &best.tour, self.table, rng) {
                        if best.offer(length, tour) {
                            recruit_best = Some(idx);
                        }
                    }
                }
                Role::Forager | Role::Scout => {}
            }
        }
        if let Some(idx) = recruit_best {
            info!(cycle, bee = idx, length = best.length, source = %Source::Recruit, "new best tour");
            improvements.push(Improvement {
                cycle,
                bee_index: idx,
                source: Source::Recruit,
                tour: best.tour.clone(),
                length: best.length,
            });
        }

        *cycles_run = cycle;
        improvements
    }

    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunReport> {
        let mut hive = self.init_hive(rng)?;
        let initial_best_length = hive
            .colony
            .bees()
            .iter()
            .filter(|b| b.role() == Role::Forager)
            .map(|b| b.length())
            .reduce(f64::min);

        info!(
            nodes = self.table.dimension(),
            population = self.params.population,
            cycles = self.params.cycle_limit,
            "starting bee colony run"
        );

        let mut history = Vec::new();
        let mut stopped_early = false;
        while hive.cycles_run < self.params.cycle_limit {
            let mut improvements = self.run_cycle(&mut hive, rng);
            history.append(&mut improvements);

            if self.params.report_every > 0 && hive.cycles_run % self.params.report_every == 0 {
                debug!(cycle = hive.cycles_run, best = hive.best.length, "progress");
            }
            if let Some(condition) = &self.stop_condition {
                if condition(&hive.best) {
                    stopped_early = true;
                    break;
                }
            }
        }

        info!(
            cycles = hive.cycles_run,
            best = hive.best.length,
            stopped_early,
            "bee colony run finished"
        );

        Ok(RunReport {
            best: hive.best,
            history,
            cycles_run: hive.cycles_run,
            initial_best_length,
            stopped_early,
        })
    }
}
