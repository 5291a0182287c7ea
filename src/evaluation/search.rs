//! Annealing search over headway-period breakpoints.
//!
//! Every annealing run explores the schedule space from the configured
//! breakpoints, using all-slot mutation at its own probability. Runs are
//! independent and share only the read-only [`Evaluator`], so they run on
//! the rayon pool without synchronization; only the final reduction to the
//! cheapest schedule is sequential.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use rand::Rng;
use rayon::prelude::*;
use tracing::info;
use u_metaheur::sa::{SaProblem, SaResult, SaRunner};

use super::{Evaluator, ProblemError, SearchConfig};
use crate::schedule::{ScheduleMutation, TimePeriodSchedule};

/// Breakpoint search as an annealing problem.
pub struct HeadwayProblem<'a> {
    evaluator: &'a Evaluator,
    initial: TimePeriodSchedule,
    start: ScheduleMutation,
    neighbour: ScheduleMutation,
}

impl<'a> HeadwayProblem<'a> {
    /// Searches around `initial`, with all-slot neighbour moves at
    /// `probability`.
    pub fn new(evaluator: &'a Evaluator, initial: TimePeriodSchedule, probability: f64) -> Self {
        Self {
            evaluator,
            initial,
            start: ScheduleMutation::single_slot(),
            neighbour: ScheduleMutation::all_slots(probability),
        }
    }

    /// Truncates every move to multiples of `seconds`.
    pub fn with_time_quantum(mut self, seconds: i64) -> Self {
        self.start = self.start.with_time_quantum(seconds);
        self.neighbour = self.neighbour.with_time_quantum(seconds);
        self
    }

    /// The configured breakpoints the search starts from.
    pub fn initial(&self) -> &TimePeriodSchedule {
        &self.initial
    }
}

impl SaProblem for HeadwayProblem<'_> {
    type Solution = TimePeriodSchedule;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> TimePeriodSchedule {
        let mut schedule = self.initial.clone();
        self.start.apply(&mut schedule, rng);
        schedule
    }

    fn cost(&self, solution: &TimePeriodSchedule) -> f64 {
        match solution.objective() {
            Some(objective) => objective,
            None => self.evaluator.simulate(solution).objective,
        }
    }

    fn neighbor<R: Rng>(&self, solution: &TimePeriodSchedule, rng: &mut R) -> TimePeriodSchedule {
        let mut next = solution.clone();
        self.neighbour.apply(&mut next, rng);
        next
    }
}

/// Statistics of one annealing run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingRun {
    /// All-slot mutation probability of the run.
    pub probability: f64,
    pub best_cost: f64,
    pub iterations: usize,
    pub accepted_moves: usize,
    /// Whether the time limit stopped the run.
    pub cancelled: bool,
}

/// Result of [`optimize`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Cheapest schedule found, with objective and headway functions set.
    pub best: TimePeriodSchedule,
    pub best_cost: f64,
    /// One entry per configured probability, in configuration order.
    pub runs: Vec<AnnealingRun>,
}

/// Searches for the breakpoints with the least waiting cost.
///
/// Runs one annealing run per probability of `config`. With a base seed,
/// run `i` is seeded with `seed + i` and the search is reproducible.
///
/// # Errors
/// Returns [`ProblemError::Config`] if `config` fails validation.
///
/// # Example
/// ```no_run
/// use u_transit::evaluation::{optimize, Evaluator, SearchConfig};
/// use u_transit::models::ProblemDefinition;
/// use u_transit::schedule::TimePeriodSchedule;
///
/// # fn load() -> ProblemDefinition { unimplemented!() }
/// let problem = load();
/// let configs = problem.configurations();
/// let config = &configs[0];
/// let evaluator = Evaluator::new(&problem, config).unwrap();
/// let initial = TimePeriodSchedule::from_config(config).unwrap();
///
/// let outcome = optimize(&evaluator, &initial, &SearchConfig::default()).unwrap();
/// println!("{} -> {}", outcome.best, outcome.best_cost);
/// ```
pub fn optimize(
    evaluator: &Evaluator,
    initial: &TimePeriodSchedule,
    config: &SearchConfig,
) -> Result<SearchOutcome, ProblemError> {
    config.validate().map_err(ProblemError::Config)?;
    evaluator.config().validate().map_err(ProblemError::Config)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let timer = config.time_limit.map(|limit| {
        let (done, stop) = mpsc::channel::<()>();
        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = stop.recv_timeout(limit) {
                flag.store(true, Ordering::Relaxed);
            }
        });
        (done, handle)
    });

    let run = |(i, &probability): (usize, &f64)| {
        let mut annealing = config.annealing.clone();
        if let Some(seed) = config.seed {
            annealing = annealing.with_seed(seed.wrapping_add(i as u64));
        }
        let problem = HeadwayProblem::new(evaluator, initial.clone(), probability)
            .with_time_quantum(config.time_quantum);
        let result = SaRunner::run_with_cancel(&problem, &annealing, Some(Arc::clone(&cancel)));
        info!(
            probability,
            best_cost = result.best_cost,
            iterations = result.iterations,
            accepted = result.accepted_moves,
            cancelled = result.cancelled,
            "annealing run finished"
        );
        (probability, result)
    };

    let results: Vec<(f64, SaResult<TimePeriodSchedule>)> = if config.parallel {
        config.probabilities.par_iter().enumerate().map(run).collect()
    } else {
        config.probabilities.iter().enumerate().map(run).collect()
    };

    if let Some((done, handle)) = timer {
        drop(done);
        let _ = handle.join();
    }

    let runs = results
        .iter()
        .map(|(probability, result)| AnnealingRun {
            probability: *probability,
            best_cost: result.best_cost,
            iterations: result.iterations,
            accepted_moves: result.accepted_moves,
            cancelled: result.cancelled,
        })
        .collect();

    let mut best = results
        .into_iter()
        .map(|(_, result)| result)
        .min_by(|a, b| a.best_cost.total_cmp(&b.best_cost))
        .map(|result| result.best)
        .ok_or_else(|| ProblemError::Config("no annealing runs".into()))?;

    let best_cost = evaluator.evaluate(&mut best);
    info!(best_cost, schedule = %best, "search finished");

    Ok(SearchOutcome {
        best,
        best_cost,
        runs,
    })
}
