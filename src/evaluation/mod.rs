//! Schedule evaluation and search.
//!
//! Bridges schedules and the simulation: an [`Evaluator`] turns the
//! breakpoints of a [`TimePeriodSchedule`](crate::schedule::TimePeriodSchedule)
//! into headway functions, simulates the day on a fresh copy of the
//! network, and returns the total waiting cost. Failed runs never escape:
//! they score [`INFEASIBLE_COST`] and keep their cause in
//! [`Evaluation::failure`].
//!
//! [`optimize`] drives `u-metaheur` simulated annealing over schedules with
//! the evaluator as its cost function.

mod config;
mod evaluator;
mod report;
mod search;

pub use config::{EvaluationConfig, SearchConfig, INFEASIBLE_COST};
pub use evaluator::{Evaluation, Evaluator, ProblemError};
pub use report::{DepotReport, SimulationReport, StationReport, TrainReport, TripRecord};
pub use search::{optimize, AnnealingRun, HeadwayProblem, SearchOutcome};
