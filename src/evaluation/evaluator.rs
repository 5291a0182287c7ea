//! Scalar evaluation of candidate schedules.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::{EvaluationConfig, SimulationReport};
use crate::models::{NodeId, ProblemConfig, ProblemDefinition};
use crate::network::{Network, NetworkError};
use crate::rate::{HeadwayFunction, PeriodicFunction};
use crate::schedule::{ScheduleError, TimePeriodSchedule};
use crate::simulation::{self, RunSummary, SimulationError};
use crate::validation::{validate_problem, ValidationError};

/// A problem or configuration rejected before any simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// The problem definition failed validation.
    Invalid(Vec<ValidationError>),
    /// The network could not be built.
    Network(NetworkError),
    /// The configured schedule is malformed.
    Schedule(ScheduleError),
    /// A search or evaluation setting is out of range.
    Config(String),
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemError::Invalid(errors) => {
                write!(f, "invalid problem definition ({} errors)", errors.len())?;
                for err in errors {
                    write!(f, "; {err}")?;
                }
                Ok(())
            }
            ProblemError::Network(err) => write!(f, "{err}"),
            ProblemError::Schedule(err) => write!(f, "{err}"),
            ProblemError::Config(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for ProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProblemError::Network(err) => Some(err),
            ProblemError::Schedule(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetworkError> for ProblemError {
    fn from(err: NetworkError) -> Self {
        ProblemError::Network(err)
    }
}

impl From<ScheduleError> for ProblemError {
    fn from(err: ScheduleError) -> Self {
        ProblemError::Schedule(err)
    }
}

/// Outcome of simulating one schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Total waiting cost, or the infeasible cost on failure.
    pub objective: f64,
    /// Why the run failed, if it did.
    pub failure: Option<SimulationError>,
    /// Run statistics of a completed run.
    pub summary: Option<RunSummary>,
    /// Headway periods derived from the schedule.
    pub headway_functions: BTreeMap<NodeId, PeriodicFunction>,
}

impl Evaluation {
    /// Whether the run completed.
    pub fn is_feasible(&self) -> bool {
        self.failure.is_none()
    }
}

/// State left behind by one run, kept for reporting.
struct Run {
    network: Option<Network>,
    headway_functions: BTreeMap<NodeId, PeriodicFunction>,
    outcome: Result<RunSummary, SimulationError>,
}

/// Maps schedules to waiting cost by simulating them.
///
/// The network is built and validated once; every evaluation runs on its
/// own clone with freshly bound headway functions, so evaluations share
/// no mutable state and may run concurrently.
///
/// # Example
/// ```
/// use u_transit::evaluation::Evaluator;
/// use u_transit::models::{
///     DepotSpec, HeadwayConfiguration, ProblemDefinition, RouteSpec, StationSpec,
///     TimePeriodConfiguration,
/// };
/// use u_transit::schedule::TimePeriodSchedule;
///
/// let problem = ProblemDefinition::new(0, 3_600)
///     .with_station(StationSpec::new(1, "A").with_min_dwell(60).with_demand(1_800, 40))
///     .with_depot(
///         DepotSpec::new(100, "Yard")
///             .with_train(1)
///             .with_route_sequence(vec![10])
///             .with_headway_configuration(HeadwayConfiguration::new(
///                 vec![600, 900],
///                 vec![600, 600],
///                 vec![3_000, 3_000],
///             ))
///             .with_time_period_configuration(TimePeriodConfiguration::new(
///                 vec![0, 1_800, 3_600],
///                 vec![0, 600, 0],
///             )),
///     )
///     .with_route(RouteSpec::new(10, "Shuttle", 100).with_station(1))
///     .with_travel_time(100, 1, 120)
///     .with_travel_time(1, 100, 120);
///
/// let configs = problem.configurations();
/// let config = &configs[0];
/// let evaluator = Evaluator::new(&problem, config).unwrap();
/// let mut schedule = TimePeriodSchedule::from_config(config).unwrap();
///
/// let cost = evaluator.evaluate(&mut schedule);
/// assert!(cost > 0.0);
/// assert_eq!(schedule.objective(), Some(cost));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    template: Network,
    headways: BTreeMap<NodeId, Vec<i64>>,
    config: EvaluationConfig,
}

impl Evaluator {
    /// Validates `problem`, builds its network, and takes the per-depot
    /// headway sequences of `config`.
    pub fn new(problem: &ProblemDefinition, config: &ProblemConfig) -> Result<Self, ProblemError> {
        validate_problem(problem).map_err(ProblemError::Invalid)?;
        let template = Network::from_problem(problem)?;
        Ok(Self {
            template,
            headways: config.headways(),
            config: EvaluationConfig::default(),
        })
    }

    /// Replaces the evaluation settings.
    pub fn with_config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluation settings in use.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// The pristine network every run starts from.
    pub fn template(&self) -> &Network {
        &self.template
    }

    /// Simulates `schedule` without modifying it.
    ///
    /// Never fails: any run failure yields the infeasible cost and is kept
    /// in [`Evaluation::failure`].
    pub fn simulate(&self, schedule: &TimePeriodSchedule) -> Evaluation {
        let run = self.execute(schedule);
        match run.outcome {
            Ok(summary) => {
                debug!(objective = summary.total_waiting, "schedule evaluated");
                Evaluation {
                    objective: summary.total_waiting,
                    failure: None,
                    summary: Some(summary),
                    headway_functions: run.headway_functions,
                }
            }
            Err(err) => {
                debug!(error = %err, "schedule infeasible");
                Evaluation {
                    objective: self.config.infeasible_cost,
                    failure: Some(err),
                    summary: None,
                    headway_functions: run.headway_functions,
                }
            }
        }
    }

    /// Simulates `schedule` and writes the objective and headway functions
    /// onto it. Returns the objective.
    pub fn evaluate(&self, schedule: &mut TimePeriodSchedule) -> f64 {
        let evaluation = self.simulate(schedule);
        schedule.set_objective(evaluation.objective);
        schedule.set_headway_functions(evaluation.headway_functions);
        evaluation.objective
    }

    /// Simulates `schedule` and collects every log of the run.
    pub fn report(&self, schedule: &TimePeriodSchedule) -> SimulationReport {
        let run = self.execute(schedule);
        let (objective, failure) = match &run.outcome {
            Ok(summary) => (summary.total_waiting, None),
            Err(err) => (self.config.infeasible_cost, Some(err.to_string())),
        };
        let mut report = match &run.network {
            Some(network) => SimulationReport::from_network(network, objective, failure),
            None => SimulationReport::empty(objective, failure),
        };
        report.schedule = schedule.to_string();
        report
    }

    /// Headway periods per depot: the schedule's breakpoints carrying the
    /// configured headway sequence.
    pub fn headway_functions(
        &self,
        schedule: &TimePeriodSchedule,
    ) -> Result<BTreeMap<NodeId, PeriodicFunction>, NetworkError> {
        let mut functions = BTreeMap::new();
        for (&depot, periods) in schedule.depots() {
            let Some(headways) = self.headways.get(&depot) else {
                continue;
            };
            let function = PeriodicFunction::new(periods.breakpoints().to_vec(), headways.clone())
                .map_err(|source| NetworkError::Rate { depot, source })?;
            functions.insert(depot, function);
        }
        Ok(functions)
    }

    fn execute(&self, schedule: &TimePeriodSchedule) -> Run {
        let headway_functions = match self.headway_functions(schedule) {
            Ok(functions) => functions,
            Err(err) => {
                return Run {
                    network: None,
                    headway_functions: BTreeMap::new(),
                    outcome: Err(SimulationError::Setup(err)),
                }
            }
        };

        let mut network = self.template.clone();
        for (&depot, periods) in &headway_functions {
            let mut headway = HeadwayFunction::new(periods.clone());
            if let Some(step) = self.config.smoothing_step {
                headway = headway.with_smoothing(step);
            }
            if let Err(err) = network.bind_headway(depot, headway) {
                return Run {
                    network: None,
                    headway_functions,
                    outcome: Err(SimulationError::Setup(err)),
                };
            }
        }

        let outcome = if self.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| simulation::run(&mut network)))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    warn!(message = %message, "simulation panicked");
                    Err(SimulationError::Aborted(message))
                })
        } else {
            simulation::run(&mut network)
        };

        Run {
            network: Some(network),
            headway_functions,
            outcome,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::INFEASIBLE_COST;
    use crate::models::{
        DepotSpec, HeadwayConfiguration, RouteSpec, StationSpec, TimePeriodConfiguration,
    };
    use crate::network::TrainAction;
    use crate::schedule::{Bound, DepotPeriods};
    use crate::validation::ValidationErrorKind;

    fn problem(trains: u32) -> ProblemDefinition {
        let mut depot = DepotSpec::new(100, "Yard")
            .with_route_sequence(vec![10])
            .with_headway_configuration(HeadwayConfiguration::new(
                vec![600, 600],
                vec![1_200, 1_200],
                vec![2_400, 2_400],
            ))
            .with_time_period_configuration(TimePeriodConfiguration::new(
                vec![0, 1_800, 3_600],
                vec![0, 600, 0],
            ));
        for train in 1..=trains {
            depot = depot.with_train(train);
        }
        ProblemDefinition::new(0, 3_600)
            .with_station(StationSpec::new(1, "A").with_min_dwell(60))
            .with_station(StationSpec::new(2, "B").with_min_dwell(60))
            .with_depot(depot)
            .with_route(
                RouteSpec::new(10, "A-B", 100)
                    .with_stations(vec![1, 2])
                    .with_turnaround(60),
            )
            .with_travel_time(100, 1, 120)
            .with_travel_time(1, 2, 300)
            .with_travel_time(2, 100, 120)
    }

    fn setup(trains: u32) -> (Evaluator, TimePeriodSchedule) {
        let problem = problem(trains);
        let configs = problem.configurations();
        let config = &configs[0];
        let evaluator = Evaluator::new(&problem, config).unwrap();
        let schedule = TimePeriodSchedule::from_config(config).unwrap();
        (evaluator, schedule)
    }

    #[test]
    fn test_zero_demand_costs_nothing() {
        let (evaluator, mut schedule) = setup(1);
        let cost = evaluator.evaluate(&mut schedule);

        assert_eq!(cost, 0.0);
        assert_eq!(schedule.objective(), Some(0.0));
        let functions = schedule.headway_functions().unwrap();
        assert_eq!(functions[&100].values(), &[600, 600]);
    }

    #[test]
    fn test_empty_pool_is_infeasible() {
        let (evaluator, mut schedule) = setup(0);
        let evaluation = evaluator.simulate(&schedule);

        assert_eq!(evaluation.objective, INFEASIBLE_COST);
        assert!(!evaluation.is_feasible());
        assert!(matches!(
            evaluation.failure,
            Some(SimulationError::DepotExhausted { .. })
        ));

        assert_eq!(evaluator.evaluate(&mut schedule), INFEASIBLE_COST);
        assert_eq!(schedule.objective(), Some(INFEASIBLE_COST));
    }

    #[test]
    fn test_custom_infeasible_cost() {
        let (evaluator, schedule) = setup(0);
        let evaluator = evaluator.with_config(EvaluationConfig::default().with_infeasible_cost(-1.0));
        assert_eq!(evaluator.simulate(&schedule).objective, -1.0);
    }

    #[test]
    fn test_evaluations_are_independent() {
        let (evaluator, schedule) = setup(1);
        let first = evaluator.simulate(&schedule);
        let second = evaluator.simulate(&schedule);

        assert_eq!(first, second);
        assert_eq!(evaluator.template().trip_count(), 0);
        let pristine = evaluator.template().stations().by_id(1).unwrap();
        assert!(pristine.departure_times().is_empty());
    }

    #[test]
    fn test_headway_shape_mismatch_is_infeasible() {
        let (evaluator, _) = setup(1);
        let periods = DepotPeriods::new(
            100,
            vec![0, 1_200, 2_400, 3_600],
            vec![Bound::new(0, 0); 4],
            vec![Bound::new(0, 3_600); 3],
        )
        .unwrap();
        let schedule = TimePeriodSchedule::new().with_depot(100, periods);

        let evaluation = evaluator.simulate(&schedule);
        assert!(matches!(
            evaluation.failure,
            Some(SimulationError::Setup(NetworkError::Rate { depot: 100, .. }))
        ));
        assert_eq!(evaluation.objective, INFEASIBLE_COST);
    }

    #[test]
    fn test_schedule_without_depot_is_unconfigured() {
        let (evaluator, _) = setup(1);
        let evaluation = evaluator.simulate(&TimePeriodSchedule::new());
        assert!(matches!(
            evaluation.failure,
            Some(SimulationError::UnconfiguredDepot { .. })
        ));
    }

    #[test]
    fn test_invalid_problem_rejected() {
        let mut problem = problem(1);
        problem.routes[0].stations.clear();
        let configs = problem.configurations();
        let config = &configs[0];

        let Err(ProblemError::Invalid(errors)) = Evaluator::new(&problem, config) else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyRoute));
    }

    #[test]
    fn test_report_contains_logs() {
        let (evaluator, schedule) = setup(1);
        let report = evaluator.report(&schedule);

        assert_eq!(report.objective, 0.0);
        assert!(report.failure.is_none());
        assert_eq!(report.trips[0].trip, 1);
        assert_eq!(report.trips[0].route, "A-B");
        assert_eq!(
            report.trips[0].events.last().map(|e| e.action),
            Some(TrainAction::SoftArrival)
        );
        assert_eq!(report.depots[0].departures[0], 0);
        assert_eq!(report.stations.len(), 2);

        let train = &report.trains[0];
        assert_eq!(train.log.keys().copied().collect::<Vec<_>>(), train.trips);
        assert_eq!(train.log[&1].route, "A-B");
        assert_eq!(train.log[&1].events, report.trips[0].events);
        assert!(report.schedule.contains("00:30:00"));
    }

    #[test]
    fn test_report_of_failed_run() {
        let (evaluator, schedule) = setup(0);
        let report = evaluator.report(&schedule);
        assert_eq!(report.objective, INFEASIBLE_COST);
        assert!(report
            .failure
            .as_deref()
            .is_some_and(|f| f.contains("run out of trains")));
        assert!(report.trips.is_empty());
    }
}
