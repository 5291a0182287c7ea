//! The virtual-time run loop.

use tracing::debug;

use super::{Agenda, Context, DepotProcess, MissingBinding, Process, SimulationError, Step};
use crate::network::Network;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Total passenger waiting, person-seconds.
    pub total_waiting: f64,
    /// Time of the last processed wake-up.
    pub last_event_time: i64,
    /// Number of process resumes.
    pub resumes: usize,
    /// Trips dispatched over all depots.
    pub trips: u64,
}

/// Drives the depot and train processes of one network.
///
/// Wake-ups at or after the network's day end are left unprocessed.
///
/// # Example
/// ```
/// use u_transit::models::{DepotSpec, ProblemDefinition, RouteSpec, StationSpec};
/// use u_transit::network::Network;
/// use u_transit::rate::{HeadwayFunction, PeriodicFunction};
/// use u_transit::simulation::Simulation;
///
/// let problem = ProblemDefinition::new(0, 3_600)
///     .with_station(StationSpec::new(1, "A").with_min_dwell(60))
///     .with_depot(DepotSpec::new(100, "Yard").with_train(1).with_route_sequence(vec![10]))
///     .with_route(RouteSpec::new(10, "A", 100).with_station(1))
///     .with_travel_time(100, 1, 120)
///     .with_travel_time(1, 100, 120);
///
/// let mut network = Network::from_problem(&problem).unwrap();
/// let headway = HeadwayFunction::new(PeriodicFunction::constant(0, 3_600, 600));
/// network.bind_headway(100, headway).unwrap();
///
/// let summary = Simulation::new(&mut network).run().unwrap();
/// assert_eq!(summary.total_waiting, 0.0);
/// assert!(summary.trips > 1);
/// ```
pub struct Simulation<'a> {
    network: &'a mut Network,
    agenda: Agenda,
    processes: Vec<Option<Process>>,
    now: i64,
}

impl<'a> Simulation<'a> {
    /// Prepares a run over `network`.
    pub fn new(network: &'a mut Network) -> Self {
        Self {
            network,
            agenda: Agenda::new(),
            processes: Vec::new(),
            now: 0,
        }
    }

    /// Runs from time `0` to the day end.
    ///
    /// Every depot must have a headway function and a route sequence;
    /// smoothing state is reset before the first dispatch.
    pub fn run(mut self) -> Result<RunSummary, SimulationError> {
        self.check_bindings()?;
        for depot in self.network.depots_mut() {
            if let Some(headway) = depot.headway.as_mut() {
                headway.reset();
            }
        }

        let starts: Vec<_> = self
            .network
            .depots()
            .iter()
            .map(|(idx, depot)| (idx, depot.first_launch_at()))
            .collect();
        for (idx, first_launch_at) in starts {
            self.start(Process::Depot(DepotProcess::new(idx)), first_launch_at);
        }

        let day_end = self.network.day_end();
        let mut resumes = 0;
        while let Some((time, slot)) = self.agenda.pop() {
            if time >= day_end {
                break;
            }
            self.now = time;
            resumes += 1;
            self.resume(slot)?;
        }

        let summary = RunSummary {
            total_waiting: self.network.total_waiting(),
            last_event_time: self.now,
            resumes,
            trips: self.network.trip_count(),
        };
        debug!(
            total_waiting = summary.total_waiting,
            resumes = summary.resumes,
            trips = summary.trips,
            "simulation finished"
        );
        Ok(summary)
    }

    fn check_bindings(&self) -> Result<(), SimulationError> {
        for (_, depot) in self.network.depots().iter() {
            let missing = if depot.headway().is_none() {
                MissingBinding::Headway
            } else if depot.route_sequence().is_none() {
                MissingBinding::RouteSequence
            } else {
                continue;
            };
            return Err(SimulationError::UnconfiguredDepot {
                depot: depot.name().to_string(),
                missing,
            });
        }
        Ok(())
    }

    fn start(&mut self, process: Process, at: i64) {
        let slot = self.processes.len();
        self.processes.push(Some(process));
        self.agenda.schedule(at, slot);
    }

    fn resume(&mut self, slot: usize) -> Result<(), SimulationError> {
        let Some(mut process) = self.processes.get_mut(slot).and_then(Option::take) else {
            return Ok(());
        };

        let mut ctx = Context::new(self.now, self.network);
        let step = process.resume(&mut ctx)?;
        let spawned = ctx.take_spawned();

        for child in spawned {
            self.start(child, self.now);
        }
        match step {
            Step::Sleep(delay) if delay < 0 => {
                return Err(SimulationError::NegativeDelay {
                    time: self.now,
                    delay,
                })
            }
            Step::Sleep(delay) => {
                self.processes[slot] = Some(process);
                self.agenda.schedule(self.now + delay, slot);
            }
            Step::Finished => {}
        }
        Ok(())
    }
}

/// Runs `network` to the end of its day.
pub fn run(network: &mut Network) -> Result<RunSummary, SimulationError> {
    Simulation::new(network).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DemandSlot, DepotKind, DepotSpec, ProblemDefinition, RouteSpec, StationSpec};
    use crate::network::{TrainAction, TrainEvent};
    use crate::rate::{HeadwayFunction, PeriodicFunction};

    const DAY_END: i64 = 3_600;

    fn two_stations(demand_at_a: Option<DemandSlot>) -> ProblemDefinition {
        let mut a = StationSpec::new(1, "A").with_min_dwell(60);
        if let Some(slot) = demand_at_a {
            a = a.with_demand(slot.time, slot.passengers);
        }
        ProblemDefinition::new(0, DAY_END)
            .with_station(a)
            .with_station(StationSpec::new(2, "B").with_min_dwell(60))
            .with_depot(
                DepotSpec::new(100, "Yard")
                    .with_train(1)
                    .with_route_sequence(vec![10]),
            )
            .with_route(
                RouteSpec::new(10, "A-B", 100)
                    .with_stations(vec![1, 2])
                    .with_turnaround(60),
            )
            .with_travel_time(100, 1, 120)
            .with_travel_time(1, 2, 300)
            .with_travel_time(2, 100, 120)
    }

    fn network_with_headway(problem: &ProblemDefinition, headway: i64) -> Network {
        let mut network = Network::from_problem(problem).unwrap();
        for depot in &problem.depots {
            let periods = PeriodicFunction::constant(0, DAY_END, headway);
            network
                .bind_headway(depot.id, HeadwayFunction::new(periods))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_single_train_round_trips_without_cost() {
        let problem = two_stations(None);
        let mut network = network_with_headway(&problem, 600);

        let summary = run(&mut network).unwrap();
        assert_eq!(summary.total_waiting, 0.0);
        // Dispatches at 0, 720, 1320, 1920, 2520 and 3120
        assert_eq!(summary.trips, 6);

        let train = network.trains().by_id(1).unwrap();
        let trip = &train.log()[&1];
        assert_eq!(trip.route, "A-B");
        assert_eq!(
            trip.events,
            vec![
                TrainEvent::new(0, "Yard", TrainAction::Departure),
                TrainEvent::new(120, "A", TrainAction::Arrival),
                TrainEvent::new(180, "A", TrainAction::Departure),
                TrainEvent::new(480, "B", TrainAction::Arrival),
                TrainEvent::new(540, "B", TrainAction::Departure),
                TrainEvent::new(660, "Yard", TrainAction::SoftArrival),
            ]
        );

        // Later trips skip depot-out running
        assert_eq!(train.log()[&2].events[1], TrainEvent::new(720, "A", TrainAction::Arrival));

        let depot = network.depots().by_id(100).unwrap();
        assert_eq!(depot.departure_times(), &[0, 720, 1_320, 1_920, 2_520, 3_120]);
        assert_eq!(depot.initial_train_count(), 1);
        let a = network.stations().by_id(1).unwrap();
        assert_eq!(a.departure_times(), &[180, 780, 1_380, 1_980, 2_580, 3_180]);
    }

    #[test]
    fn test_waiting_cost_trapezoid() {
        // 60 passengers arriving uniformly over [0, 1800)
        let problem = two_stations(Some(DemandSlot::new(1_800, 60)));
        let mut network = network_with_headway(&problem, 600);

        let summary = run(&mut network).unwrap();
        // Departures from A at 180, 780, 1380, 1980: A(t) = t / 30 up to 1800
        let expected = 180.0 * 6.0 / 2.0 + 600.0 * 20.0 / 2.0 + 600.0 * 20.0 / 2.0 + 600.0 * 14.0 / 2.0;
        assert!((summary.total_waiting - expected).abs() < 1e-6);
        assert_eq!(network.stations().by_id(2).unwrap().accumulated_waiting(), 0.0);
    }

    #[test]
    fn test_empty_pool_exhausts_depot() {
        let mut problem = two_stations(None);
        problem.depots[0].stationed_trains.clear();
        let mut network = network_with_headway(&problem, 600);

        let err = run(&mut network).unwrap_err();
        assert_eq!(
            err,
            SimulationError::DepotExhausted {
                depot: "Yard".into(),
                time: 0
            }
        );
    }

    #[test]
    fn test_short_headway_exhausts_depot() {
        let problem = two_stations(None);
        let mut network = network_with_headway(&problem, 300);

        // Second dispatch due at 120 + 300, train is back only at 660
        let err = run(&mut network).unwrap_err();
        assert_eq!(
            err,
            SimulationError::DepotExhausted {
                depot: "Yard".into(),
                time: 420
            }
        );
    }

    #[test]
    fn test_unconfigured_depot() {
        let problem = two_stations(None);
        let mut network = Network::from_problem(&problem).unwrap();

        let err = run(&mut network).unwrap_err();
        assert_eq!(
            err,
            SimulationError::UnconfiguredDepot {
                depot: "Yard".into(),
                missing: MissingBinding::Headway
            }
        );
        assert_eq!(network.trip_count(), 0);
    }

    #[test]
    fn test_headway_outside_periods() {
        let problem = two_stations(None);
        let mut network = Network::from_problem(&problem).unwrap();
        let periods = PeriodicFunction::constant(0, 600, 600);
        network
            .bind_headway(100, HeadwayFunction::new(periods))
            .unwrap();

        let err = run(&mut network).unwrap_err();
        assert!(matches!(err, SimulationError::UndefinedPeriod(e) if e.time == 720));
    }

    #[test]
    fn test_missing_travel_time_between_stations() {
        let mut problem = two_stations(None);
        problem.travel_times.retain(|leg| (leg.from, leg.to) != (1, 2));
        let mut network = network_with_headway(&problem, 600);

        let err = run(&mut network).unwrap_err();
        assert!(matches!(err, SimulationError::NoTravelTime(e) if e.from == 1 && e.to == 2));
        // The departure is not logged when the next leg is unknown
        let train = network.trains().by_id(1).unwrap();
        assert_eq!(
            train.trip_actions(1),
            vec![TrainAction::Departure, TrainAction::Arrival]
        );
    }

    #[test]
    fn test_negative_headway() {
        let problem = two_stations(None);
        let mut network = network_with_headway(&problem, -5);

        let err = run(&mut network).unwrap_err();
        assert_eq!(
            err,
            SimulationError::NegativeDelay {
                time: 120,
                delay: -5
            }
        );
    }

    #[test]
    fn test_launch_and_forget_stops_when_empty() {
        let mut problem = two_stations(None)
            .with_depot(DepotSpec::new(200, "Sink"))
            .with_travel_time(2, 200, 90);
        problem.depots[0].kind = DepotKind::LaunchAndForget;
        problem.routes[0].circulating_depot = 200;
        let mut network = network_with_headway(&problem, 600);

        let summary = run(&mut network).unwrap();
        assert_eq!(summary.trips, 1);

        let sink = network.depots().by_id(200).unwrap();
        assert_eq!(sink.pool().len(), 1);
        let train = network.trains().by_id(1).unwrap();
        let last = train.trip_events(1).and_then(|e| e.last()).cloned();
        assert_eq!(last, Some(TrainEvent::new(630, "Sink", TrainAction::SoftArrival)));
        assert!(train.route().is_none());
    }

    #[test]
    fn test_launch_and_forget_runs_out_before_every_dispatch() {
        let problem = ProblemDefinition::new(0, DAY_END)
            .with_station(StationSpec::new(1, "A").with_min_dwell(60))
            .with_depot(
                DepotSpec::new(100, "Yard")
                    .with_kind(DepotKind::LaunchAndForget)
                    .with_train(1)
                    .with_route_sequence(vec![10]),
            )
            .with_route(RouteSpec::new(10, "R", 100).with_station(1))
            .with_travel_time(100, 1, 120)
            .with_travel_time(1, 100, 120);
        let mut network = network_with_headway(&problem, 600);

        let summary = run(&mut network).unwrap();
        assert_eq!(summary.trips, 5);

        // Depot-out running plus headway, even for a returned train
        let depot = network.depots().by_id(100).unwrap();
        assert_eq!(depot.departure_times(), &[0, 720, 1_440, 2_160, 2_880]);

        let train = network.trains().by_id(1).unwrap();
        assert_eq!(
            &train.log()[&2].events[..2],
            &[
                TrainEvent::new(720, "Yard", TrainAction::Departure),
                TrainEvent::new(840, "A", TrainAction::Arrival),
            ]
        );
    }

    #[test]
    fn test_simultaneous_launches_follow_depot_order() {
        let problem = two_stations(None)
            .with_depot(
                DepotSpec::new(200, "East")
                    .with_train(2)
                    .with_route_sequence(vec![20]),
            )
            .with_route(RouteSpec::new(20, "B-A", 200).with_stations(vec![2, 1]))
            .with_travel_time(200, 2, 120)
            .with_travel_time(2, 1, 300)
            .with_travel_time(1, 200, 120);
        let mut network = network_with_headway(&problem, 600);

        run(&mut network).unwrap();
        let first = network.trains().by_id(1).unwrap();
        let second = network.trains().by_id(2).unwrap();
        assert_eq!(first.log().keys().next(), Some(&1));
        assert_eq!(second.log().keys().next(), Some(&2));
    }

    #[test]
    fn test_events_at_day_end_are_not_processed() {
        let mut problem = two_stations(None);
        problem.depots[0].first_launch_at = DAY_END;
        let mut network = network_with_headway(&problem, 600);

        let summary = run(&mut network).unwrap();
        assert_eq!(summary.resumes, 0);
        assert_eq!(summary.trips, 0);
    }
}
