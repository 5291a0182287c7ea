//! Depot and train processes as explicit state machines.
//!
//! A process runs until its next timed wait and hands control back to the
//! engine with [`Step::Sleep`]. The phase field records where to pick up
//! on the next resume.

use tracing::trace;

use super::{MissingBinding, SimulationError};
use crate::models::{format_clock, DepotKind};
use crate::network::{DepotIdx, Network, RouteIdx, TrainAction, TrainEvent, TrainIdx};

/// What a process wants after a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Resume after this many seconds.
    Sleep(i64),
    /// The process is done.
    Finished,
}

/// Environment handed to a resuming process.
pub struct Context<'a> {
    /// Current virtual time.
    pub now: i64,
    pub network: &'a mut Network,
    spawned: Vec<Process>,
}

impl<'a> Context<'a> {
    /// Context at time `now`.
    pub fn new(now: i64, network: &'a mut Network) -> Self {
        Self {
            now,
            network,
            spawned: Vec::new(),
        }
    }

    /// Starts `process` at the current time, after already pending events.
    pub fn spawn(&mut self, process: Process) {
        self.spawned.push(process);
    }

    /// Processes spawned during this resume, in spawn order.
    pub fn take_spawned(&mut self) -> Vec<Process> {
        std::mem::take(&mut self.spawned)
    }

    /// Appends an event to the train's current trip log.
    fn log(&mut self, train: TrainIdx, node: &str, action: TrainAction) {
        let route = self
            .network
            .trains()
            .get(train)
            .route()
            .map(|r| self.network.routes().get(r).name().to_string())
            .unwrap_or_default();
        let event = TrainEvent::new(self.now, node, action);
        self.network.train_mut(train).record(&route, event);
    }
}

/// A schedulable process.
#[derive(Debug, Clone)]
pub enum Process {
    Depot(DepotProcess),
    Train(TrainProcess),
}

impl Process {
    /// Runs the process up to its next wait.
    pub fn resume(&mut self, ctx: &mut Context<'_>) -> Result<Step, SimulationError> {
        match self {
            Process::Depot(depot) => depot.resume(ctx),
            Process::Train(train) => train.resume(ctx),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepotPhase {
    Start,
    Dispatch,
    /// Depot-out running of a freshly dispatched train.
    Launch { train: TrainIdx },
    /// Waiting out the headway after a launch.
    Headway,
}

/// Dispatch loop of one depot.
///
/// A cyclic depot cycles its route sequence for the whole day and fails
/// when it owes a dispatch with an empty pool. A launch-and-forget depot
/// stops once its pool is empty.
#[derive(Debug, Clone)]
pub struct DepotProcess {
    depot: DepotIdx,
    phase: DepotPhase,
    cursor: usize,
}

impl DepotProcess {
    /// Process dispatching from `depot`.
    pub fn new(depot: DepotIdx) -> Self {
        Self {
            depot,
            phase: DepotPhase::Start,
            cursor: 0,
        }
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<Step, SimulationError> {
        loop {
            match self.phase {
                DepotPhase::Start => {
                    let depot = ctx.network.depot_mut(self.depot);
                    depot.initial_train_count = depot.pool.len();
                    self.phase = DepotPhase::Dispatch;
                }
                DepotPhase::Dispatch => return self.dispatch(ctx),
                DepotPhase::Launch { train } => return self.launch(ctx, train),
                DepotPhase::Headway => {
                    ctx.network.depot_mut(self.depot).trains_launched += 1;
                    self.phase = DepotPhase::Dispatch;
                }
            }
        }
    }

    fn dispatch(&mut self, ctx: &mut Context<'_>) -> Result<Step, SimulationError> {
        let now = ctx.now;
        let depot = ctx.network.depot_mut(self.depot);
        let route = {
            let sequence =
                depot
                    .route_sequence
                    .as_deref()
                    .ok_or_else(|| SimulationError::UnconfiguredDepot {
                        depot: depot.name.clone(),
                        missing: MissingBinding::RouteSequence,
                    })?;
            match sequence.get(self.cursor % sequence.len().max(1)) {
                Some(&route) => route,
                None => {
                    trace!(depot = %depot.name, "no routes to serve");
                    return Ok(Step::Finished);
                }
            }
        };

        let Some(train) = depot.pop_train() else {
            return match depot.kind {
                DepotKind::Cyclic => Err(SimulationError::DepotExhausted {
                    depot: depot.name.clone(),
                    time: now,
                }),
                DepotKind::LaunchAndForget => {
                    trace!(depot = %depot.name, time = %format_clock(now), "pool empty, stopping");
                    Ok(Step::Finished)
                }
            };
        };
        self.cursor += 1;
        depot.departure_times.push(now);
        let depot_out = depot.kind == DepotKind::LaunchAndForget
            || depot.trains_launched < depot.initial_train_count;
        let depot_name = depot.name.clone();

        let trip = ctx.network.next_trip();
        ctx.network.train_mut(train).assign(trip, route);
        ctx.log(train, &depot_name, TrainAction::Departure);
        trace!(
            depot = %depot_name,
            train = ctx.network.trains().get(train).name(),
            trip,
            time = %format_clock(now),
            "sending out train"
        );

        if depot_out {
            let running = ctx.network.routes().get(route).depot_to_first_station();
            self.phase = DepotPhase::Launch { train };
            return Ok(Step::Sleep(running));
        }
        self.launch(ctx, train)
    }

    fn launch(&mut self, ctx: &mut Context<'_>, train: TrainIdx) -> Result<Step, SimulationError> {
        ctx.spawn(Process::Train(TrainProcess::new(train)));

        let now = ctx.now;
        let depot = ctx.network.depot_mut(self.depot);
        let headway = depot
            .headway
            .as_mut()
            .ok_or_else(|| SimulationError::UnconfiguredDepot {
                depot: depot.name.clone(),
                missing: MissingBinding::Headway,
            })?
            .value_at(now)?;
        trace!(depot = %depot.name, headway, "next train departs after headway");

        self.phase = DepotPhase::Headway;
        Ok(Step::Sleep(headway))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrainPhase {
    Start,
    /// Dwelling at the `stop`-th station of the route.
    Dwelling { stop: usize },
    /// Running toward the `stop`-th station.
    Travelling { stop: usize },
    /// Running from the last station to the circulating depot.
    Returning,
}

/// One round trip of a train over its assigned route.
#[derive(Debug, Clone)]
pub struct TrainProcess {
    train: TrainIdx,
    phase: TrainPhase,
}

impl TrainProcess {
    /// Process moving `train`.
    pub fn new(train: TrainIdx) -> Self {
        Self {
            train,
            phase: TrainPhase::Start,
        }
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<Step, SimulationError> {
        let Some(route) = ctx.network.trains().get(self.train).route() else {
            let home = ctx.network.trains().get(self.train).home_depot();
            let depot_name = ctx.network.depots().get(home).name().to_string();
            trace!(train = ctx.network.trains().get(self.train).name(), depot = %depot_name, "idle");
            ctx.log(self.train, &depot_name, TrainAction::Idle);
            return Ok(Step::Finished);
        };

        match self.phase {
            TrainPhase::Start => self.arrive(ctx, route, 0),
            TrainPhase::Travelling { stop } => self.arrive(ctx, route, stop),
            TrainPhase::Dwelling { stop } => self.depart(ctx, route, stop),
            TrainPhase::Returning => {
                let depot = ctx.network.routes().get(route).circulating_depot();
                let depot_name = ctx.network.depots().get(depot).name().to_string();
                ctx.log(self.train, &depot_name, TrainAction::SoftArrival);
                trace!(
                    train = ctx.network.trains().get(self.train).name(),
                    depot = %depot_name,
                    time = %format_clock(ctx.now),
                    "returned to depot"
                );
                ctx.network.depot_mut(depot).push_train(self.train);
                ctx.network.train_mut(self.train).route = None;
                Ok(Step::Finished)
            }
        }
    }

    /// Arrives at the `stop`-th station and starts dwelling.
    fn arrive(
        &mut self,
        ctx: &mut Context<'_>,
        route: RouteIdx,
        stop: usize,
    ) -> Result<Step, SimulationError> {
        let station_idx = ctx.network.routes().get(route).stations()[stop];
        let station = ctx.network.stations().get(station_idx);
        let name = station.name().to_string();
        station.on_arrival(ctx.network.trains().get(self.train).id(), ctx.now);
        let dwell = station.dwell_at(ctx.now)?;

        ctx.log(self.train, &name, TrainAction::Arrival);
        trace!(
            train = ctx.network.trains().get(self.train).name(),
            station = %name,
            dwell,
            "dwelling"
        );
        self.phase = TrainPhase::Dwelling { stop };
        Ok(Step::Sleep(dwell))
    }

    /// Leaves the `stop`-th station toward the next one or the depot.
    fn depart(
        &mut self,
        ctx: &mut Context<'_>,
        route: RouteIdx,
        stop: usize,
    ) -> Result<Step, SimulationError> {
        let now = ctx.now;
        let route = ctx.network.routes().get(route);
        let from = route.stations()[stop];
        let next = route.stations().get(stop + 1).copied();

        let wait = match next {
            Some(to) => {
                let from_id = ctx.network.stations().get(from).id();
                let to_id = ctx.network.stations().get(to).id();
                ctx.network.time_to_travel(from_id, to_id)?
            }
            None => route.turnaround().max(route.last_station_to_depot()),
        };

        let name = ctx.network.stations().get(from).name().to_string();
        ctx.log(self.train, &name, TrainAction::Departure);
        ctx.network.station_mut(from).on_departure(now);
        trace!(
            train = ctx.network.trains().get(self.train).name(),
            station = %name,
            time = %format_clock(now),
            wait,
            "departing"
        );

        self.phase = match next {
            Some(_) => TrainPhase::Travelling { stop: stop + 1 },
            None => TrainPhase::Returning,
        };
        Ok(Step::Sleep(wait))
    }
}
