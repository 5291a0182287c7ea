//! Per-run network model.
//!
//! A [`Network`] owns every station, route, depot and train of one line as
//! arena registries plus the travel-time table. Entities reference each
//! other through typed handles ([`StationIdx`], [`RouteIdx`], [`DepotIdx`],
//! [`TrainIdx`]), so cloning a network yields a fully independent copy of
//! all run state.
//!
//! # Setup
//! Depots need a headway function and a route sequence before they can
//! run. [`Network::from_problem`] binds route sequences from the problem
//! definition; headways are bound per candidate schedule with
//! [`Network::bind_headway`]. Missing bindings are reported when a run
//! starts, not here.
//!
//! # Example
//! ```
//! use u_transit::models::{DepotSpec, ProblemDefinition, RouteSpec, StationSpec};
//! use u_transit::network::Network;
//!
//! let problem = ProblemDefinition::new(0, 3_600)
//!     .with_station(StationSpec::new(1, "A").with_min_dwell(60))
//!     .with_station(StationSpec::new(2, "B").with_min_dwell(60))
//!     .with_depot(DepotSpec::new(100, "Yard").with_train(1).with_route_sequence(vec![10]))
//!     .with_route(RouteSpec::new(10, "A-B", 100).with_stations(vec![1, 2]))
//!     .with_travel_time(100, 1, 120)
//!     .with_travel_time(1, 2, 300)
//!     .with_travel_time(2, 100, 120);
//!
//! let network = Network::from_problem(&problem).unwrap();
//! assert_eq!(network.stations().len(), 2);
//! assert_eq!(network.time_to_travel(1, 2), Ok(300));
//! ```

mod entities;
mod error;
mod log;
mod registry;
mod travel;

pub use entities::{ArrivalHook, Depot, Route, Station, Train};
pub use error::{EntityKind, NetworkError, NoTravelTimeError};
pub use log::{TrainAction, TrainEvent, TripLog};
pub use registry::{DepotIdx, Handle, Registry, RouteIdx, StationIdx, TrainIdx};
pub use travel::TravelTimes;

use std::sync::Arc;

use crate::models::{NodeId, ProblemDefinition, RouteSpec};
use crate::rate::{CumulativeArrivals, HeadwayFunction};

/// All entities of one line, plus the travel-time table.
#[derive(Debug, Clone)]
pub struct Network {
    day_begin: i64,
    day_end: i64,
    stations: Registry<StationIdx, Station>,
    routes: Registry<RouteIdx, Route>,
    depots: Registry<DepotIdx, Depot>,
    trains: Registry<TrainIdx, Train>,
    travel_times: TravelTimes,
    trip_counter: u64,
}

impl Network {
    /// Creates an empty network for the operating day `[day_begin, day_end)`.
    pub fn new(day_begin: i64, day_end: i64, travel_times: TravelTimes) -> Self {
        Self {
            day_begin,
            day_end,
            stations: Registry::new(),
            routes: Registry::new(),
            depots: Registry::new(),
            trains: Registry::new(),
            travel_times,
            trip_counter: 0,
        }
    }

    /// Builds a network from a validated problem definition.
    ///
    /// Stations get their cumulative arrivals and constant minimum dwell,
    /// depots get their stationed trains (first listed departs first) and
    /// route sequence. Headway functions are left unbound.
    pub fn from_problem(problem: &ProblemDefinition) -> Result<Self, NetworkError> {
        let travel_times: TravelTimes = problem.travel_times.iter().collect();
        let mut network = Network::new(problem.day_begin, problem.day_end, travel_times);

        for spec in &problem.stations {
            let arrivals = Arc::new(CumulativeArrivals::new(
                problem.day_begin,
                problem.day_end,
                &spec.demand,
            ));
            let station = Station::new(spec.id, spec.name.clone(), arrivals, problem.day_begin)
                .with_dwell(spec.min_dwell);
            network.add_station(station)?;
        }

        for spec in &problem.depots {
            network.add_depot(Depot::new(
                spec.id,
                spec.name.clone(),
                spec.kind,
                spec.first_launch_at,
            ))?;
        }

        for spec in &problem.routes {
            network.add_route(spec)?;
        }

        for spec in &problem.depots {
            for &train in &spec.stationed_trains {
                network.add_train(train, format!("Train {train}"), spec.id)?;
            }
            network.bind_route_sequence(spec.id, &spec.route_sequence)?;
        }

        Ok(network)
    }

    /// Registers a station. Stations and depots share one id namespace.
    pub fn add_station(&mut self, station: Station) -> Result<StationIdx, NetworkError> {
        let id = station.id();
        if self.depots.lookup(id).is_some() {
            return Err(NetworkError::DuplicateId {
                kind: EntityKind::Station,
                id,
            });
        }
        self.stations
            .insert(id, station)
            .ok_or(NetworkError::DuplicateId {
                kind: EntityKind::Station,
                id,
            })
    }

    /// Registers a depot with an empty pool.
    pub fn add_depot(&mut self, depot: Depot) -> Result<DepotIdx, NetworkError> {
        let id = depot.id();
        if self.stations.lookup(id).is_some() {
            return Err(NetworkError::DuplicateId {
                kind: EntityKind::Depot,
                id,
            });
        }
        self.depots.insert(id, depot).ok_or(NetworkError::DuplicateId {
            kind: EntityKind::Depot,
            id,
        })
    }

    /// Registers a route, resolving references and depot leg durations.
    pub fn add_route(&mut self, spec: &RouteSpec) -> Result<RouteIdx, NetworkError> {
        let stations = spec
            .stations
            .iter()
            .map(|&id| self.station_idx(id))
            .collect::<Result<Vec<_>, _>>()?;
        let (Some(&first), Some(&last)) = (spec.stations.first(), spec.stations.last()) else {
            return Err(NetworkError::EmptyRoute { route: spec.id });
        };
        let launch_depot = self.depot_idx(spec.launch_depot)?;
        let circulating_depot = self.depot_idx(spec.circulating_depot)?;

        let route = Route {
            id: spec.id,
            name: spec.name.clone(),
            stations,
            launch_depot,
            circulating_depot,
            turnaround: spec.turnaround,
            depot_to_first_station: self.travel_times.get(spec.launch_depot, first)?,
            last_station_to_depot: self.travel_times.get(last, spec.circulating_depot)?,
        };
        self.routes
            .insert(spec.id, route)
            .ok_or(NetworkError::DuplicateId {
                kind: EntityKind::Route,
                id: spec.id,
            })
    }

    /// Registers a train and stations it at the bottom of `depot`'s pool.
    ///
    /// Trains stationed first therefore leave first.
    pub fn add_train(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        depot: NodeId,
    ) -> Result<TrainIdx, NetworkError> {
        let depot_idx = self.depot_idx(depot)?;
        let train = self
            .trains
            .insert(id, Train::new(id, name, depot_idx))
            .ok_or(NetworkError::DuplicateId {
                kind: EntityKind::Train,
                id,
            })?;
        self.depots.get_mut(depot_idx).pool.insert(0, train);
        Ok(train)
    }

    /// Installs the headway function of a depot.
    pub fn bind_headway(
        &mut self,
        depot: NodeId,
        headway: HeadwayFunction,
    ) -> Result<(), NetworkError> {
        let idx = self.depot_idx(depot)?;
        self.depots.get_mut(idx).headway = Some(headway);
        Ok(())
    }

    /// Installs the route sequence a depot cycles through.
    pub fn bind_route_sequence(
        &mut self,
        depot: NodeId,
        routes: &[NodeId],
    ) -> Result<(), NetworkError> {
        let idx = self.depot_idx(depot)?;
        let sequence = routes
            .iter()
            .map(|&id| {
                self.routes.lookup(id).ok_or(NetworkError::UnknownReference {
                    kind: EntityKind::Route,
                    id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.depots.get_mut(idx).route_sequence = Some(sequence);
        Ok(())
    }

    /// Travel duration between two nodes.
    pub fn time_to_travel(&self, from: NodeId, to: NodeId) -> Result<i64, NoTravelTimeError> {
        self.travel_times.get(from, to)
    }

    /// Hands out the next network-wide trip number, starting at 1.
    pub fn next_trip(&mut self) -> u64 {
        self.trip_counter += 1;
        self.trip_counter
    }

    /// Trip numbers handed out so far.
    pub fn trip_count(&self) -> u64 {
        self.trip_counter
    }

    /// Sum of waiting cost over all stations.
    pub fn total_waiting(&self) -> f64 {
        self.stations
            .iter()
            .map(|(_, station)| station.accumulated_waiting())
            .sum()
    }

    /// Start of the simulated day, in seconds.
    pub fn day_begin(&self) -> i64 {
        self.day_begin
    }

    /// End of the simulated day, in seconds. Exclusive.
    pub fn day_end(&self) -> i64 {
        self.day_end
    }

    /// All stations.
    pub fn stations(&self) -> &Registry<StationIdx, Station> {
        &self.stations
    }

    /// All routes.
    pub fn routes(&self) -> &Registry<RouteIdx, Route> {
        &self.routes
    }

    /// All depots.
    pub fn depots(&self) -> &Registry<DepotIdx, Depot> {
        &self.depots
    }

    /// All trains.
    pub fn trains(&self) -> &Registry<TrainIdx, Train> {
        &self.trains
    }

    /// Mutable station access, e.g. to install a dwell function or hook.
    pub fn station_mut(&mut self, idx: StationIdx) -> &mut Station {
        self.stations.get_mut(idx)
    }

    pub(crate) fn depot_mut(&mut self, idx: DepotIdx) -> &mut Depot {
        self.depots.get_mut(idx)
    }

    pub(crate) fn train_mut(&mut self, idx: TrainIdx) -> &mut Train {
        self.trains.get_mut(idx)
    }

    pub(crate) fn depots_mut(&mut self) -> impl Iterator<Item = &mut Depot> + '_ {
        self.depots.values_mut()
    }

    fn station_idx(&self, id: NodeId) -> Result<StationIdx, NetworkError> {
        self.stations.lookup(id).ok_or(NetworkError::UnknownReference {
            kind: EntityKind::Station,
            id,
        })
    }

    fn depot_idx(&self, id: NodeId) -> Result<DepotIdx, NetworkError> {
        self.depots.lookup(id).ok_or(NetworkError::UnknownReference {
            kind: EntityKind::Depot,
            id,
        })
    }
}
