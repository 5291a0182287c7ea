//! Serializable record of one simulation run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::NodeId;
use crate::network::{Network, TrainEvent, TripLog};

/// Everything a run produced: objective, per-trip train logs, dispatch
/// times per depot, and departure times and waiting per station.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub objective: f64,
    /// Failure diagnostic of an infeasible run.
    pub failure: Option<String>,
    /// Breakpoints the run was simulated with.
    pub schedule: String,
    pub trains: Vec<TrainReport>,
    /// Every trip of the day, by trip number.
    pub trips: Vec<TripRecord>,
    pub depots: Vec<DepotReport>,
    pub stations: Vec<StationReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    pub id: NodeId,
    pub name: String,
    /// Trip numbers this train ran.
    pub trips: Vec<u64>,
    /// Route and events of each trip, by trip number.
    pub log: BTreeMap<u64, TripLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub trip: u64,
    pub train: NodeId,
    pub route: String,
    pub events: Vec<TrainEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepotReport {
    pub id: NodeId,
    pub name: String,
    /// Dispatch times.
    pub departures: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReport {
    pub id: NodeId,
    pub name: String,
    pub departures: Vec<i64>,
    pub accumulated_waiting: f64,
}

impl SimulationReport {
    /// A report without logs, for runs that never got a network.
    pub fn empty(objective: f64, failure: Option<String>) -> Self {
        Self {
            objective,
            failure,
            ..Self::default()
        }
    }

    /// Collects the logs left in `network` after a run.
    pub fn from_network(network: &Network, objective: f64, failure: Option<String>) -> Self {
        let trains = network
            .trains()
            .iter()
            .map(|(_, train)| TrainReport {
                id: train.id(),
                name: train.name().to_string(),
                trips: train.log().keys().copied().collect(),
                log: train.log().clone(),
            })
            .collect();

        let mut trips: Vec<TripRecord> = network
            .trains()
            .iter()
            .flat_map(|(_, train)| {
                train.log().iter().map(move |(&trip, log)| TripRecord {
                    trip,
                    train: train.id(),
                    route: log.route.clone(),
                    events: log.events.clone(),
                })
            })
            .collect();
        trips.sort_by_key(|record| (record.trip, record.train));

        let depots = network
            .depots()
            .iter()
            .map(|(_, depot)| DepotReport {
                id: depot.id(),
                name: depot.name().to_string(),
                departures: depot.departure_times().to_vec(),
            })
            .collect();

        let stations = network
            .stations()
            .iter()
            .map(|(_, station)| StationReport {
                id: station.id(),
                name: station.name().to_string(),
                departures: station.departure_times().to_vec(),
                accumulated_waiting: station.accumulated_waiting(),
            })
            .collect();

        Self {
            objective,
            failure,
            schedule: String::new(),
            trains,
            trips,
            depots,
            stations,
        }
    }

    /// Human-readable timetable, one trip per block.
    pub fn timetable(&self) -> String {
        let mut out = String::new();
        for record in &self.trips {
            out.push_str(&format!(
                "trip {} train {} {}\n",
                record.trip, record.train, record.route
            ));
            for event in &record.events {
                out.push_str(&format!("  {event}\n"));
            }
        }
        out
    }
}
