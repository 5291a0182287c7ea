//! Route definition.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// An ordered station sequence served between two depots.
///
/// Trains leave `launch_depot`, call at every station in order, and are
/// returned to `circulating_depot` (which may be the launch depot) after
/// the turnaround.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Route identifier.
    pub id: NodeId,
    /// Human-readable name, recorded in trip logs.
    pub name: String,
    /// Station ids in travel order.
    pub stations: Vec<NodeId>,
    /// Depot trains start from.
    pub launch_depot: NodeId,
    /// Depot trains are returned to.
    pub circulating_depot: NodeId,
    /// Minimum time at the route end before a train can be redispatched (seconds).
    pub turnaround: i64,
}

impl RouteSpec {
    /// Creates a route that starts and ends at `depot`.
    pub fn new(id: NodeId, name: impl Into<String>, depot: NodeId) -> Self {
        Self {
            id,
            name: name.into(),
            stations: Vec::new(),
            launch_depot: depot,
            circulating_depot: depot,
            turnaround: 0,
        }
    }

    /// Appends a station.
    pub fn with_station(mut self, station: NodeId) -> Self {
        self.stations.push(station);
        self
    }

    /// Sets the station sequence.
    pub fn with_stations(mut self, stations: Vec<NodeId>) -> Self {
        self.stations = stations;
        self
    }

    /// Sets a circulating depot different from the launch depot.
    pub fn with_circulating_depot(mut self, depot: NodeId) -> Self {
        self.circulating_depot = depot;
        self
    }

    /// Sets the turnaround duration (seconds).
    pub fn with_turnaround(mut self, seconds: i64) -> Self {
        self.turnaround = seconds;
        self
    }
}
