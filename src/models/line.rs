//! Problem definition for one transit line.
//!
//! This is the already-parsed, in-memory form of a line: its operating
//! day, the travel-time table, and the station, depot and route
//! definitions. Loading it from spreadsheets or JSON files is the
//! caller's job; the types derive `serde` so a loader can deserialize
//! straight into them.

use serde::{Deserialize, Serialize};

use super::{DepotSpec, NodeId, RouteSpec, StationSpec};

/// Scheduled running time between two adjacent nodes.
///
/// Nodes are stations or depots. The table is directional: `(a, b)` and
/// `(b, a)` are separate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLeg {
    /// Departure node.
    pub from: NodeId,
    /// Arrival node.
    pub to: NodeId,
    /// Running time (seconds).
    pub duration: i64,
}

impl TravelLeg {
    /// Creates a travel leg.
    pub fn new(from: NodeId, to: NodeId, duration: i64) -> Self {
        Self { from, to, duration }
    }
}

/// A complete line definition.
///
/// # Example
/// ```
/// use u_transit::models::{DepotSpec, ProblemDefinition, RouteSpec, StationSpec};
///
/// let problem = ProblemDefinition::new(0, 3_600)
///     .with_station(StationSpec::new(1, "A").with_min_dwell(60))
///     .with_station(StationSpec::new(2, "B").with_min_dwell(60))
///     .with_depot(DepotSpec::new(100, "Yard").with_train(1).with_route_sequence(vec![10]))
///     .with_route(RouteSpec::new(10, "A-B", 100).with_stations(vec![1, 2]))
///     .with_travel_time(100, 1, 120)
///     .with_travel_time(1, 2, 300)
///     .with_travel_time(2, 100, 120);
///
/// assert_eq!(problem.stations.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDefinition {
    /// Line identifier.
    pub line_id: u32,
    /// Line name.
    pub line_name: String,
    /// Start of the operating day (seconds since midnight).
    pub day_begin: i64,
    /// End of the operating day; the simulation stops here.
    pub day_end: i64,
    /// Travel-time table.
    pub travel_times: Vec<TravelLeg>,
    /// Stations.
    pub stations: Vec<StationSpec>,
    /// Depots.
    pub depots: Vec<DepotSpec>,
    /// Routes.
    pub routes: Vec<RouteSpec>,
}

impl ProblemDefinition {
    /// Creates an empty line operating between `day_begin` and `day_end`.
    pub fn new(day_begin: i64, day_end: i64) -> Self {
        Self {
            day_begin,
            day_end,
            ..Default::default()
        }
    }

    /// Sets line id and name.
    pub fn with_line(mut self, line_id: u32, line_name: impl Into<String>) -> Self {
        self.line_id = line_id;
        self.line_name = line_name.into();
        self
    }

    /// Adds a station.
    pub fn with_station(mut self, station: StationSpec) -> Self {
        self.stations.push(station);
        self
    }

    /// Adds a depot.
    pub fn with_depot(mut self, depot: DepotSpec) -> Self {
        self.depots.push(depot);
        self
    }

    /// Adds a route.
    pub fn with_route(mut self, route: RouteSpec) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds a directional travel-time entry.
    pub fn with_travel_time(mut self, from: NodeId, to: NodeId, duration: i64) -> Self {
        self.travel_times.push(TravelLeg::new(from, to, duration));
        self
    }

    /// Finds a depot definition by id.
    pub fn depot(&self, id: NodeId) -> Option<&DepotSpec> {
        self.depots.iter().find(|d| d.id == id)
    }

    /// Finds a station definition by id.
    pub fn station(&self, id: NodeId) -> Option<&StationSpec> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Finds a route definition by id.
    pub fn route(&self, id: NodeId) -> Option<&RouteSpec> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// Total number of stationed trains across all depots.
    pub fn train_count(&self) -> usize {
        self.depots.iter().map(|d| d.stationed_trains.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProblemDefinition {
        ProblemDefinition::new(0, 7_200)
            .with_line(4, "Line 4")
            .with_station(StationSpec::new(1, "A").with_demand(600, 3))
            .with_station(StationSpec::new(2, "B"))
            .with_depot(DepotSpec::new(100, "Yard").with_train(1).with_train(2))
            .with_route(RouteSpec::new(10, "A-B", 100).with_stations(vec![1, 2]))
            .with_travel_time(1, 2, 300)
    }

    #[test]
    fn test_lookups() {
        let problem = sample();
        assert_eq!(problem.station(2).map(|s| s.name.as_str()), Some("B"));
        assert_eq!(problem.depot(100).map(|d| d.name.as_str()), Some("Yard"));
        assert!(problem.route(11).is_none());
        assert_eq!(problem.train_count(), 2);
    }

    #[test]
    fn test_json_round_trip() {
        let problem = sample();
        let json = serde_json::to_string(&problem).unwrap();
        assert!(json.contains("\"dayEnd\":7200"));
        assert!(json.contains("\"type\":\"Depot\""));

        let back: ProblemDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.line_name, "Line 4");
        assert_eq!(back.travel_times, problem.travel_times);
        assert_eq!(back.stations[0].demand, problem.stations[0].demand);
    }
}
