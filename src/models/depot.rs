//! Depot definition and its optimizable headway configurations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::NodeId;

/// Dispatch behaviour of a depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DepotKind {
    /// Cycles through its route sequence for the whole day. Running out of
    /// stationed trains while a dispatch is still owed is a failure.
    #[default]
    Cyclic,
    /// Launches every stationed train once, then stops.
    LaunchAndForget,
}

impl DepotKind {
    /// The type tag used in problem files.
    pub fn tag(&self) -> &'static str {
        match self {
            DepotKind::Cyclic => "Depot",
            DepotKind::LaunchAndForget => "LaunchAndForgetDepot",
        }
    }
}

impl fmt::Display for DepotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A depot type tag that names no known depot kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDepotTypeError {
    /// The rejected tag.
    pub tag: String,
}

impl fmt::Display for UnknownDepotTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown depot type '{}'", self.tag)
    }
}

impl std::error::Error for UnknownDepotTypeError {}

impl FromStr for DepotKind {
    type Err = UnknownDepotTypeError;

    /// Parses a type tag, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [DepotKind::Cyclic, DepotKind::LaunchAndForget]
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDepotTypeError { tag: s.to_string() })
    }
}

impl TryFrom<String> for DepotKind {
    type Error = UnknownDepotTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DepotKind> for String {
    fn from(kind: DepotKind) -> Self {
        kind.tag().to_string()
    }
}

/// One candidate headway sequence for a depot.
///
/// `headways[k]` applies during the `k`-th time period; the period length
/// must stay within `[period_min_sizes[k], period_max_sizes[k]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadwayConfiguration {
    /// Headway per period (seconds).
    pub headways: Vec<i64>,
    /// Minimum period length (seconds).
    pub period_min_sizes: Vec<i64>,
    /// Maximum period length (seconds).
    pub period_max_sizes: Vec<i64>,
}

impl HeadwayConfiguration {
    /// Creates a configuration from parallel arrays.
    pub fn new(headways: Vec<i64>, period_min_sizes: Vec<i64>, period_max_sizes: Vec<i64>) -> Self {
        Self {
            headways,
            period_min_sizes,
            period_max_sizes,
        }
    }

    /// Number of time periods this configuration covers.
    pub fn period_count(&self) -> usize {
        self.headways.len()
    }
}

/// One candidate partition of the day into headway periods.
///
/// `breakpoints` are the period boundaries; breakpoint `i` may move at
/// most `windows[i]` seconds either way from its initial position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriodConfiguration {
    /// Strictly increasing period boundaries (seconds since midnight).
    pub breakpoints: Vec<i64>,
    /// Plus-or-minus movement window per breakpoint (seconds).
    pub windows: Vec<i64>,
}

impl TimePeriodConfiguration {
    /// Creates a configuration from parallel arrays.
    pub fn new(breakpoints: Vec<i64>, windows: Vec<i64>) -> Self {
        Self {
            breakpoints,
            windows,
        }
    }
}

/// A depot that stations trains and dispatches them onto routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotSpec {
    /// Node identifier (shared namespace with stations).
    pub id: NodeId,
    /// Human-readable name, used in event logs.
    pub name: String,
    /// Dispatch behaviour.
    #[serde(rename = "type")]
    pub kind: DepotKind,
    /// First dispatch time (seconds since midnight).
    pub first_launch_at: i64,
    /// Ids of trains stationed here at day start, in dispatch order.
    pub stationed_trains: Vec<NodeId>,
    /// Route ids cycled through on successive dispatches.
    pub route_sequence: Vec<NodeId>,
    /// Candidate headway sequences.
    pub headway_configurations: Vec<HeadwayConfiguration>,
    /// Candidate period partitions.
    pub time_period_configurations: Vec<TimePeriodConfiguration>,
}

impl DepotSpec {
    /// Creates a cyclic depot with no trains, routes or configurations.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: DepotKind::Cyclic,
            first_launch_at: 0,
            stationed_trains: Vec::new(),
            route_sequence: Vec::new(),
            headway_configurations: Vec::new(),
            time_period_configurations: Vec::new(),
        }
    }

    /// Sets the depot kind.
    pub fn with_kind(mut self, kind: DepotKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the first dispatch time.
    pub fn with_first_launch_at(mut self, seconds: i64) -> Self {
        self.first_launch_at = seconds;
        self
    }

    /// Stations a train at the depot.
    pub fn with_train(mut self, train: NodeId) -> Self {
        self.stationed_trains.push(train);
        self
    }

    /// Sets the route sequence.
    pub fn with_route_sequence(mut self, routes: Vec<NodeId>) -> Self {
        self.route_sequence = routes;
        self
    }

    /// Adds a candidate headway configuration.
    pub fn with_headway_configuration(mut self, config: HeadwayConfiguration) -> Self {
        self.headway_configurations.push(config);
        self
    }

    /// Adds a candidate period partition.
    pub fn with_time_period_configuration(mut self, config: TimePeriodConfiguration) -> Self {
        self.time_period_configurations.push(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_ignores_case() {
        assert_eq!("depot".parse::<DepotKind>(), Ok(DepotKind::Cyclic));
        assert_eq!(
            "LAUNCHANDFORGETDEPOT".parse::<DepotKind>(),
            Ok(DepotKind::LaunchAndForget)
        );
    }

    #[test]
    fn test_unknown_kind() {
        let err = "Garage".parse::<DepotKind>().unwrap_err();
        assert_eq!(err.tag, "Garage");
        assert!(err.to_string().contains("Garage"));
    }

    #[test]
    fn test_kind_serde_uses_tag() {
        let json = serde_json::to_string(&DepotKind::LaunchAndForget).unwrap();
        assert_eq!(json, "\"LaunchAndForgetDepot\"");
        let back: DepotKind = serde_json::from_str("\"depot\"").unwrap();
        assert_eq!(back, DepotKind::Cyclic);
        assert!(serde_json::from_str::<DepotKind>("\"Yard\"").is_err());
    }

    #[test]
    fn test_depot_builder() {
        let depot = DepotSpec::new(100, "North Yard")
            .with_kind(DepotKind::LaunchAndForget)
            .with_first_launch_at(18_000)
            .with_train(1)
            .with_train(2)
            .with_route_sequence(vec![10, 11]);

        assert_eq!(depot.stationed_trains, vec![1, 2]);
        assert_eq!(depot.route_sequence, vec![10, 11]);
        assert_eq!(depot.first_launch_at, 18_000);
        assert_eq!(depot.kind, DepotKind::LaunchAndForget);
    }
}
