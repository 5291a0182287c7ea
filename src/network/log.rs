//! Per-train event logs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::format_clock;

/// What happened to a train at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainAction {
    Departure,
    Arrival,
    /// Returned to a depot pool after finishing a route.
    SoftArrival,
    /// Started without a route; waits for redispatch.
    Idle,
}

impl fmt::Display for TrainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainAction::Departure => "departure",
            TrainAction::Arrival => "arrival",
            TrainAction::SoftArrival => "soft-arrival",
            TrainAction::Idle => "idle",
        };
        f.write_str(name)
    }
}

/// One `{time, node, action}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainEvent {
    /// Seconds since midnight.
    pub time: i64,
    /// Name of the station or depot.
    pub node: String,
    pub action: TrainAction,
}

impl TrainEvent {
    /// Creates an event.
    pub fn new(time: i64, node: impl Into<String>, action: TrainAction) -> Self {
        Self {
            time,
            node: node.into(),
            action,
        }
    }
}

impl fmt::Display for TrainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", format_clock(self.time), self.action, self.node)
    }
}

/// Events of a single trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLog {
    /// Name of the route the trip ran, empty if none was assigned.
    pub route: String,
    pub events: Vec<TrainEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_kebab_case() {
        let json = serde_json::to_string(&TrainAction::SoftArrival).unwrap();
        assert_eq!(json, "\"soft-arrival\"");
    }

    #[test]
    fn test_event_display() {
        let event = TrainEvent::new(3_660, "Central", TrainAction::Arrival);
        assert_eq!(event.to_string(), "01:01:00 arrival Central");
    }
}
