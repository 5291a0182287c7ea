//! Station definition.
//!
//! A station is a stop on one or more routes. Passengers arrive at a
//! station according to a time-keyed demand series and wait for the next
//! departing train.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Passengers arriving at a station during one demand slot.
///
/// `time` is the end of the slot: by `time`, `passengers` more people have
/// entered the station than at the previous slot boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandSlot {
    /// Slot boundary (seconds since midnight).
    pub time: i64,
    /// Passengers arriving within the slot.
    pub passengers: u32,
}

impl DemandSlot {
    /// Creates a demand slot.
    pub fn new(time: i64, passengers: u32) -> Self {
        Self { time, passengers }
    }
}

/// A station on the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSpec {
    /// Node identifier (shared namespace with depots).
    pub id: NodeId,
    /// Human-readable name, used in event logs.
    pub name: String,
    /// Minimum dwell duration (seconds).
    pub min_dwell: i64,
    /// Passenger demand series. Need not be sorted.
    pub demand: Vec<DemandSlot>,
}

impl StationSpec {
    /// Creates a station with no demand and zero dwell.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            min_dwell: 0,
            demand: Vec::new(),
        }
    }

    /// Sets the minimum dwell duration (seconds).
    pub fn with_min_dwell(mut self, seconds: i64) -> Self {
        self.min_dwell = seconds;
        self
    }

    /// Adds a demand slot.
    pub fn with_demand(mut self, time: i64, passengers: u32) -> Self {
        self.demand.push(DemandSlot::new(time, passengers));
        self
    }

    /// Total passengers over the day.
    pub fn total_demand(&self) -> u64 {
        self.demand.iter().map(|slot| slot.passengers as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_builder() {
        let station = StationSpec::new(7, "Central")
            .with_min_dwell(45)
            .with_demand(600, 10)
            .with_demand(1200, 5);

        assert_eq!(station.id, 7);
        assert_eq!(station.name, "Central");
        assert_eq!(station.min_dwell, 45);
        assert_eq!(station.demand.len(), 2);
        assert_eq!(station.total_demand(), 15);
    }
}
