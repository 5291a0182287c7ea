//! Travel-time lookup between nodes.

use std::collections::HashMap;

use super::NoTravelTimeError;
use crate::models::{NodeId, TravelLeg};

/// Directed travel durations keyed by `(from, to)` node pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelTimes {
    legs: HashMap<(NodeId, NodeId), i64>,
}

impl TravelTimes {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duration of one directed leg, replacing any previous one.
    pub fn insert(&mut self, from: NodeId, to: NodeId, duration: i64) {
        self.legs.insert((from, to), duration);
    }

    /// Duration from `from` to `to`.
    pub fn get(&self, from: NodeId, to: NodeId) -> Result<i64, NoTravelTimeError> {
        self.legs
            .get(&(from, to))
            .copied()
            .ok_or(NoTravelTimeError { from, to })
    }

    /// Number of directed legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Whether no leg is defined.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

impl<'a> FromIterator<&'a TravelLeg> for TravelTimes {
    fn from_iter<I: IntoIterator<Item = &'a TravelLeg>>(iter: I) -> Self {
        let mut times = Self::new();
        for leg in iter {
            times.insert(leg.from, leg.to, leg.duration);
        }
        times
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed_lookup() {
        let legs = [TravelLeg::new(1, 2, 300), TravelLeg::new(2, 3, 240)];
        let times: TravelTimes = legs.iter().collect();

        assert_eq!(times.get(1, 2), Ok(300));
        assert_eq!(times.get(2, 1), Err(NoTravelTimeError { from: 2, to: 1 }));
        assert_eq!(times.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut times = TravelTimes::new();
        times.insert(1, 2, 100);
        times.insert(1, 2, 120);
        assert_eq!(times.get(1, 2), Ok(120));
    }
}
