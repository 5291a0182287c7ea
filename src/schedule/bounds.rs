//! Closed value ranges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed range `[lower, upper]` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bound {
    pub lower: i64,
    pub upper: i64,
}

impl Bound {
    /// `[lower, upper]`, both inclusive.
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// `[center - radius, center + radius]`.
    pub fn around(center: i64, radius: i64) -> Self {
        Self::new(center - radius, center + radius)
    }

    /// Whether `value` lies within the bound.
    pub fn contains(&self, value: i64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// How far `value` can decrease before leaving the range.
    pub fn room_below(&self, value: i64) -> i64 {
        value - self.lower
    }

    /// How far `value` can increase before leaving the range.
    pub fn room_above(&self, value: i64) -> i64 {
        self.upper - value
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
