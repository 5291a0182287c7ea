//! Piecewise-constant functions over half-open time periods.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::format_clock;

/// A rate function was queried at a time no period covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndefinedPeriodError {
    /// The queried time (seconds since midnight).
    pub time: i64,
}

impl fmt::Display for UndefinedPeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no period is defined for time {}", format_clock(self.time))
    }
}

impl std::error::Error for UndefinedPeriodError {}

/// Boundaries and values of a periodic function do not line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateShapeError {
    /// Number of boundaries supplied.
    pub boundaries: usize,
    /// Number of values supplied.
    pub values: usize,
}

impl fmt::Display for RateShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} boundaries cannot delimit {} periods (need one more boundary than values)",
            self.boundaries, self.values
        )
    }
}

impl std::error::Error for RateShapeError {}

/// A step function over consecutive half-open periods.
///
/// Period `i` is `[boundaries[i], boundaries[i + 1])` and carries
/// `values[i]`. Times outside every period are an error, not clamped:
/// in particular the final boundary itself is undefined.
///
/// # Example
/// ```
/// use u_transit::rate::PeriodicFunction;
///
/// let f = PeriodicFunction::new(vec![0, 3_600, 7_200], vec![300, 600]).unwrap();
/// assert_eq!(f.value_at(0), Ok(300));
/// assert_eq!(f.value_at(3_600), Ok(600));
/// assert!(f.value_at(7_200).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicFunction {
    boundaries: Vec<i64>,
    values: Vec<i64>,
}

impl PeriodicFunction {
    /// Builds a function from `values.len() + 1` boundaries.
    pub fn new(boundaries: Vec<i64>, values: Vec<i64>) -> Result<Self, RateShapeError> {
        if boundaries.len() != values.len() + 1 {
            return Err(RateShapeError {
                boundaries: boundaries.len(),
                values: values.len(),
            });
        }
        Ok(Self { boundaries, values })
    }

    /// A single period `[begin, end)` with a constant value.
    pub fn constant(begin: i64, end: i64, value: i64) -> Self {
        Self {
            boundaries: vec![begin, end],
            values: vec![value],
        }
    }

    /// Value of the first period containing `time`.
    pub fn value_at(&self, time: i64) -> Result<i64, UndefinedPeriodError> {
        self.periods()
            .find(|&(begin, end, _)| begin <= time && time < end)
            .map(|(_, _, value)| value)
            .ok_or(UndefinedPeriodError { time })
    }

    /// Iterates `(begin, end, value)` per period.
    pub fn periods(&self) -> impl Iterator<Item = (i64, i64, i64)> + '_ {
        self.boundaries
            .windows(2)
            .zip(&self.values)
            .map(|(w, &value)| (w[0], w[1], value))
    }

    /// Period boundaries.
    pub fn boundaries(&self) -> &[i64] {
        &self.boundaries
    }

    /// Per-period values.
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}
