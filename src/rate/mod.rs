//! Time-windowed rate functions.
//!
//! Every time-dependent quantity the simulation reads goes through this
//! module:
//!
//! - [`PeriodicFunction`]: a step function over half-open periods. Querying
//!   outside every period fails with [`UndefinedPeriodError`].
//! - [`HeadwayFunction`]: a periodic function with optional smoothing state
//!   that limits the change between consecutive dispatch headways.
//! - [`CumulativeArrivals`]: passengers arrived at a station by a given time.
//! - [`DwellFunction`]: how long a train stops at a station.

mod cumulative;
mod headway;
mod periodic;

pub use cumulative::CumulativeArrivals;
pub use headway::{HeadwayFunction, Smoothing};
pub use periodic::{PeriodicFunction, RateShapeError, UndefinedPeriodError};

use serde::{Deserialize, Serialize};

/// Dwell duration at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DwellFunction {
    /// The same dwell all day.
    Constant(i64),
    /// Dwell varying by period of the day.
    Periodic(PeriodicFunction),
}

impl DwellFunction {
    /// Dwell duration for a train stopping at `time`.
    pub fn at(&self, time: i64) -> Result<i64, UndefinedPeriodError> {
        match self {
            DwellFunction::Constant(duration) => Ok(*duration),
            DwellFunction::Periodic(periods) => periods.value_at(time),
        }
    }
}

impl Default for DwellFunction {
    fn default() -> Self {
        DwellFunction::Constant(0)
    }
}
