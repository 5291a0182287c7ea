//! Simulation run failures.

use std::fmt;

use crate::models::format_clock;
use crate::network::{NetworkError, NoTravelTimeError};
use crate::rate::UndefinedPeriodError;

/// Binding a depot needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingBinding {
    Headway,
    RouteSequence,
}

impl fmt::Display for MissingBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingBinding::Headway => f.write_str("headway function"),
            MissingBinding::RouteSequence => f.write_str("route sequence"),
        }
    }
}

/// A failure that ends the current simulation run.
///
/// None of these escape an evaluation: the evaluator maps every one of
/// them to the infeasible objective and keeps the error as a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A rate function was queried outside its periods.
    UndefinedPeriod(UndefinedPeriodError),
    /// Two consecutive nodes have no travel time.
    NoTravelTime(NoTravelTimeError),
    /// A cyclic depot owes a dispatch but its pool is empty.
    DepotExhausted { depot: String, time: i64 },
    /// A depot lacks a binding at run start.
    UnconfiguredDepot { depot: String, missing: MissingBinding },
    /// A process asked to sleep for a negative duration.
    NegativeDelay { time: i64, delay: i64 },
    /// The candidate could not be bound to the network.
    Setup(NetworkError),
    /// The run panicked; carries the panic message.
    Aborted(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UndefinedPeriod(err) => write!(f, "{err}"),
            SimulationError::NoTravelTime(err) => write!(f, "{err}"),
            SimulationError::DepotExhausted { depot, time } => {
                write!(f, "{depot} has run out of trains at {}", format_clock(*time))
            }
            SimulationError::UnconfiguredDepot { depot, missing } => {
                write!(f, "depot {depot} must be given a {missing} before it can serve")
            }
            SimulationError::NegativeDelay { time, delay } => write!(
                f,
                "negative delay of {delay} s requested at {}",
                format_clock(*time)
            ),
            SimulationError::Setup(err) => write!(f, "cannot set up run: {err}"),
            SimulationError::Aborted(message) => write!(f, "simulation aborted: {message}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::UndefinedPeriod(err) => Some(err),
            SimulationError::NoTravelTime(err) => Some(err),
            SimulationError::Setup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UndefinedPeriodError> for SimulationError {
    fn from(err: UndefinedPeriodError) -> Self {
        SimulationError::UndefinedPeriod(err)
    }
}

impl From<NoTravelTimeError> for SimulationError {
    fn from(err: NoTravelTimeError) -> Self {
        SimulationError::NoTravelTime(err)
    }
}
