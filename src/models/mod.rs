//! Transit line domain models.
//!
//! The already-validated, in-memory problem definition the rest of the
//! crate consumes: stations with passenger demand, depots with stationed
//! trains and candidate headway configurations, routes, and the
//! travel-time table.
//!
//! # Time Representation
//! All times and durations are integer seconds. Times are measured from
//! midnight of the operating day; the simulation clock starts at `0`.
//!
//! # Identifiers
//! Stations and depots share one node-id namespace (the travel-time table
//! is keyed by node pairs). Routes and trains have their own namespaces.

mod config;
mod depot;
mod line;
mod route;
mod station;
mod time;

pub use config::{DepotConfig, ProblemConfig};
pub use depot::{
    DepotKind, DepotSpec, HeadwayConfiguration, TimePeriodConfiguration, UnknownDepotTypeError,
};
pub use line::{ProblemDefinition, TravelLeg};
pub use route::RouteSpec;
pub use station::{DemandSlot, StationSpec};
pub use time::format_clock;

/// Identifier of a station, depot, route or train.
pub type NodeId = u32;
