//! Rail-transit dispatch simulation and headway-period optimization.
//!
//! Simulates one operating day of a transit line: depots release trains
//! at time-varying headways, trains run their routes station by station,
//! and stations accrue passenger waiting cost from cumulative demand. The
//! total waiting cost is the objective of a search over the breakpoints
//! that divide the day into headway periods.
//!
//! # Modules
//!
//! - **`models`**: Problem definition — `ProblemDefinition`, `StationSpec`,
//!   `DepotSpec`, `RouteSpec`, configuration enumeration
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, malformed configurations)
//! - **`rate`**: Periodic rate functions, headway smoothing, cumulative
//!   arrival curves
//! - **`network`**: Runtime stations, routes, depots and trains
//! - **`simulation`**: Discrete-event engine with depot and train processes
//! - **`schedule`**: Breakpoint schedules with value and interval bounds,
//!   bounded mutation moves
//! - **`evaluation`**: Schedule-to-cost evaluation, run reports, annealing
//!   search
//!
//! # Architecture
//!
//! The search loop itself (cooling, acceptance, cancellation) comes from
//! `u-metaheur`; this crate supplies the transit domain and the cost
//! function.
//!
//! # References
//!
//! - Ceder (2016), "Public Transit Planning and Operation"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

pub mod evaluation;
pub mod models;
pub mod network;
pub mod rate;
pub mod schedule;
pub mod simulation;
pub mod validation;
