//! Candidate schedules and their neighbourhood moves.
//!
//! A [`TimePeriodSchedule`] holds, per depot, the headway-period
//! breakpoints being optimized together with two bound families: a value
//! range per breakpoint and a length range per interval. The first and
//! last breakpoints anchor the operating day and never move.
//!
//! [`ScheduleMutation`] perturbs interior breakpoints in place while
//! keeping both bound families satisfied after every move.

mod bounds;
mod mutation;
mod solution;

pub use bounds::Bound;
pub use mutation::{max_step, quantized_step, Direction, MutationKind, ScheduleMutation};
pub use solution::{DepotPeriods, ScheduleError, TimePeriodSchedule};
