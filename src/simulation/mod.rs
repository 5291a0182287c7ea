//! Discrete-event simulation of one operating day.
//!
//! Depots and trains are cooperative processes on a single virtual clock.
//! Each process is a state machine that runs until its next timed wait
//! (first launch, depot-out running, headway, dwell, travel, turnaround)
//! and then yields a wake-up time to the [`Agenda`]. Wake-ups sharing a
//! time fire in the order they were scheduled, which keeps objective
//! values reproducible.
//!
//! # Processes
//! - **Depot**: pops the most recently returned train, assigns the next
//!   route of its cyclic sequence, logs the departure, optionally waits the
//!   depot-out running time, launches the train, and waits one headway.
//! - **Train**: arrives at the first station, then dwells, departs and
//!   travels station by station; after the last station it waits the
//!   longer of turnaround and depot running time, and returns to the
//!   circulating depot's pool.
//!
//! # Cost
//! Stations accrue waiting cost on every departure; a completed run
//! reports the sum over all stations. Any [`SimulationError`] aborts the
//! run.

mod agenda;
mod engine;
mod error;
mod process;

pub use agenda::Agenda;
pub use engine::{run, RunSummary, Simulation};
pub use error::{MissingBinding, SimulationError};
pub use process::{Context, DepotProcess, Process, Step, TrainProcess};
