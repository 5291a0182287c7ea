//! Bounded neighbourhood moves on breakpoints.
//!
//! Each move shifts one interior breakpoint left or right by a random
//! multiple of the time quantum. The largest admissible step is computed
//! up front from both bound families, so a moved schedule never needs
//! repair or rejection.
//!
//! # Step size
//! Moving breakpoint `i` left shrinks interval `i - 1` and grows interval
//! `i`; moving right does the opposite. The admissible step is the least
//! of the shrinking interval's room above its minimum, the growing
//! interval's room below its maximum, and the breakpoint's own room
//! toward its value bound. A non-positive room yields a zero step.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! (neighbourhood moves for trajectory search)

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{DepotPeriods, TimePeriodSchedule};

/// Direction of a breakpoint move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Earlier in the day.
    Left,
    /// Later in the day.
    Right,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Which breakpoints a mutation touches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    /// One uniformly chosen interior breakpoint per depot.
    SingleSlot,
    /// Every interior breakpoint independently with `probability`.
    AllSlots { probability: f64 },
}

/// A bounded random mutation of a schedule.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_transit::schedule::{Bound, DepotPeriods, ScheduleMutation, TimePeriodSchedule};
///
/// let periods = DepotPeriods::new(
///     1,
///     vec![0, 3_600, 7_200],
///     vec![Bound::new(0, 0), Bound::around(3_600, 1_800), Bound::new(7_200, 7_200)],
///     vec![Bound::new(1_200, 6_000), Bound::new(1_200, 6_000)],
/// )
/// .unwrap();
/// let mut schedule = TimePeriodSchedule::new().with_depot(1, periods);
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// ScheduleMutation::all_slots(0.5).apply(&mut schedule, &mut rng);
/// assert!(schedule.is_within_bounds());
/// assert_eq!(schedule.depot(1).unwrap().breakpoints()[1] % 600, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMutation {
    pub kind: MutationKind,
    /// Steps are truncated to multiples of this many seconds.
    pub time_quantum: i64,
}

impl Default for ScheduleMutation {
    fn default() -> Self {
        Self {
            kind: MutationKind::SingleSlot,
            time_quantum: 600,
        }
    }
}

impl ScheduleMutation {
    /// Moves one random breakpoint per application.
    pub fn single_slot() -> Self {
        Self::default()
    }

    /// Moves each breakpoint with `probability`.
    pub fn all_slots(probability: f64) -> Self {
        Self {
            kind: MutationKind::AllSlots { probability },
            ..Self::default()
        }
    }

    /// Truncates moves to multiples of `seconds`.
    pub fn with_time_quantum(mut self, seconds: i64) -> Self {
        self.time_quantum = seconds;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_quantum <= 0 {
            return Err(format!(
                "time_quantum must be positive, got {}",
                self.time_quantum
            ));
        }
        if let MutationKind::AllSlots { probability } = self.kind {
            if !(0.0..=1.0).contains(&probability) {
                return Err(format!("probability must be in [0, 1], got {probability}"));
            }
        }
        Ok(())
    }

    /// Mutates `schedule` in place and clears its evaluation results.
    ///
    /// Depots with no interior breakpoint are left untouched.
    pub fn apply<R: Rng>(&self, schedule: &mut TimePeriodSchedule, rng: &mut R) {
        for periods in schedule.depots_mut() {
            let count = periods.breakpoints().len();
            if count < 3 {
                continue;
            }
            match self.kind {
                MutationKind::SingleSlot => {
                    let slot = rng.random_range(1..count - 1);
                    self.step(periods, slot, rng);
                }
                MutationKind::AllSlots { probability } => {
                    for slot in 1..count - 1 {
                        if rng.random::<f64>() < probability {
                            self.step(periods, slot, rng);
                        }
                    }
                }
            }
        }
        schedule.clear_evaluation();
    }

    /// One bounded random step of breakpoint `slot`.
    fn step<R: Rng>(&self, periods: &mut DepotPeriods, slot: usize, rng: &mut R) {
        let direction = if rng.random_bool(0.5) {
            Direction::Left
        } else {
            Direction::Right
        };
        let room = max_step(periods, slot, direction);
        let fraction: f64 = rng.random();
        let delta = direction.sign() * quantized_step(fraction, room, self.time_quantum);
        periods.shift(slot, delta);
    }
}

/// Largest admissible shift of interior breakpoint `slot`.
///
/// May be zero or negative when the breakpoint cannot move that way.
pub fn max_step(periods: &DepotPeriods, slot: usize, direction: Direction) -> i64 {
    let left = slot - 1;
    let right = slot;
    let left_len = periods.interval_length(left);
    let right_len = periods.interval_length(right);
    let left_bound = periods.interval_bounds()[left];
    let right_bound = periods.interval_bounds()[right];
    let value = periods.breakpoints()[slot];
    let value_bound = periods.value_bounds()[slot];

    match direction {
        Direction::Left => left_bound
            .room_below(left_len)
            .min(right_bound.room_above(right_len))
            .min(value_bound.room_below(value)),
        Direction::Right => left_bound
            .room_above(left_len)
            .min(right_bound.room_below(right_len))
            .min(value_bound.room_above(value)),
    }
}

/// `fraction * room` truncated to a multiple of `quantum`; zero when
/// `room` is not positive.
pub fn quantized_step(fraction: f64, room: i64, quantum: i64) -> i64 {
    if room <= 0 {
        return 0;
    }
    let quantum = quantum.max(1);
    let raw = (fraction.clamp(0.0, 1.0) * room as f64) as i64;
    (raw - raw % quantum).min(room)
}
