//! Cumulative passenger arrivals.
//!
//! Built from a demand series by prefix-summing slot counts. The curve is
//! anchored at `f(day_begin) = 0` and `f(day_end) = total demand` and
//! interpolated linearly between knots, which models passengers arriving
//! uniformly within each slot.

use serde::{Deserialize, Serialize};

use crate::models::DemandSlot;

/// Monotone piecewise-linear cumulative arrival curve.
///
/// Queries outside `[day_begin, day_end]` are clamped to the nearest
/// anchor.
///
/// # Example
/// ```
/// use u_transit::models::DemandSlot;
/// use u_transit::rate::CumulativeArrivals;
///
/// let f = CumulativeArrivals::new(0, 1_200, &[DemandSlot::new(600, 10)]);
/// assert_eq!(f.value_at(0), 0.0);
/// assert_eq!(f.value_at(300), 5.0);
/// assert_eq!(f.value_at(1_200), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeArrivals {
    /// `(time, cumulative passengers)` with strictly increasing time.
    knots: Vec<(i64, f64)>,
}

impl CumulativeArrivals {
    /// Builds the curve from a demand series.
    ///
    /// Slots are sorted by time. Slots at or before `day_begin` fold into
    /// the first knot after it; slots at or after `day_end` fold into the
    /// final anchor. Slots sharing a timestamp are summed.
    pub fn new(day_begin: i64, day_end: i64, demand: &[DemandSlot]) -> Self {
        let day_end = day_end.max(day_begin);
        let mut slots = demand.to_vec();
        slots.sort_by_key(|slot| slot.time);

        let mut knots: Vec<(i64, f64)> = vec![(day_begin, 0.0)];
        let mut total = 0.0;
        for slot in &slots {
            total += slot.passengers as f64;
            let time = slot.time.clamp(day_begin, day_end);
            if time <= day_begin || time >= day_end {
                continue;
            }
            match knots.last_mut() {
                Some(last) if last.0 == time => last.1 = total,
                _ => knots.push((time, total)),
            }
        }

        if day_end > day_begin {
            knots.push((day_end, total));
        } else if let Some(first) = knots.first_mut() {
            // Degenerate day: one knot carrying everything
            first.1 = total;
        }

        Self { knots }
    }

    /// Passengers arrived by `time`.
    pub fn value_at(&self, time: i64) -> f64 {
        let (Some(&(first_t, first_v)), Some(&(last_t, last_v))) =
            (self.knots.first(), self.knots.last())
        else {
            return 0.0;
        };
        if time <= first_t {
            return first_v;
        }
        if time >= last_t {
            return last_v;
        }

        // First knot strictly after `time`; its predecessor is at or before
        let upper = self.knots.partition_point(|&(t, _)| t <= time);
        let (t0, v0) = self.knots[upper - 1];
        let (t1, v1) = self.knots[upper];
        v0 + (v1 - v0) * (time - t0) as f64 / (t1 - t0) as f64
    }

    /// Total passengers over the day.
    pub fn total(&self) -> f64 {
        self.knots.last().map_or(0.0, |&(_, v)| v)
    }

    /// Start of the covered domain.
    pub fn day_begin(&self) -> i64 {
        self.knots.first().map_or(0, |&(t, _)| t)
    }

    /// End of the covered domain.
    pub fn day_end(&self) -> i64 {
        self.knots.last().map_or(0, |&(t, _)| t)
    }
}
