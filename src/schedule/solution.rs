//! Candidate headway-period schedules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Bound;
use crate::models::{format_clock, NodeId, ProblemConfig};
use crate::rate::PeriodicFunction;

/// A schedule could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Fewer than two breakpoints, so no period at all.
    NoPeriods { depot: NodeId },
    /// Bound sequences do not match the breakpoint count.
    ShapeMismatch {
        depot: NodeId,
        breakpoints: usize,
        value_bounds: usize,
        interval_bounds: usize,
    },
    /// Breakpoint `index` does not exceed its predecessor.
    NotIncreasing { depot: NodeId, index: usize },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::NoPeriods { depot } => {
                write!(f, "depot {depot} needs at least two breakpoints")
            }
            ScheduleError::ShapeMismatch {
                depot,
                breakpoints,
                value_bounds,
                interval_bounds,
            } => write!(
                f,
                "depot {depot}: {breakpoints} breakpoints need as many value bounds and one \
                 interval bound fewer, got {value_bounds} and {interval_bounds}"
            ),
            ScheduleError::NotIncreasing { depot, index } => {
                write!(f, "depot {depot}: breakpoint {index} is not after its predecessor")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Breakpoints of one depot and their two bound families.
///
/// Breakpoint `i` must stay within `value_bounds[i]`; interval `j`, the
/// gap between breakpoints `j` and `j + 1`, must stay within
/// `interval_bounds[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotPeriods {
    breakpoints: Vec<i64>,
    value_bounds: Vec<Bound>,
    interval_bounds: Vec<Bound>,
}

impl DepotPeriods {
    /// Checks shapes and strict ordering.
    pub fn new(
        depot: NodeId,
        breakpoints: Vec<i64>,
        value_bounds: Vec<Bound>,
        interval_bounds: Vec<Bound>,
    ) -> Result<Self, ScheduleError> {
        if breakpoints.len() < 2 {
            return Err(ScheduleError::NoPeriods { depot });
        }
        if value_bounds.len() != breakpoints.len() || interval_bounds.len() + 1 != breakpoints.len()
        {
            return Err(ScheduleError::ShapeMismatch {
                depot,
                breakpoints: breakpoints.len(),
                value_bounds: value_bounds.len(),
                interval_bounds: interval_bounds.len(),
            });
        }
        if let Some(index) = breakpoints.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ScheduleError::NotIncreasing {
                depot,
                index: index + 1,
            });
        }
        Ok(Self {
            breakpoints,
            value_bounds,
            interval_bounds,
        })
    }

    /// Breakpoint times, ascending.
    pub fn breakpoints(&self) -> &[i64] {
        &self.breakpoints
    }

    /// Bound of each breakpoint.
    pub fn value_bounds(&self) -> &[Bound] {
        &self.value_bounds
    }

    /// Bound of each interval length.
    pub fn interval_bounds(&self) -> &[Bound] {
        &self.interval_bounds
    }

    /// Length of interval `j`.
    pub fn interval_length(&self, j: usize) -> i64 {
        self.breakpoints[j + 1] - self.breakpoints[j]
    }

    /// Number of periods.
    pub fn period_count(&self) -> usize {
        self.breakpoints.len() - 1
    }

    /// Whether every breakpoint and interval lies within its bound.
    pub fn is_within_bounds(&self) -> bool {
        let values_ok = self
            .breakpoints
            .iter()
            .zip(&self.value_bounds)
            .all(|(&t, bound)| bound.contains(t));
        let intervals_ok = (0..self.period_count())
            .all(|j| self.interval_bounds[j].contains(self.interval_length(j)));
        values_ok && intervals_ok
    }

    pub(crate) fn shift(&mut self, slot: usize, delta: i64) {
        self.breakpoints[slot] += delta;
    }
}

/// A candidate solution: per-depot breakpoints plus evaluation results.
///
/// The search owns schedules; evaluation only reads breakpoints and writes
/// the objective and the headway functions that produced it.
///
/// # Example
/// ```
/// use u_transit::schedule::{Bound, DepotPeriods, TimePeriodSchedule};
///
/// let periods = DepotPeriods::new(
///     100,
///     vec![0, 3_600, 7_200],
///     vec![Bound::new(0, 0), Bound::around(3_600, 600), Bound::new(7_200, 7_200)],
///     vec![Bound::new(1_800, 5_400), Bound::new(1_800, 5_400)],
/// )
/// .unwrap();
/// let schedule = TimePeriodSchedule::new().with_depot(100, periods);
///
/// assert!(schedule.is_within_bounds());
/// assert_eq!(schedule.objective(), None);
/// assert_eq!(schedule.to_string(), "{100: [00:00:00, 01:00:00, 02:00:00]}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriodSchedule {
    depots: BTreeMap<NodeId, DepotPeriods>,
    objective: Option<f64>,
    headway_functions: Option<BTreeMap<NodeId, PeriodicFunction>>,
}

impl TimePeriodSchedule {
    /// Creates a schedule without depots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the periods of `depot`.
    pub fn with_depot(mut self, depot: NodeId, periods: DepotPeriods) -> Self {
        self.depots.insert(depot, periods);
        self
    }

    /// Derives bounds from a configuration.
    ///
    /// Breakpoint `i` may move within `breakpoints[i] ± windows[i]`;
    /// interval `j` must stay within
    /// `[period_min_sizes[j], period_max_sizes[j]]`.
    pub fn from_config(config: &ProblemConfig) -> Result<Self, ScheduleError> {
        let mut schedule = Self::new();
        for (&depot, depot_config) in &config.depots {
            let value_bounds = depot_config
                .breakpoints
                .iter()
                .zip(&depot_config.windows)
                .map(|(&t, &w)| Bound::around(t, w))
                .collect();
            let interval_bounds = depot_config
                .period_min_sizes
                .iter()
                .zip(&depot_config.period_max_sizes)
                .map(|(&lower, &upper)| Bound::new(lower, upper))
                .collect();
            let periods = DepotPeriods::new(
                depot,
                depot_config.breakpoints.clone(),
                value_bounds,
                interval_bounds,
            )?;
            schedule.depots.insert(depot, periods);
        }
        Ok(schedule)
    }

    /// Periods of every depot.
    pub fn depots(&self) -> &BTreeMap<NodeId, DepotPeriods> {
        &self.depots
    }

    /// Periods of `depot`.
    pub fn depot(&self, depot: NodeId) -> Option<&DepotPeriods> {
        self.depots.get(&depot)
    }

    pub(crate) fn depots_mut(&mut self) -> impl Iterator<Item = &mut DepotPeriods> + '_ {
        self.depots.values_mut()
    }

    /// Waiting cost of the last evaluation, lower is better.
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Records the objective of an evaluation.
    pub fn set_objective(&mut self, objective: f64) {
        self.objective = Some(objective);
    }

    /// Headway functions used by the last evaluation.
    pub fn headway_functions(&self) -> Option<&BTreeMap<NodeId, PeriodicFunction>> {
        self.headway_functions.as_ref()
    }

    /// Records the headway functions of an evaluation.
    pub fn set_headway_functions(&mut self, functions: BTreeMap<NodeId, PeriodicFunction>) {
        self.headway_functions = Some(functions);
    }

    /// Drops evaluation results, e.g. after the breakpoints changed.
    pub fn clear_evaluation(&mut self) {
        self.objective = None;
        self.headway_functions = None;
    }

    /// Whether every depot satisfies both bound families.
    pub fn is_within_bounds(&self) -> bool {
        self.depots.values().all(DepotPeriods::is_within_bounds)
    }
}

impl fmt::Display for TimePeriodSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (depot, periods)) in self.depots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let clocks: Vec<String> = periods.breakpoints.iter().map(|&t| format_clock(t)).collect();
            write!(f, "{depot}: [{}]", clocks.join(", "))?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepotConfig;

    fn config() -> ProblemConfig {
        let mut config = ProblemConfig::default();
        config.depots.insert(
            100,
            DepotConfig {
                breakpoints: vec![0, 3_600, 7_200, 10_800],
                windows: vec![0, 1_200, 1_200, 0],
                headways: vec![600, 300, 600],
                period_min_sizes: vec![1_800, 1_800, 1_800],
                period_max_sizes: vec![5_400, 5_400, 5_400],
            },
        );
        config
    }

    #[test]
    fn test_from_config_bounds() {
        let schedule = TimePeriodSchedule::from_config(&config()).unwrap();
        let periods = schedule.depot(100).unwrap();

        assert_eq!(periods.value_bounds()[0], Bound::new(0, 0));
        assert_eq!(periods.value_bounds()[1], Bound::new(2_400, 4_800));
        assert_eq!(periods.interval_bounds()[2], Bound::new(1_800, 5_400));
        assert_eq!(periods.interval_length(1), 3_600);
        assert_eq!(periods.period_count(), 3);
        assert!(schedule.is_within_bounds());
    }

    #[test]
    fn test_shape_mismatch() {
        let mut config = config();
        config.depots.get_mut(&100).unwrap().period_max_sizes.pop();
        let err = TimePeriodSchedule::from_config(&config).unwrap_err();
        assert!(matches!(err, ScheduleError::ShapeMismatch { depot: 100, .. }));
    }

    #[test]
    fn test_not_increasing() {
        let err = DepotPeriods::new(
            7,
            vec![0, 600, 600],
            vec![Bound::new(0, 0); 3],
            vec![Bound::new(0, 600); 2],
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::NotIncreasing { depot: 7, index: 2 });
    }

    #[test]
    fn test_out_of_bounds_detected() {
        let periods = DepotPeriods::new(
            1,
            vec![0, 1_000, 2_000],
            vec![Bound::new(0, 0), Bound::new(900, 1_100), Bound::new(2_000, 2_000)],
            vec![Bound::new(1_200, 2_000), Bound::new(0, 2_000)],
        )
        .unwrap();
        assert!(!periods.is_within_bounds());
    }

    #[test]
    fn test_evaluation_fields() {
        let mut schedule = TimePeriodSchedule::from_config(&config()).unwrap();
        schedule.set_objective(12.5);
        let mut functions = BTreeMap::new();
        functions.insert(100, PeriodicFunction::constant(0, 10_800, 600));
        schedule.set_headway_functions(functions);

        assert_eq!(schedule.objective(), Some(12.5));
        assert!(schedule.headway_functions().is_some());
        schedule.clear_evaluation();
        assert_eq!(schedule.objective(), None);
        assert!(schedule.headway_functions().is_none());
    }

    #[test]
    fn test_display_clock_times() {
        let schedule = TimePeriodSchedule::from_config(&config()).unwrap();
        assert_eq!(
            schedule.to_string(),
            "{100: [00:00:00, 01:00:00, 02:00:00, 03:00:00]}"
        );
    }
}
