//! Headway functions with optional output smoothing.
//!
//! A depot asks its headway function how long to wait before the next
//! dispatch. Raw period values jump at period boundaries; smoothing
//! limits how far consecutive answers may move, so the dispatch interval
//! ramps between periods instead of jumping.

use serde::{Deserialize, Serialize};

use super::{PeriodicFunction, UndefinedPeriodError};

/// Smoothing state: step limit plus the last value handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smoothing {
    step: i64,
    last_value: Option<i64>,
}

impl Smoothing {
    /// Creates smoothing with no retained value.
    pub fn new(step: i64) -> Self {
        Self {
            step: step.abs(),
            last_value: None,
        }
    }

    /// Maximum change between consecutive outputs.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// The last output, if any.
    pub fn last_value(&self) -> Option<i64> {
        self.last_value
    }

    /// Moves the retained value toward `raw` by at most `step`.
    fn advance(&mut self, raw: i64) -> i64 {
        let next = match self.last_value {
            None => raw,
            Some(last) if last >= raw => (last - self.step).max(raw),
            Some(last) => (last + self.step).min(raw),
        };
        self.last_value = Some(next);
        next
    }

    fn reset(&mut self) {
        self.last_value = None;
    }
}

/// A periodic headway function, optionally smoothed.
///
/// Querying is `&mut self` because smoothing remembers its previous
/// output. Call [`reset`](Self::reset) before reusing one instance for an
/// independent simulation run.
///
/// # Example
/// ```
/// use u_transit::rate::{HeadwayFunction, PeriodicFunction};
///
/// let periods = PeriodicFunction::new(vec![0, 100, 200], vec![600, 300]).unwrap();
/// let mut headway = HeadwayFunction::new(periods).with_smoothing(60);
///
/// assert_eq!(headway.value_at(0), Ok(600));
/// assert_eq!(headway.value_at(150), Ok(540));
/// headway.reset();
/// assert_eq!(headway.value_at(150), Ok(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadwayFunction {
    periods: PeriodicFunction,
    smoothing: Option<Smoothing>,
}

impl HeadwayFunction {
    /// Wraps a periodic function without smoothing.
    pub fn new(periods: PeriodicFunction) -> Self {
        Self {
            periods,
            smoothing: None,
        }
    }

    /// Limits the change between consecutive queries to `step` seconds.
    pub fn with_smoothing(mut self, step: i64) -> Self {
        self.smoothing = Some(Smoothing::new(step));
        self
    }

    /// Headway at `time`, smoothed if configured.
    pub fn value_at(&mut self, time: i64) -> Result<i64, UndefinedPeriodError> {
        let raw = self.periods.value_at(time)?;
        Ok(match self.smoothing.as_mut() {
            Some(smoothing) => smoothing.advance(raw),
            None => raw,
        })
    }

    /// Forgets the retained smoothing value.
    pub fn reset(&mut self) {
        if let Some(smoothing) = self.smoothing.as_mut() {
            smoothing.reset();
        }
    }

    /// The underlying periods.
    pub fn periods(&self) -> &PeriodicFunction {
        &self.periods
    }

    /// Smoothing state, if smoothing is enabled.
    pub fn smoothing(&self) -> Option<&Smoothing> {
        self.smoothing.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_periods(v1: i64, v2: i64) -> PeriodicFunction {
        PeriodicFunction::new(vec![0, 1_000, 2_000], vec![v1, v2]).unwrap()
    }

    #[test]
    fn test_unsmoothed_passes_through() {
        let mut f = HeadwayFunction::new(two_periods(600, 120));
        assert_eq!(f.value_at(0), Ok(600));
        assert_eq!(f.value_at(1_000), Ok(120));
        assert!(f.smoothing().is_none());
    }

    #[test]
    fn test_smoothing_limits_change() {
        let step = 60;
        for &(v1, v2) in &[(600, 120), (120, 600), (300, 330), (330, 300), (400, 400)] {
            let mut f = HeadwayFunction::new(two_periods(v1, v2)).with_smoothing(step);
            let first = f.value_at(0).unwrap();
            let second = f.value_at(1_000).unwrap();

            assert_eq!(first, v1);
            assert!((second - v1).abs() <= step);
            // Never overshoots past the raw target
            assert!((second - v2).abs() >= (v2 - v1).abs() - step);
            assert!((second - v2).abs() <= (v2 - v1).abs());
        }
    }

    #[test]
    fn test_smoothing_converges() {
        let mut f = HeadwayFunction::new(two_periods(600, 300)).with_smoothing(100);
        f.value_at(0).unwrap();
        let outputs: Vec<i64> = (0..5).map(|_| f.value_at(1_500).unwrap()).collect();
        assert_eq!(outputs, vec![500, 400, 300, 300, 300]);
    }

    #[test]
    fn test_reset_returns_raw_value() {
        let mut f = HeadwayFunction::new(two_periods(600, 120)).with_smoothing(60);
        f.value_at(0).unwrap();
        assert_eq!(f.value_at(1_000), Ok(540));

        f.reset();
        assert_eq!(f.smoothing().and_then(|s| s.last_value()), None);
        assert_eq!(f.value_at(1_000), Ok(120));
    }

    #[test]
    fn test_undefined_period_keeps_state() {
        let mut f = HeadwayFunction::new(two_periods(600, 120)).with_smoothing(60);
        f.value_at(0).unwrap();
        assert!(f.value_at(5_000).is_err());
        assert_eq!(f.smoothing().and_then(|s| s.last_value()), Some(600));
    }
}
