//! Evaluation and search configuration.

use std::time::Duration;

use u_metaheur::sa::SaConfig;

/// Objective assigned to schedules that cannot be simulated to completion.
pub const INFEASIBLE_COST: f64 = 2_147_483_648.0;

/// How candidate schedules are evaluated.
///
/// # Examples
///
/// ```
/// use u_transit::evaluation::EvaluationConfig;
///
/// let config = EvaluationConfig::default()
///     .with_smoothing_step(Some(120))
///     .with_infeasible_cost(1e12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Maximum headway change between consecutive dispatches, `None` for
    /// raw period values.
    pub smoothing_step: Option<i64>,
    /// Objective of a failed run.
    pub infeasible_cost: f64,
    /// Whether a panicking run is mapped to the infeasible cost instead of
    /// unwinding into the caller.
    pub catch_panics: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            smoothing_step: Some(60),
            infeasible_cost: INFEASIBLE_COST,
            catch_panics: true,
        }
    }
}

impl EvaluationConfig {
    /// Sets the headway smoothing step, `None` to disable smoothing.
    pub fn with_smoothing_step(mut self, step: Option<i64>) -> Self {
        self.smoothing_step = step;
        self
    }

    /// Sets the cost reported for failed runs.
    pub fn with_infeasible_cost(mut self, cost: f64) -> Self {
        self.infeasible_cost = cost;
        self
    }

    /// Sets whether panics inside a run are caught.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(step) = self.smoothing_step {
            if step <= 0 {
                return Err(format!("smoothing_step must be positive, got {step}"));
            }
        }
        if !self.infeasible_cost.is_finite() {
            return Err("infeasible_cost must be finite".into());
        }
        Ok(())
    }
}

/// Configuration of the annealing search over schedules.
///
/// One annealing run is started per entry of `probabilities`; each run
/// generates neighbours with all-slot mutation at that probability.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_metaheur::sa::SaConfig;
/// use u_transit::evaluation::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_annealing(SaConfig::default().with_max_iterations(500))
///     .with_probabilities(vec![0.2, 0.5])
///     .with_time_limit(Duration::from_secs(30))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Annealing parameters shared by every run.
    pub annealing: SaConfig,
    /// All-slot mutation probability per run.
    pub probabilities: Vec<f64>,
    /// Steps are truncated to multiples of this many seconds.
    pub time_quantum: i64,
    /// Run the annealing runs on the rayon pool.
    pub parallel: bool,
    /// Wall-clock budget for the whole search.
    pub time_limit: Option<Duration>,
    /// Base seed; run `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            annealing: SaConfig::default()
                .with_initial_temperature(1_000.0)
                .with_min_temperature(1.0)
                .with_max_iterations(1_000),
            probabilities: vec![0.3],
            time_quantum: 600,
            parallel: true,
            time_limit: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Sets the annealing schedule shared by all runs.
    pub fn with_annealing(mut self, annealing: SaConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Sets one all-slot probability per run.
    pub fn with_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.probabilities = probabilities;
        self
    }

    /// Sets the move granularity in seconds.
    pub fn with_time_quantum(mut self, seconds: i64) -> Self {
        self.time_quantum = seconds;
        self
    }

    /// Runs the annealing runs on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Cancels unfinished runs after `limit`.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Seeds run `i` with `seed + i`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.annealing.validate()?;
        if self.probabilities.is_empty() {
            return Err("at least one mutation probability is required".into());
        }
        if let Some(p) = self
            .probabilities
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(format!("mutation probability must be in [0, 1], got {p}"));
        }
        if self.time_quantum <= 0 {
            return Err(format!(
                "time_quantum must be positive, got {}",
                self.time_quantum
            ));
        }
        Ok(())
    }
}
