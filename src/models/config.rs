//! Enumeration of per-depot configuration choices.
//!
//! Every depot lists one or more candidate period partitions and one or
//! more candidate headway sequences. A [`ProblemConfig`] fixes one of each
//! for every depot; [`ProblemDefinition::configurations`] enumerates all
//! such combinations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DepotSpec, NodeId, ProblemDefinition};

/// The configuration chosen for one depot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotConfig {
    /// Period boundaries (seconds since midnight).
    pub breakpoints: Vec<i64>,
    /// Plus-or-minus window per breakpoint (seconds).
    pub windows: Vec<i64>,
    /// Headway per period (seconds).
    pub headways: Vec<i64>,
    /// Minimum period length (seconds).
    pub period_min_sizes: Vec<i64>,
    /// Maximum period length (seconds).
    pub period_max_sizes: Vec<i64>,
}

/// One fixed configuration for every depot of a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Chosen configuration per depot id.
    pub depots: BTreeMap<NodeId, DepotConfig>,
}

impl ProblemConfig {
    /// Headway sequences per depot.
    pub fn headways(&self) -> BTreeMap<NodeId, Vec<i64>> {
        self.depots
            .iter()
            .map(|(&id, config)| (id, config.headways.clone()))
            .collect()
    }
}

impl ProblemDefinition {
    /// Enumerates every combination of per-depot configurations.
    ///
    /// The period-partition choice varies slowest, then the headway
    /// choice; within each, later depots vary fastest. A depot with no
    /// candidates of either kind yields no combinations at all.
    pub fn configurations(&self) -> Vec<ProblemConfig> {
        let period_counts: Vec<usize> = self
            .depots
            .iter()
            .map(|d| d.time_period_configurations.len())
            .collect();
        let headway_counts: Vec<usize> = self
            .depots
            .iter()
            .map(|d| d.headway_configurations.len())
            .collect();

        let period_choices = cartesian(&period_counts);
        let headway_choices = cartesian(&headway_counts);

        let mut configs = Vec::with_capacity(period_choices.len() * headway_choices.len());
        for periods in &period_choices {
            for headways in &headway_choices {
                let depots = self
                    .depots
                    .iter()
                    .enumerate()
                    .map(|(i, depot)| (depot.id, depot_config(depot, periods[i], headways[i])))
                    .collect();
                configs.push(ProblemConfig { depots });
            }
        }
        configs
    }
}

fn depot_config(depot: &DepotSpec, period_choice: usize, headway_choice: usize) -> DepotConfig {
    let periods = &depot.time_period_configurations[period_choice];
    let headways = &depot.headway_configurations[headway_choice];
    DepotConfig {
        breakpoints: periods.breakpoints.clone(),
        windows: periods.windows.clone(),
        headways: headways.headways.clone(),
        period_min_sizes: headways.period_min_sizes.clone(),
        period_max_sizes: headways.period_max_sizes.clone(),
    }
}

/// All index tuples `t` with `t[i] < counts[i]`, last position fastest.
fn cartesian(counts: &[usize]) -> Vec<Vec<usize>> {
    if counts.iter().any(|&c| c == 0) {
        return Vec::new();
    }

    let mut tuples = Vec::new();
    let mut current = vec![0; counts.len()];
    loop {
        tuples.push(current.clone());

        // Odometer increment from the right
        let mut pos = counts.len();
        loop {
            if pos == 0 {
                return tuples;
            }
            pos -= 1;
            current[pos] += 1;
            if current[pos] < counts[pos] {
                break;
            }
            current[pos] = 0;
        }
    }
}
