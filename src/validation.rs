//! Input validation for transit problem definitions.
//!
//! Checks structural integrity of a [`ProblemDefinition`] before any
//! network is built. Detects:
//! - An empty or inverted operating day
//! - Duplicate IDs (stations and depots share one namespace)
//! - Unknown station, depot and route references
//! - Empty routes and negative durations
//! - Missing depot legs in the travel-time table
//! - Malformed headway and time-period configurations
//!
//! All problems are collected and reported together.

use crate::models::{DepotSpec, NodeId, ProblemDefinition};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Day end is not after day begin.
    InvalidDay,
    /// Two entities share the same ID.
    DuplicateId,
    /// A route or depot references a station that doesn't exist.
    InvalidStationReference,
    /// A route references a depot that doesn't exist.
    InvalidDepotReference,
    /// A depot references a route that doesn't exist.
    InvalidRouteReference,
    /// A route has no stations.
    EmptyRoute,
    /// A duration or time offset is negative.
    NegativeDuration,
    /// A route's depot leg has no travel time.
    MissingTravelTime,
    /// Sequences of a configuration have inconsistent lengths.
    LengthMismatch,
    /// Breakpoints are not strictly increasing.
    UnorderedBreakpoints,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a problem definition.
///
/// Checks:
/// 1. Day end after day begin
/// 2. No duplicate station/depot, route or train IDs
/// 3. All station, depot and route references resolve
/// 4. Routes are non-empty and durations non-negative
/// 5. Every route has travel times for its depot legs
/// 6. Headway configurations have matching min/max lengths
/// 7. Time-period configurations have one window per breakpoint,
///    strictly increasing breakpoints, and one more breakpoint than
///    every headway configuration has headways
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &ProblemDefinition) -> ValidationResult {
    let mut errors = Vec::new();

    if problem.day_end <= problem.day_begin {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDay,
            format!(
                "Day end {} is not after day begin {}",
                problem.day_end, problem.day_begin
            ),
        ));
    }

    // Stations and depots share the node namespace
    let mut node_ids = HashSet::new();
    let mut station_ids = HashSet::new();
    for station in &problem.stations {
        station_ids.insert(station.id);
        if !node_ids.insert(station.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate node ID: {}", station.id),
            ));
        }
        if station.min_dwell < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Station '{}' has negative dwell", station.name),
            ));
        }
    }

    let mut depot_ids = HashSet::new();
    for depot in &problem.depots {
        depot_ids.insert(depot.id);
        if !node_ids.insert(depot.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate node ID: {}", depot.id),
            ));
        }
    }

    let mut route_ids = HashSet::new();
    for route in &problem.routes {
        if !route_ids.insert(route.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate route ID: {}", route.id),
            ));
        }
    }

    let mut train_ids = HashSet::new();
    for depot in &problem.depots {
        for &train in &depot.stationed_trains {
            if !train_ids.insert(train) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate train ID: {train}"),
                ));
            }
        }
    }

    for leg in &problem.travel_times {
        if leg.duration < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Travel time {} -> {} is negative", leg.from, leg.to),
            ));
        }
    }
    let has_leg = |from: NodeId, to: NodeId| {
        problem
            .travel_times
            .iter()
            .any(|leg| leg.from == from && leg.to == to)
    };

    for route in &problem.routes {
        if route.stations.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyRoute,
                format!("Route '{}' has no stations", route.name),
            ));
        }
        for station in &route.stations {
            if !station_ids.contains(station) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidStationReference,
                    format!("Route '{}' references unknown station {station}", route.name),
                ));
            }
        }
        for depot in [route.launch_depot, route.circulating_depot] {
            if !depot_ids.contains(&depot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDepotReference,
                    format!("Route '{}' references unknown depot {depot}", route.name),
                ));
            }
        }
        if route.turnaround < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Route '{}' has negative turnaround", route.name),
            ));
        }
        if let (Some(&first), Some(&last)) = (route.stations.first(), route.stations.last()) {
            for (from, to) in [(route.launch_depot, first), (last, route.circulating_depot)] {
                if !has_leg(from, to) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingTravelTime,
                        format!("Route '{}' needs a travel time {from} -> {to}", route.name),
                    ));
                }
            }
        }
    }

    for depot in &problem.depots {
        if depot.first_launch_at < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Depot '{}' has a negative first launch time", depot.name),
            ));
        }
        for route in &depot.route_sequence {
            if !route_ids.contains(route) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRouteReference,
                    format!("Depot '{}' references unknown route {route}", depot.name),
                ));
            }
        }
        validate_configurations(depot, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the headway and time-period configurations of one depot.
fn validate_configurations(depot: &DepotSpec, errors: &mut Vec<ValidationError>) {
    for (i, config) in depot.headway_configurations.iter().enumerate() {
        let n = config.headways.len();
        if config.period_min_sizes.len() != n || config.period_max_sizes.len() != n {
            errors.push(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!(
                    "Depot '{}' headway configuration {i}: {n} headways but {} min and {} max sizes",
                    depot.name,
                    config.period_min_sizes.len(),
                    config.period_max_sizes.len()
                ),
            ));
        }
        if config.headways.iter().any(|&h| h < 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Depot '{}' headway configuration {i} has a negative headway", depot.name),
            ));
        }
    }

    for (i, config) in depot.time_period_configurations.iter().enumerate() {
        if config.windows.len() != config.breakpoints.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!(
                    "Depot '{}' time-period configuration {i}: {} breakpoints but {} windows",
                    depot.name,
                    config.breakpoints.len(),
                    config.windows.len()
                ),
            ));
        }
        if config.breakpoints.windows(2).any(|w| w[1] <= w[0]) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnorderedBreakpoints,
                format!(
                    "Depot '{}' time-period configuration {i} has non-increasing breakpoints",
                    depot.name
                ),
            ));
        }
        for headways in &depot.headway_configurations {
            if config.breakpoints.len() != headways.headways.len() + 1 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LengthMismatch,
                    format!(
                        "Depot '{}' time-period configuration {i}: {} breakpoints cannot carry {} headways",
                        depot.name,
                        config.breakpoints.len(),
                        headways.headways.len()
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DepotSpec, HeadwayConfiguration, RouteSpec, StationSpec, TimePeriodConfiguration,
    };

    fn sample_problem() -> ProblemDefinition {
        ProblemDefinition::new(0, 7_200)
            .with_station(StationSpec::new(1, "A").with_min_dwell(60))
            .with_station(StationSpec::new(2, "B").with_min_dwell(60))
            .with_depot(
                DepotSpec::new(100, "Yard")
                    .with_train(1)
                    .with_route_sequence(vec![10])
                    .with_headway_configuration(HeadwayConfiguration::new(
                        vec![600, 300],
                        vec![1_800, 1_800],
                        vec![5_400, 5_400],
                    ))
                    .with_time_period_configuration(TimePeriodConfiguration::new(
                        vec![0, 3_600, 7_200],
                        vec![0, 600, 0],
                    )),
            )
            .with_route(RouteSpec::new(10, "A-B", 100).with_stations(vec![1, 2]))
            .with_travel_time(100, 1, 120)
            .with_travel_time(1, 2, 300)
            .with_travel_time(2, 100, 120)
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_problem() {
        assert!(validate_problem(&sample_problem()).is_ok());
    }

    #[test]
    fn test_inverted_day() {
        let mut problem = sample_problem();
        problem.day_end = 0;
        assert_eq!(
            kinds(validate_problem(&problem)),
            vec![ValidationErrorKind::InvalidDay]
        );
    }

    #[test]
    fn test_station_and_depot_share_ids() {
        let problem = sample_problem().with_station(StationSpec::new(100, "Clash"));
        let errors = validate_problem(&problem).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("100")));
    }

    #[test]
    fn test_duplicate_train() {
        let problem = sample_problem().with_depot(DepotSpec::new(200, "East").with_train(1));
        assert_eq!(
            kinds(validate_problem(&problem)),
            vec![ValidationErrorKind::DuplicateId]
        );
    }

    #[test]
    fn test_unknown_references() {
        let mut problem = sample_problem();
        problem.routes[0].stations.push(9);
        problem.routes[0].circulating_depot = 300;
        problem.depots[0].route_sequence.push(77);

        let kinds = kinds(validate_problem(&problem));
        assert!(kinds.contains(&ValidationErrorKind::InvalidStationReference));
        assert!(kinds.contains(&ValidationErrorKind::InvalidDepotReference));
        assert!(kinds.contains(&ValidationErrorKind::InvalidRouteReference));
        assert!(kinds.contains(&ValidationErrorKind::MissingTravelTime));
    }

    #[test]
    fn test_empty_route() {
        let problem = sample_problem().with_route(RouteSpec::new(11, "Empty", 100));
        assert_eq!(
            kinds(validate_problem(&problem)),
            vec![ValidationErrorKind::EmptyRoute]
        );
    }

    #[test]
    fn test_negative_durations() {
        let mut problem = sample_problem();
        problem.stations[0].min_dwell = -1;
        problem.routes[0].turnaround = -5;
        problem.depots[0].first_launch_at = -60;

        let kinds = kinds(validate_problem(&problem));
        assert_eq!(kinds.len(), 3);
        assert!(kinds
            .iter()
            .all(|k| *k == ValidationErrorKind::NegativeDuration));
    }

    #[test]
    fn test_breakpoint_headway_mismatch() {
        let mut problem = sample_problem();
        problem.depots[0].time_period_configurations[0] =
            TimePeriodConfiguration::new(vec![0, 2_400, 4_800, 7_200], vec![0, 600, 600, 0]);
        assert_eq!(
            kinds(validate_problem(&problem)),
            vec![ValidationErrorKind::LengthMismatch]
        );
    }

    #[test]
    fn test_unordered_breakpoints() {
        let mut problem = sample_problem();
        problem.depots[0].time_period_configurations[0].breakpoints = vec![0, 7_200, 3_600];
        assert_eq!(
            kinds(validate_problem(&problem)),
            vec![ValidationErrorKind::UnorderedBreakpoints]
        );
    }

    #[test]
    fn test_multiple_errors() {
        let mut problem = sample_problem();
        problem.depots[0].headway_configurations[0].period_max_sizes.pop();
        problem.depots[0].time_period_configurations[0].windows.pop();
        problem.travel_times.clear();

        let errors = validate_problem(&problem).unwrap_err();
        // Two missing depot legs plus two length mismatches
        assert_eq!(errors.len(), 4);
    }
}
