//! Per-run network entities.
//!
//! All mutable simulation state (pools, counters, accumulators and logs)
//! lives on these structs. Cross references are registry handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{DepotIdx, RouteIdx, StationIdx, TrainAction, TrainEvent, TrainIdx, TripLog};
use crate::models::{DepotKind, NodeId};
use crate::rate::{CumulativeArrivals, DwellFunction, HeadwayFunction, UndefinedPeriodError};

/// Extension hook called when a train arrives at a station.
///
/// Receives the station, the arriving train's id and the arrival time.
pub type ArrivalHook = Arc<dyn Fn(&Station, NodeId, i64) + Send + Sync>;

/// A station accruing passenger waiting cost.
#[derive(Clone)]
pub struct Station {
    id: NodeId,
    name: String,
    arrivals: Arc<CumulativeArrivals>,
    dwell: DwellFunction,
    accumulated_waiting: f64,
    last_departure_time: i64,
    departure_times: Vec<i64>,
    arrival_hook: Option<ArrivalHook>,
}

impl Station {
    /// Creates a station whose waiting clock starts at `day_begin`.
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        arrivals: Arc<CumulativeArrivals>,
        day_begin: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            arrivals,
            dwell: DwellFunction::default(),
            accumulated_waiting: 0.0,
            last_departure_time: day_begin,
            departure_times: Vec::new(),
            arrival_hook: None,
        }
    }

    /// Sets a constant dwell.
    pub fn with_dwell(mut self, seconds: i64) -> Self {
        self.dwell = DwellFunction::Constant(seconds);
        self
    }

    /// Replaces the dwell function.
    pub fn set_dwell_function(&mut self, dwell: DwellFunction) {
        self.dwell = dwell;
    }

    /// Installs an arrival hook.
    pub fn set_arrival_hook(&mut self, hook: ArrivalHook) {
        self.arrival_hook = Some(hook);
    }

    /// Dwell for a train stopping at `time`.
    pub fn dwell_at(&self, time: i64) -> Result<i64, UndefinedPeriodError> {
        self.dwell.at(time)
    }

    /// Arrival notification. Performs no accounting.
    pub fn on_arrival(&self, train: NodeId, now: i64) {
        if let Some(hook) = &self.arrival_hook {
            hook(self, train, now);
        }
    }

    /// Departure notification: accrues the waiting cost since the
    /// previous departure and records `now`.
    ///
    /// Passengers arriving uniformly between two departures wait half the
    /// gap on average, so the accrued person-seconds are
    /// `gap * (A(now) - A(last)) / 2`.
    pub fn on_departure(&mut self, now: i64) {
        let gap = (now - self.last_departure_time) as f64;
        let boarded =
            self.arrivals.value_at(now) - self.arrivals.value_at(self.last_departure_time);
        self.accumulated_waiting += gap * boarded / 2.0;
        self.last_departure_time = now;
        self.departure_times.push(now);
    }

    /// Station id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Station name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Person-seconds waited so far.
    pub fn accumulated_waiting(&self) -> f64 {
        self.accumulated_waiting
    }

    /// Time of the last departure, or the day begin.
    pub fn last_departure_time(&self) -> i64 {
        self.last_departure_time
    }

    /// Departure times in order.
    pub fn departure_times(&self) -> &[i64] {
        &self.departure_times
    }

    /// Cumulative passenger arrivals.
    pub fn arrivals(&self) -> &CumulativeArrivals {
        &self.arrivals
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("dwell", &self.dwell)
            .field("accumulated_waiting", &self.accumulated_waiting)
            .field("last_departure_time", &self.last_departure_time)
            .field("departures", &self.departure_times.len())
            .field("arrival_hook", &self.arrival_hook.is_some())
            .finish()
    }
}

/// A fixed station sequence served from a launch depot.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) stations: Vec<StationIdx>,
    pub(crate) launch_depot: DepotIdx,
    pub(crate) circulating_depot: DepotIdx,
    pub(crate) turnaround: i64,
    pub(crate) depot_to_first_station: i64,
    pub(crate) last_station_to_depot: i64,
}

impl Route {
    /// Route id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stations in travel order. Never empty.
    pub fn stations(&self) -> &[StationIdx] {
        &self.stations
    }

    /// Depot dispatching onto this route.
    pub fn launch_depot(&self) -> DepotIdx {
        self.launch_depot
    }

    /// Depot whose pool receives trains after the last station.
    pub fn circulating_depot(&self) -> DepotIdx {
        self.circulating_depot
    }

    /// Turnaround at the last station, in seconds.
    pub fn turnaround(&self) -> i64 {
        self.turnaround
    }

    /// Empty-running time from the launch depot to the first station.
    pub fn depot_to_first_station(&self) -> i64 {
        self.depot_to_first_station
    }

    /// Running time from the last station to the circulating depot.
    pub fn last_station_to_depot(&self) -> i64 {
        self.last_station_to_depot
    }
}

/// A depot dispatching trains from its stationed pool.
#[derive(Debug, Clone)]
pub struct Depot {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: DepotKind,
    pub(crate) first_launch_at: i64,
    pub(crate) headway: Option<HeadwayFunction>,
    pub(crate) route_sequence: Option<Vec<RouteIdx>>,
    pub(crate) pool: Vec<TrainIdx>,
    pub(crate) initial_train_count: usize,
    pub(crate) trains_launched: usize,
    pub(crate) departure_times: Vec<i64>,
}

impl Depot {
    /// Creates an empty depot starting to dispatch at `first_launch_at`.
    pub fn new(id: NodeId, name: impl Into<String>, kind: DepotKind, first_launch_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            first_launch_at,
            headway: None,
            route_sequence: None,
            pool: Vec::new(),
            initial_train_count: 0,
            trains_launched: 0,
            departure_times: Vec::new(),
        }
    }

    /// Puts a train on top of the pool; it leaves next.
    pub fn push_train(&mut self, train: TrainIdx) {
        self.pool.push(train);
    }

    /// Takes the most recently returned train.
    pub fn pop_train(&mut self) -> Option<TrainIdx> {
        self.pool.pop()
    }

    /// Depot id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Depot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch discipline.
    pub fn kind(&self) -> DepotKind {
        self.kind
    }

    /// Time of the first dispatch.
    pub fn first_launch_at(&self) -> i64 {
        self.first_launch_at
    }

    /// Bound headway function, if any.
    pub fn headway(&self) -> Option<&HeadwayFunction> {
        self.headway.as_ref()
    }

    /// Routes dispatched onto, cycled in order.
    pub fn route_sequence(&self) -> Option<&[RouteIdx]> {
        self.route_sequence.as_deref()
    }

    /// Stationed trains, bottom of the stack first.
    pub fn pool(&self) -> &[TrainIdx] {
        &self.pool
    }

    /// Pool size when the depot started dispatching.
    pub fn initial_train_count(&self) -> usize {
        self.initial_train_count
    }

    /// Dispatches made so far.
    pub fn trains_launched(&self) -> usize {
        self.trains_launched
    }

    /// Dispatch times in order.
    pub fn departure_times(&self) -> &[i64] {
        &self.departure_times
    }
}

/// A train cycling between depots and routes.
#[derive(Debug, Clone)]
pub struct Train {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) depot: DepotIdx,
    pub(crate) route: Option<RouteIdx>,
    pub(crate) trip: u64,
    pub(crate) log: BTreeMap<u64, TripLog>,
}

impl Train {
    /// Creates an idle train stationed at `depot`.
    pub fn new(id: NodeId, name: impl Into<String>, depot: DepotIdx) -> Self {
        Self {
            id,
            name: name.into(),
            depot,
            route: None,
            trip: 0,
            log: BTreeMap::new(),
        }
    }

    /// Starts a new trip on `route`.
    pub(crate) fn assign(&mut self, trip: u64, route: RouteIdx) {
        self.trip = trip;
        self.route = Some(route);
    }

    /// Appends an event to the current trip, opening its log on first use.
    pub(crate) fn record(&mut self, route_name: &str, event: TrainEvent) {
        self.log
            .entry(self.trip)
            .or_insert_with(|| TripLog {
                route: route_name.to_string(),
                events: Vec::new(),
            })
            .events
            .push(event);
    }

    /// Train id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Train name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Depot the train was initially stationed at.
    pub fn home_depot(&self) -> DepotIdx {
        self.depot
    }

    /// Route being run, `None` while idle.
    pub fn route(&self) -> Option<RouteIdx> {
        self.route
    }

    /// Current trip number, `0` before the first dispatch.
    pub fn trip(&self) -> u64 {
        self.trip
    }

    /// Event log keyed by trip number.
    pub fn log(&self) -> &BTreeMap<u64, TripLog> {
        &self.log
    }

    /// Events of trip `trip`.
    pub fn trip_events(&self, trip: u64) -> Option<&[TrainEvent]> {
        self.log.get(&trip).map(|log| log.events.as_slice())
    }

    /// Actions of trip `trip`, in order.
    pub fn trip_actions(&self, trip: u64) -> Vec<TrainAction> {
        self.trip_events(trip)
            .map(|events| events.iter().map(|e| e.action).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DemandSlot;
    use crate::network::Handle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn station(demand: &[DemandSlot]) -> Station {
        let arrivals = Arc::new(CumulativeArrivals::new(0, 3_600, demand));
        Station::new(1, "S", arrivals, 0).with_dwell(30)
    }

    #[test]
    fn test_departure_accrues_trapezoid() {
        let mut s = station(&[DemandSlot::new(1_800, 100)]);
        // A(600) = 100 * 600 / 1800
        s.on_departure(600);
        let expected = 600.0 * (100.0 * 600.0 / 1_800.0) / 2.0;
        assert!((s.accumulated_waiting() - expected).abs() < 1e-9);
        assert_eq!(s.last_departure_time(), 600);

        s.on_departure(1_800);
        let second = 1_200.0 * (100.0 - 100.0 * 600.0 / 1_800.0) / 2.0;
        assert!((s.accumulated_waiting() - expected - second).abs() < 1e-9);
        assert_eq!(s.departure_times(), &[600, 1_800]);
    }

    #[test]
    fn test_zero_demand_costs_nothing() {
        let mut s = station(&[]);
        s.on_departure(1_000);
        s.on_departure(2_000);
        assert_eq!(s.accumulated_waiting(), 0.0);
    }

    #[test]
    fn test_arrival_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut s = station(&[]);
        s.set_arrival_hook(Arc::new(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        s.on_arrival(5, 100);
        s.on_arrival(5, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(s.accumulated_waiting(), 0.0);
    }

    #[test]
    fn test_dwell_function() {
        let mut s = station(&[]);
        assert_eq!(s.dwell_at(0), Ok(30));
        s.set_dwell_function(DwellFunction::Constant(90));
        assert_eq!(s.dwell_at(0), Ok(90));
    }

    #[test]
    fn test_pool_is_lifo() {
        let mut depot = Depot::new(1, "D", DepotKind::Cyclic, 0);
        depot.push_train(TrainIdx::from_index(0));
        depot.push_train(TrainIdx::from_index(1));
        assert_eq!(depot.pop_train(), Some(TrainIdx::from_index(1)));
        assert_eq!(depot.pop_train(), Some(TrainIdx::from_index(0)));
        assert_eq!(depot.pop_train(), None);
    }

    #[test]
    fn test_train_log_per_trip() {
        let mut train = Train::new(1, "T1", DepotIdx::from_index(0));
        let route = RouteIdx::from_index(0);

        train.assign(1, route);
        train.record("R", TrainEvent::new(0, "D", TrainAction::Departure));
        train.record("R", TrainEvent::new(60, "A", TrainAction::Arrival));
        train.assign(4, route);
        train.record("R", TrainEvent::new(900, "D", TrainAction::Departure));

        assert_eq!(
            train.trip_actions(1),
            vec![TrainAction::Departure, TrainAction::Arrival]
        );
        assert_eq!(train.trip_actions(4), vec![TrainAction::Departure]);
        assert!(train.trip_events(2).is_none());
        assert_eq!(train.log()[&1].route, "R");
    }
}
