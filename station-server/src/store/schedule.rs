//! The synchronized timetable.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::domain::{Clock, OptTime, Punctuality, SystemClock, Train, TrainId};

use super::{ScheduleBackend, StoreError};

const NO_TRAINS: &str = "No trains found on this route.\n";
const NO_DEPARTURES: &str = "No departures soon.\n";
const NO_ARRIVALS: &str = "No arrivals soon.\n";
const NO_SUCH_TRAIN: &str = "Train does not exist.\n";

type TrainMap = BTreeMap<TrainId, Train>;

/// In-memory train state behind a single lock.
///
/// Every query and update holds the lock for its full duration, including
/// the persistence write that follows a delay update. Readers therefore see
/// either the freshly loaded timetable or a sequence of fully applied
/// updates, never a half-written train.
pub struct ScheduleStore {
    trains: Mutex<TrainMap>,
    backend: Arc<dyn ScheduleBackend>,
    clock: Arc<dyn Clock>,
}

impl ScheduleStore {
    /// Create an empty store reading the local wall clock.
    pub fn new(backend: Arc<dyn ScheduleBackend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Create an empty store with a custom clock.
    pub fn with_clock(backend: Arc<dyn ScheduleBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            trains: Mutex::new(TrainMap::new()),
            backend,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrainMap> {
        // A panic while holding the lock cannot leave a train half-updated
        // (the fields are written before persisting), so the data is usable.
        self.trains.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the live copy from the master and load it, replacing any
    /// prior content.
    ///
    /// On failure the store is left empty and the error is returned for the
    /// caller to report. Returns the number of trains loaded.
    pub fn load_all(&self) -> Result<usize, StoreError> {
        let mut trains = self.lock();
        trains.clear();

        self.backend.reset()?;
        for train in self.backend.load_all()? {
            if let Some(previous) = trains.insert(train.id(), train) {
                debug!(train = %previous.id(), "duplicate train id, keeping the later record");
            }
        }

        info!(count = trains.len(), "schedule loaded");
        Ok(trains.len())
    }

    /// Number of trains currently loaded.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no trains are loaded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of one train.
    pub fn train(&self, id: TrainId) -> Option<Train> {
        self.lock().get(&id).cloned()
    }

    /// Origin-to-destination summary for each train, optionally filtered.
    ///
    /// - no filters: every train, first stop to last stop;
    /// - `from` only: trains calling at `from`, from there to the terminus;
    /// - `from` and `to`: trains calling at `from` strictly before `to`.
    ///
    /// A station that appears more than once in a route resolves to its
    /// last occurrence for both bounds. A `to` filter without `from`
    /// matches nothing.
    pub fn schedule(&self, from: Option<&str>, to: Option<&str>) -> String {
        let from = from.filter(|s| !s.is_empty());
        let to = to.filter(|s| !s.is_empty());
        let trains = self.lock();

        let mut lines = vec![match (from, to) {
            (None, None) => "--- Train Schedule (Complete) ---".to_string(),
            _ => format!(
                "--- Filtered Route: {} -> {} ---",
                from.unwrap_or("Any"),
                to.unwrap_or("Any")
            ),
        }];

        for train in trains.values() {
            let Some((start, end)) = route_span(train, from, to) else {
                continue;
            };
            let origin = &train.route[start];
            let dest = &train.route[end];
            lines.push(format!(
                "Train {}: {}({}) -> {}({}) [{}]",
                train.id(),
                origin.name,
                OptTime(origin.departure),
                dest.name,
                OptTime(dest.arrival),
                schedule_status(train.punctuality()),
            ));
        }

        if lines.len() == 1 {
            return NO_TRAINS.to_string();
        }
        join_lines(lines)
    }

    /// Departures in the next hour, optionally from one station only.
    pub fn departures_next_hour(&self, station: Option<&str>) -> String {
        let station = station.filter(|s| !s.is_empty());
        let trains = self.lock();
        let now = self.clock.now();

        let mut lines = vec![format!("Departures next hour ({now}):")];
        for train in trains.values() {
            for (stop, scheduled) in train.departing_stops() {
                if station.is_some_and(|name| name != stop.name) {
                    continue;
                }
                let effective = scheduled.offset(train.delay_mins);
                if !effective.is_within_next_hour(now) {
                    continue;
                }
                let mut line = format!("Train {} from {} at {}", train.id(), stop.name, effective);
                if train.delay_mins != 0 {
                    line.push_str(&format!(" (Delay: {})", train.delay_mins));
                }
                lines.push(line);
            }
        }

        if lines.len() == 1 {
            return NO_DEPARTURES.to_string();
        }
        join_lines(lines)
    }

    /// Arrivals in the next hour, optionally at one station only.
    pub fn arrivals_next_hour(&self, station: Option<&str>) -> String {
        let station = station.filter(|s| !s.is_empty());
        let trains = self.lock();
        let now = self.clock.now();

        let mut lines = vec![format!("Arrivals next hour ({now}):")];
        for train in trains.values() {
            for (stop, scheduled) in train.arriving_stops() {
                if station.is_some_and(|name| name != stop.name) {
                    continue;
                }
                let effective = scheduled.offset(train.delay_mins);
                if !effective.is_within_next_hour(now) {
                    continue;
                }
                let status = match train.punctuality() {
                    Punctuality::Early(d) => format!("EARLY {d} min"),
                    Punctuality::Late(d) => format!("DELAY {d} min"),
                    Punctuality::OnTime => "On Time".to_string(),
                };
                lines.push(format!(
                    "Train {} in {} at {} ({})",
                    train.id(),
                    stop.name,
                    effective,
                    status
                ));
            }
        }

        if lines.len() == 1 {
            return NO_ARRIVALS.to_string();
        }
        join_lines(lines)
    }

    /// Full dump of one train.
    pub fn train_details(&self, id: TrainId) -> String {
        let trains = self.lock();
        let Some(train) = trains.get(&id) else {
            return NO_SUCH_TRAIN.to_string();
        };

        let mut lines = vec![
            format!(
                "ID: {} | Status: {} | Delay: {}",
                train.id(),
                train.estimate,
                train.delay_mins
            ),
            "Route:".to_string(),
        ];
        lines.extend(train.route.iter().map(|s| {
            format!(
                " - {} (Arr:{}, Dep:{})",
                s.name,
                OptTime(s.arrival),
                OptTime(s.departure)
            )
        }));
        join_lines(lines)
    }

    /// Replace a train's delay and estimate, then persist the whole store.
    ///
    /// Both fields are written before persisting, inside one critical
    /// section. If persisting fails the in-memory update stays applied.
    pub fn update_delay(
        &self,
        id: TrainId,
        delay_mins: i32,
        estimate: &str,
    ) -> Result<(), StoreError> {
        let mut trains = self.lock();
        let train = trains.get_mut(&id).ok_or(StoreError::UnknownTrain(id))?;
        train.delay_mins = delay_mins;
        train.estimate = estimate.to_string();
        debug!(train = %id, delay_mins, estimate, "delay updated");

        let snapshot: Vec<&Train> = trains.values().collect();
        self.backend.save_all(&snapshot)
    }
}

/// Indices of the first and last stop to report for a schedule query, or
/// `None` if the train does not match the filters.
fn route_span(train: &Train, from: Option<&str>, to: Option<&str>) -> Option<(usize, usize)> {
    let last = train.route.len().checked_sub(1)?;
    match (from, to) {
        (None, None) => Some((0, last)),
        (Some(from), None) => Some((train.last_index_of(from)?, last)),
        (Some(from), Some(to)) => {
            let start = train.last_index_of(from)?;
            let end = train.last_index_of(to)?;
            (start < end).then_some((start, end))
        }
        (None, Some(_)) => None,
    }
}

fn schedule_status(punctuality: Punctuality) -> String {
    match punctuality {
        Punctuality::Late(d) => format!("Delay {d} min"),
        Punctuality::Early(d) => format!("Early by {d} min"),
        Punctuality::OnTime => "On Time".to_string(),
    }
}

/// Join response lines, each newline-terminated.
fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
