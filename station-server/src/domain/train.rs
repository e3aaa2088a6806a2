//! Trains and the stops along their route.

use std::fmt;
use std::str::FromStr;

use super::MinuteOfDay;

/// Error returned when parsing an invalid train identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train id: {0:?}")]
pub struct InvalidTrainId(String);

/// Unique identifier of a train.
///
/// # Examples
///
/// ```
/// use station_server::domain::TrainId;
///
/// let id: TrainId = "42".parse().unwrap();
/// assert_eq!(id.get(), 42);
/// assert!("abc".parse::<TrainId>().is_err());
/// assert!("-1".parse::<TrainId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainId(u32);

impl TrainId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for TrainId {
    type Err = InvalidTrainId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(TrainId)
            .map_err(|_| InvalidTrainId(s.to_string()))
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One station visited by a train.
///
/// The first stop of a route has no arrival and the last has no
/// departure. Intermediate stops normally have both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Station display name.
    pub name: String,
    /// Scheduled arrival time.
    pub arrival: Option<MinuteOfDay>,
    /// Scheduled departure time.
    pub departure: Option<MinuteOfDay>,
}

impl Stop {
    pub fn new(
        name: impl Into<String>,
        arrival: Option<MinuteOfDay>,
        departure: Option<MinuteOfDay>,
    ) -> Self {
        Self {
            name: name.into(),
            arrival,
            departure,
        }
    }
}

/// A scheduled train and its current running state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Train {
    id: TrainId,
    /// Stops in the order the train visits them.
    pub route: Vec<Stop>,
    /// Minutes late (positive) or early (negative).
    pub delay_mins: i32,
    /// Free-text status estimate, e.g. "~15min".
    pub estimate: String,
}

impl Train {
    /// Create an on-time train.
    pub fn new(id: TrainId, route: Vec<Stop>) -> Self {
        Self {
            id,
            route,
            delay_mins: 0,
            estimate: "On time".to_string(),
        }
    }

    /// The train identifier. Fixed for the lifetime of the train.
    pub fn id(&self) -> TrainId {
        self.id
    }

    /// Index of the last stop named `station`, if the route calls there.
    ///
    /// Routes that visit the same station more than once resolve to the
    /// final visit.
    pub fn last_index_of(&self, station: &str) -> Option<usize> {
        self.route.iter().rposition(|s| s.name == station)
    }

    /// Summary of how the train is running.
    pub fn punctuality(&self) -> Punctuality {
        Punctuality::from_delay(self.delay_mins)
    }

    /// Stops with a real departure, i.e. every stop except the last.
    pub fn departing_stops(&self) -> impl Iterator<Item = (&Stop, MinuteOfDay)> {
        let n = self.route.len().saturating_sub(1);
        self.route[..n]
            .iter()
            .filter_map(|s| s.departure.map(|t| (s, t)))
    }

    /// Stops with a real arrival, i.e. every stop except the first.
    pub fn arriving_stops(&self) -> impl Iterator<Item = (&Stop, MinuteOfDay)> {
        self.route
            .iter()
            .skip(1)
            .filter_map(|s| s.arrival.map(|t| (s, t)))
    }
}

/// Whether a train is late, early or on time, and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuality {
    Late(u32),
    Early(u32),
    OnTime,
}

impl Punctuality {
    pub fn from_delay(delay_mins: i32) -> Self {
        match delay_mins {
            d if d > 0 => Punctuality::Late(d.unsigned_abs()),
            d if d < 0 => Punctuality::Early(d.unsigned_abs()),
            _ => Punctuality::OnTime,
        }
    }
}
