//! JSON file backend for the schedule.
//!
//! The document looks like:
//!
//! ```json
//! {
//!   "trains": [
//!     {
//!       "id": 1,
//!       "delay": 0,
//!       "estimate": "On time",
//!       "route": [
//!         { "name": "Iasi", "departure": "08:00" },
//!         { "name": "Roman", "arrival": "09:10", "departure": "09:15" },
//!         { "name": "Bucharest", "arrival": "11:00" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{MinuteOfDay, Stop, Train, TrainId};

use super::{ScheduleBackend, StoreError};

/// Estimate used when a record has none.
const DEFAULT_ESTIMATE: &str = "N/A";

/// Top-level schedule document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ScheduleDocument {
    #[serde(default)]
    trains: Vec<TrainRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrainRecord {
    id: u32,
    #[serde(default)]
    delay: i32,
    #[serde(default = "default_estimate")]
    estimate: String,
    #[serde(default)]
    route: Vec<StationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StationRecord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arrival: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    departure: Option<String>,
}

fn default_estimate() -> String {
    DEFAULT_ESTIMATE.to_string()
}

/// Schedule stored as a pair of JSON files.
#[derive(Debug, Clone)]
pub struct JsonScheduleFile {
    live: PathBuf,
    master: PathBuf,
}

impl JsonScheduleFile {
    /// Create a backend over a live (read-write) and master (read-only) file.
    pub fn new(live: impl Into<PathBuf>, master: impl Into<PathBuf>) -> Self {
        Self {
            live: live.into(),
            master: master.into(),
        }
    }

    /// Path of the live working copy.
    pub fn live_path(&self) -> &Path {
        &self.live
    }

    /// Path of the pristine master copy.
    pub fn master_path(&self) -> &Path {
        &self.master
    }
}

impl ScheduleBackend for JsonScheduleFile {
    fn reset(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.live.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        std::fs::copy(&self.master, &self.live).map_err(|e| StoreError::io(&self.master, e))?;
        info!(
            master = %self.master.display(),
            live = %self.live.display(),
            "schedule reset from master"
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Train>, StoreError> {
        let json = std::fs::read_to_string(&self.live).map_err(|e| StoreError::io(&self.live, e))?;
        let doc: ScheduleDocument =
            serde_json::from_str(&json).map_err(|source| StoreError::Json {
                path: self.live.clone(),
                source,
            })?;

        let mut trains = Vec::with_capacity(doc.trains.len());
        for record in doc.trains {
            if record.route.is_empty() {
                warn!(train = record.id, "skipping train with no stops");
                continue;
            }
            trains.push(record_to_train(record)?);
        }
        Ok(trains)
    }

    fn save_all(&self, trains: &[&Train]) -> Result<(), StoreError> {
        let doc = ScheduleDocument {
            trains: trains.iter().map(|t| train_to_record(t)).collect(),
        };

        let json = serde_json::to_string_pretty(&doc).map_err(|source| StoreError::Json {
            path: self.live.clone(),
            source,
        })?;

        std::fs::write(&self.live, json).map_err(|e| StoreError::io(&self.live, e))?;
        Ok(())
    }
}

/// Convert a stored record into a validated train.
fn record_to_train(record: TrainRecord) -> Result<Train, StoreError> {
    let train_id = record.id;
    let invalid = |message: String| StoreError::InvalidRecord {
        train: train_id,
        message,
    };

    let mut route = Vec::with_capacity(record.route.len());
    for station in record.route {
        if station.name.trim().is_empty() {
            return Err(invalid("station name is empty".to_string()));
        }
        let arrival = parse_optional_time(station.arrival.as_deref())
            .map_err(|e| invalid(format!("arrival at {}: {e}", station.name)))?;
        let departure = parse_optional_time(station.departure.as_deref())
            .map_err(|e| invalid(format!("departure from {}: {e}", station.name)))?;
        route.push(Stop::new(station.name, arrival, departure));
    }

    let mut train = Train::new(TrainId::new(record.id), route);
    train.delay_mins = record.delay;
    train.estimate = record.estimate;
    Ok(train)
}

/// Parse an optional "HH:MM" value. A lone dash also means unset.
fn parse_optional_time(
    value: Option<&str>,
) -> Result<Option<MinuteOfDay>, crate::domain::TimeError> {
    match value {
        None | Some("") | Some("-") => Ok(None),
        Some(s) => MinuteOfDay::parse_hhmm(s).map(Some),
    }
}

fn train_to_record(train: &Train) -> TrainRecord {
    TrainRecord {
        id: train.id().get(),
        delay: train.delay_mins,
        estimate: train.estimate.clone(),
        route: train
            .route
            .iter()
            .map(|s| StationRecord {
                name: s.name.clone(),
                arrival: s.arrival.map(|t| t.to_string()),
                departure: s.departure.map(|t| t.to_string()),
            })
            .collect(),
    }
}
