//! Requests and the commands that carry them to the dispatcher.

use tracing::warn;

use crate::domain::TrainId;
use crate::net::Responder;
use crate::store::{ScheduleStore, StoreError};

/// Listing returned by `help`.
pub const HELP_TEXT: &str = "\
=== CFR STATION - COMMAND LIST ===
1. GET_SCHEDULE <Departure> <Arrival>
   -> Search route (ex: GET_SCHEDULE Iasi Bucharest).
2. GET_DEPARTURES <Optional: Station>
   -> Departures in the next hour (ex: GET_DEPARTURES or GET_DEPARTURES Roman).
3. GET_ARRIVALS <Optional: Station>
   -> Arrivals in the next hour (ex: GET_ARRIVALS or GET_ARRIVALS Iasi).
4. GET_TRAIN_INFO <ID>
   -> Complete details about a train (ex: GET_TRAIN_INFO 1).
5. REPORT_DELAY <ID> <Min> <Est>
   -> Report delay (ex: REPORT_DELAY 1 15 ~15min).
6. help / exit
================================
";

/// Reply to a successful delay report.
pub const DELAY_UPDATED: &str = "OK: Delay updated!\n";

/// One parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Route summary, optionally filtered by origin and destination.
    Schedule {
        from: Option<String>,
        to: Option<String>,
    },
    /// Departures in the next hour, optionally at one station.
    Departures { station: Option<String> },
    /// Arrivals in the next hour, optionally at one station.
    Arrivals { station: Option<String> },
    /// Full details of one train.
    TrainInfo { id: TrainId },
    /// Set a train's delay and status estimate.
    ReportDelay {
        id: TrainId,
        delay_mins: i32,
        estimate: String,
    },
    /// The command list.
    Help,
}

impl Request {
    /// Perform this request against the store and format the reply.
    ///
    /// Each variant performs at most one store operation.
    pub fn execute(&self, store: &ScheduleStore) -> String {
        match self {
            Request::Schedule { from, to } => store.schedule(from.as_deref(), to.as_deref()),
            Request::Departures { station } => store.departures_next_hour(station.as_deref()),
            Request::Arrivals { station } => store.arrivals_next_hour(station.as_deref()),
            Request::TrainInfo { id } => store.train_details(*id),
            Request::ReportDelay {
                id,
                delay_mins,
                estimate,
            } => match store.update_delay(*id, *delay_mins, estimate) {
                Ok(()) => DELAY_UPDATED.to_string(),
                Err(StoreError::UnknownTrain(id)) => {
                    format!("ERROR: Train {id} does not exist.\n")
                }
                Err(e) => {
                    warn!(train = %id, error = %e, "delay applied but not persisted");
                    format!("ERROR: Delay updated but could not be saved: {e}\n")
                }
            },
            Request::Help => HELP_TEXT.to_string(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Schedule { .. } => "GET_SCHEDULE",
            Request::Departures { .. } => "GET_DEPARTURES",
            Request::Arrivals { .. } => "GET_ARRIVALS",
            Request::TrainInfo { .. } => "GET_TRAIN_INFO",
            Request::ReportDelay { .. } => "REPORT_DELAY",
            Request::Help => "help",
        }
    }
}

/// A request bound to the connection that should receive its reply.
///
/// Built by a connection handler once a full request line is parsed, and
/// consumed exactly once by the dispatcher.
#[derive(Debug)]
pub struct Command {
    pub request: Request,
    pub reply_to: Responder,
}

impl Command {
    pub fn new(request: Request, reply_to: Responder) -> Self {
        Self { request, reply_to }
    }
}
