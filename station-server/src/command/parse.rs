//! Request line parsing.
//!
//! A request is one line of whitespace-separated tokens. The first token
//! selects the command; extra trailing tokens are ignored.

use crate::domain::{MINUTES_PER_DAY, TrainId};

use super::Request;

/// Largest delay, in either direction, a report may carry.
pub const MAX_DELAY_MINS: u32 = MINUTES_PER_DAY as u32;

/// A request line that could not be turned into a command.
///
/// The `Display` text is the exact reply sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("ERROR: Unknown command. Type 'help' for list.")]
    UnknownCommand,

    #[error("Error: Use GET_TRAIN_INFO <ID>")]
    TrainInfoUsage,

    #[error("Error: Use REPORT_DELAY <ID> <Min> <Est>")]
    ReportDelayUsage,

    /// A numeric id no train can have, asked about with GET_TRAIN_INFO
    #[error("Train does not exist.")]
    NoSuchTrain,

    /// A numeric id no train can have, in a delay report
    #[error("ERROR: Train {0} does not exist.")]
    NoSuchTrainToDelay(i64),
}

/// An id token: either a possible train, or an integer outside the id range.
enum IdToken {
    Train(TrainId),
    OutOfRange(i64),
}

fn id_token(token: &str) -> Option<IdToken> {
    match token.parse::<TrainId>() {
        Ok(id) => Some(IdToken::Train(id)),
        Err(_) => token.parse::<i64>().ok().map(IdToken::OutOfRange),
    }
}

/// Parse one request line.
///
/// # Examples
///
/// ```
/// use station_server::command::{Request, parse_request};
///
/// let request = parse_request("GET_DEPARTURES Roman").unwrap();
/// assert_eq!(request, Request::Departures { station: Some("Roman".into()) });
///
/// assert!(parse_request("GET_TRAIN_INFO one").is_err());
/// ```
pub fn parse_request(line: &str) -> Result<Request, RequestError> {
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next().ok_or(RequestError::UnknownCommand)?;
    let mut next = || tokens.next().map(str::to_string);

    match keyword {
        "GET_SCHEDULE" => Ok(Request::Schedule {
            from: next(),
            to: next(),
        }),
        "GET_DEPARTURES" => Ok(Request::Departures { station: next() }),
        "GET_ARRIVALS" => Ok(Request::Arrivals { station: next() }),
        "GET_TRAIN_INFO" => match next().as_deref().and_then(id_token) {
            Some(IdToken::Train(id)) => Ok(Request::TrainInfo { id }),
            Some(IdToken::OutOfRange(_)) => Err(RequestError::NoSuchTrain),
            None => Err(RequestError::TrainInfoUsage),
        },
        "REPORT_DELAY" => {
            let id = next()
                .as_deref()
                .and_then(id_token)
                .ok_or(RequestError::ReportDelayUsage)?;
            let delay_mins = next()
                .and_then(|s| s.parse::<i32>().ok())
                .filter(|d| d.unsigned_abs() <= MAX_DELAY_MINS)
                .ok_or(RequestError::ReportDelayUsage)?;
            let estimate = next().ok_or(RequestError::ReportDelayUsage)?;
            match id {
                IdToken::Train(id) => Ok(Request::ReportDelay {
                    id,
                    delay_mins,
                    estimate,
                }),
                IdToken::OutOfRange(n) => Err(RequestError::NoSuchTrainToDelay(n)),
            }
        }
        "help" => Ok(Request::Help),
        _ => Err(RequestError::UnknownCommand),
    }
}
