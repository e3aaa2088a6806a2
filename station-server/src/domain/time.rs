//! Time-of-day handling for the timetable.
//!
//! Schedule times are wall-clock minutes since midnight with no date
//! attached. A delay can push a time across midnight, so all arithmetic
//! wraps modulo one day.

use chrono::{DateTime, Local, TimeZone, Timelike};
use std::fmt;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Width of the "next hour" window in minutes (inclusive at both ends).
pub const NEXT_HOUR_MINS: u16 = 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day, in minutes since midnight.
///
/// Always in `0..1440`.
///
/// # Examples
///
/// ```
/// use station_server::domain::MinuteOfDay;
///
/// let t = MinuteOfDay::parse_hhmm("08:05").unwrap();
/// assert_eq!(t.minutes(), 485);
/// assert_eq!(t.to_string(), "08:05");
///
/// // A delay past midnight wraps into the next day
/// let late = MinuteOfDay::parse_hhmm("23:50").unwrap().offset(20);
/// assert_eq!(late.to_string(), "00:10");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    /// Create from a minute count, returning `None` if it is not in `0..1440`.
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Create from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use station_server::domain::MinuteOfDay;
    ///
    /// assert!(MinuteOfDay::parse_hhmm("00:00").is_ok());
    /// assert!(MinuteOfDay::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(MinuteOfDay::parse_hhmm("1430").is_err());
    /// assert!(MinuteOfDay::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(hour * 60 + minute))
    }

    /// The time of day of a chrono timestamp, truncated to the minute.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let time = dt.time();
        // hour() < 24 and minute() < 60, so this is always in range
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    /// The current local wall-clock time.
    pub fn now_local() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Returns the hour (0-23).
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Shift by a signed number of minutes, wrapping around midnight.
    ///
    /// The result is always normalised into `0..1440`, including for
    /// negative (early) offsets larger than the time itself.
    pub fn offset(self, delta_mins: i32) -> Self {
        let shifted =
            (i64::from(self.0) + i64::from(delta_mins)).rem_euclid(i64::from(MINUTES_PER_DAY));
        Self(shifted as u16)
    }

    /// Whether `self` falls within the next hour starting at `now`.
    ///
    /// The window is `[now, now + 60]`. When it runs past midnight it wraps:
    /// the tail end is matched against the start of the day.
    pub fn is_within_next_hour(self, now: MinuteOfDay) -> bool {
        let end = now.0 + NEXT_HOUR_MINS;
        if end < MINUTES_PER_DAY {
            self.0 >= now.0 && self.0 <= end
        } else {
            self.0 >= now.0 || self.0 <= end - MINUTES_PER_DAY
        }
    }
}

impl fmt::Debug for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MinuteOfDay({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Displays an optional time, using `--:--` when unset.
pub struct OptTime(pub Option<MinuteOfDay>);

impl fmt::Display for OptTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{t}"),
            None => f.write_str("--:--"),
        }
    }
}

/// Parse two ASCII digit bytes into a u16.
fn parse_two_digits(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some((d1 * 10 + d2) as u16)
}

/// Source of the current time of day.
///
/// The schedule store asks its clock once per query so that every line of
/// one response is computed against the same instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> MinuteOfDay;
}

/// The local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> MinuteOfDay {
        MinuteOfDay::now_local()
    }
}

/// A clock stuck at one time. Useful for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub MinuteOfDay);

impl Clock for FixedClock {
    fn now(&self) -> MinuteOfDay {
        self.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_time() -> impl Strategy<Value = MinuteOfDay> {
        (0u16..MINUTES_PER_DAY).prop_map(|m| MinuteOfDay::new(m).unwrap())
    }

    proptest! {
        /// Display then parse returns the original time
        #[test]
        fn roundtrip(time in any_time()) {
            prop_assert_eq!(MinuteOfDay::parse_hhmm(&time.to_string()).unwrap(), time);
        }

        /// Offsetting always stays in range and inverts cleanly
        #[test]
        fn offset_inverts(time in any_time(), delta in (i32::MIN + 1)..=i32::MAX) {
            let shifted = time.offset(delta);
            prop_assert!(shifted.minutes() < MINUTES_PER_DAY);
            prop_assert_eq!(shifted.offset(-delta), time);
        }

        /// Exactly 61 minutes of the day fall in any next-hour window
        #[test]
        fn window_has_fixed_width(now in any_time()) {
            let count = (0..MINUTES_PER_DAY)
                .filter(|&m| MinuteOfDay::new(m).unwrap().is_within_next_hour(now))
                .count();
            prop_assert_eq!(count, usize::from(NEXT_HOUR_MINS) + 1);
        }

        /// The window is the 61 minutes starting at `now`
        #[test]
        fn window_matches_forward_distance(now in any_time(), target in any_time()) {
            let forward = (i32::from(target.minutes()) - i32::from(now.minutes()))
                .rem_euclid(i32::from(MINUTES_PER_DAY));
            prop_assert_eq!(
                target.is_within_next_hour(now),
                forward <= i32::from(NEXT_HOUR_MINS)
            );
        }
    }
}
