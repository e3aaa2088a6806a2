//! Shared timetable used by tests across the crate.

use std::sync::Arc;

use crate::domain::{FixedClock, MinuteOfDay, Stop, Train, TrainId};

use super::{MemoryBackend, ScheduleStore};

pub(crate) fn at(s: &str) -> Option<MinuteOfDay> {
    Some(MinuteOfDay::parse_hhmm(s).unwrap())
}

fn train(id: u32, stops: &[(&str, &str, &str)]) -> Train {
    let route = stops
        .iter()
        .map(|(name, arr, dep)| {
            let parse = |s: &str| if s.is_empty() { None } else { at(s) };
            Stop::new(*name, parse(*arr), parse(*dep))
        })
        .collect();
    Train::new(TrainId::new(id), route)
}

/// Four trains:
///
/// 1. Iasi 08:00 -> Roman 09:10/09:15 -> Bucharest 11:00
/// 2. Suceava 06:30 -> Pascani 07:20/07:25 -> Iasi 08:10
/// 3. Iasi 08:00 -> Pascani 08:40/08:45 -> Iasi 09:30/09:35 -> Suceava 10:30
/// 4. Bucharest 23:30 -> Roman 03:00/03:05 -> Iasi 05:00 (overnight)
pub(crate) fn sample_trains() -> Vec<Train> {
    vec![
        train(
            1,
            &[
                ("Iasi", "", "08:00"),
                ("Roman", "09:10", "09:15"),
                ("Bucharest", "11:00", ""),
            ],
        ),
        train(
            2,
            &[
                ("Suceava", "", "06:30"),
                ("Pascani", "07:20", "07:25"),
                ("Iasi", "08:10", ""),
            ],
        ),
        train(
            3,
            &[
                ("Iasi", "", "08:00"),
                ("Pascani", "08:40", "08:45"),
                ("Iasi", "09:30", "09:35"),
                ("Suceava", "10:30", ""),
            ],
        ),
        train(
            4,
            &[
                ("Bucharest", "", "23:30"),
                ("Roman", "03:00", "03:05"),
                ("Iasi", "05:00", ""),
            ],
        ),
    ]
}

/// A loaded store over the sample trains with the clock fixed at `now`.
pub(crate) fn store_at(now: &str) -> (ScheduleStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new(sample_trains()));
    let clock = FixedClock(MinuteOfDay::parse_hhmm(now).unwrap());
    let store = ScheduleStore::with_clock(backend.clone(), Arc::new(clock));
    store.load_all().unwrap();
    (store, backend)
}
