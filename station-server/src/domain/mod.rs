//! Domain types for the station server.
//!
//! Times, trains and their routes. All types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod time;
mod train;

pub use time::{
    Clock, FixedClock, MINUTES_PER_DAY, MinuteOfDay, NEXT_HOUR_MINS, OptTime, SystemClock,
    TimeError,
};
pub use train::{InvalidTrainId, Punctuality, Stop, Train, TrainId};
