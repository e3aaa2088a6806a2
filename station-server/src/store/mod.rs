//! Train schedule state and its persistence.
//!
//! The [`ScheduleStore`] is the only component that touches train data.
//! It loads from and saves to a [`ScheduleBackend`], which keeps a
//! read-only master timetable and a live working copy.

mod backend;
mod error;
mod file;
mod memory;
mod schedule;

#[cfg(test)]
pub(crate) mod fixtures;

pub use backend::ScheduleBackend;
pub use error::StoreError;
pub use file::JsonScheduleFile;
pub use memory::MemoryBackend;
pub use schedule::ScheduleStore;
