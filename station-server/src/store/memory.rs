//! In-memory schedule backend.
//!
//! Serves a fixed master timetable without touching disk. Tests use it to
//! drive the store and count saves.

use std::sync::{Mutex, PoisonError};

use crate::domain::Train;

use super::{ScheduleBackend, StoreError};

/// Backend holding master and live copies in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    master: Vec<Train>,
    live: Mutex<Vec<Train>>,
    saves: Mutex<usize>,
}

impl MemoryBackend {
    /// Create a backend whose master copy is `master`. The live copy
    /// starts empty until the first reset.
    pub fn new(master: Vec<Train>) -> Self {
        Self {
            master,
            live: Mutex::new(Vec::new()),
            saves: Mutex::new(0),
        }
    }

    /// Snapshot of the live copy.
    pub fn live(&self) -> Vec<Train> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `save_all` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScheduleBackend for MemoryBackend {
    fn reset(&self) -> Result<(), StoreError> {
        *self.live.lock().unwrap_or_else(PoisonError::into_inner) = self.master.clone();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Train>, StoreError> {
        Ok(self.live())
    }

    fn save_all(&self, trains: &[&Train]) -> Result<(), StoreError> {
        *self.live.lock().unwrap_or_else(PoisonError::into_inner) =
            trains.iter().map(|t| (*t).clone()).collect();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
