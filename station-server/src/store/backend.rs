//! Persistence boundary for the schedule store.

use crate::domain::Train;

use super::StoreError;

/// Where the schedule store loads from and saves to.
///
/// A backend keeps two copies of the timetable: a read-only master and a
/// live working copy. Startup always resets the live copy from the master,
/// so delays never survive a restart.
pub trait ScheduleBackend: Send + Sync {
    /// Overwrite the live copy with the master copy.
    fn reset(&self) -> Result<(), StoreError>;

    /// Read every train from the live copy, in stored order.
    fn load_all(&self) -> Result<Vec<Train>, StoreError>;

    /// Replace the live copy with `trains`.
    fn save_all(&self, trains: &[&Train]) -> Result<(), StoreError>;
}
