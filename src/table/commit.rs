//! Session endings: commit or rollback, both consuming the handle.

use anyhow::Result;
use log::debug;

use crate::errors::HdbError;

use super::core::Table;

impl Table {
    /// End the session keeping all mutations: unmap, truncate the file to
    /// the logical end of data (releasing unused slack), drop the lock.
    pub fn commit(self) -> Result<()> {
        if self.readonly() {
            // nothing was written and there is no slack; dropping unmaps
            // and releases the lock
            return Ok(());
        }
        debug!(
            "commit {}: {} item(s), truncate to {}",
            self.path.display(),
            self.item_count(),
            self.cur_end
        );
        self.store.unmap_and_truncate(self.cur_end)
    }

    /// End the session undoing every mutation made through it: replay the
    /// journal in reverse, truncate back to the size observed at open,
    /// drop the lock. Fails with `HdbError::RollbackNotEnabled` when the
    /// session was not opened with rollback.
    pub fn rollback(mut self) -> Result<()> {
        let journal = self
            .journal
            .take()
            .ok_or(HdbError::RollbackNotEnabled)?;
        debug!(
            "rollback {}: {} journal record(s), truncate to {}",
            self.path.display(),
            journal.len(),
            self.store.starting_size
        );
        journal.replay(self.store.bytes_mut()?);
        let len = self.store.starting_size;
        self.store.unmap_and_truncate(len)
    }
}
