//! Point lookup and multi-value enumeration.

use anyhow::Result;

use crate::chain::{bucket_of_key, next_of, search, SearchOutcome};
use crate::errors::HdbError;
use crate::layout::read_off;

use super::core::Table;

impl Table {
    /// Look up `key`; returns the item's data bytes, borrowed from the
    /// mapped region, or `None`.
    pub fn find(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        self.check_key(key)?;
        let map = self.store.bytes()?;
        let head = read_off(map, self.hdr.slot_offset(bucket_of_key(&self.hdr, key)));
        match search(map, &self.hdr, key, head, self.cur_end)? {
            SearchOutcome::Found { item, .. } => {
                let doff = self.hdr.data_offset(item);
                Ok(Some(&map[doff..doff + self.data_len()]))
            }
            SearchOutcome::NotFound { .. } => Ok(None),
        }
    }

    /// Enumerate every item sharing `key`, newest first (chain order).
    /// Only `CollisionPolicy::AllowMultiple` produces more than one.
    pub fn find_all(&self, key: &[u8]) -> Result<Vec<&[u8]>> {
        self.check_key(key)?;
        let map = self.store.bytes()?;
        let mut out = Vec::new();
        let mut start = read_off(map, self.hdr.slot_offset(bucket_of_key(&self.hdr, key)));
        loop {
            match search(map, &self.hdr, key, start, self.cur_end)? {
                SearchOutcome::Found { item, .. } => {
                    let doff = self.hdr.data_offset(item);
                    out.push(&map[doff..doff + self.data_len()]);
                    // resume just past the match; duplicates are adjacent
                    start = next_of(map, &self.hdr, item);
                }
                SearchOutcome::NotFound { .. } => return Ok(out),
            }
        }
    }

    pub(crate) fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_len() {
            return Err(HdbError::Geometry(format!(
                "key is {} bytes, table takes {}",
                key.len(),
                self.key_len()
            ))
            .into());
        }
        Ok(())
    }
}
