//! Insert with collision policies.

use anyhow::{anyhow, Result};
use log::debug;

use crate::chain::{bucket_of_key, search, SearchOutcome};
use crate::consts::NEXT_PTR_SIZE;
use crate::errors::HdbError;
use crate::layout::{write_off, ItemOffset};

use super::core::Table;

/// What `insert` does when the key is already present. Closed set; there
/// is no open integer escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Rewrite the existing item's data bytes in place.
    Overwrite,
    /// Fail with the distinct duplicate-key error.
    ErrorOnDuplicate,
    /// Succeed without touching the table.
    IgnoreDuplicate,
    /// Keep both: prepend another item in front of its duplicates.
    AllowMultiple,
}

impl Table {
    pub fn insert(&mut self, key: &[u8], data: &[u8], policy: CollisionPolicy) -> Result<()> {
        if self.readonly() {
            return Err(anyhow!("insert on a read-only session"));
        }
        self.check_lengths(key, data)?;

        let bucket = bucket_of_key(&self.hdr, key);
        let head = self.bucket_head(bucket)?;
        let outcome = search(self.store.bytes()?, &self.hdr, key, head, self.cur_end)?;

        match outcome {
            SearchOutcome::Found { item, prev } => match policy {
                CollisionPolicy::Overwrite => self.overwrite_data(item, data),
                CollisionPolicy::ErrorOnDuplicate => Err(HdbError::DuplicateKey.into()),
                CollisionPolicy::IgnoreDuplicate => Ok(()),
                // The new duplicate links to the one we found, so a chain
                // walk yields duplicates newest first.
                CollisionPolicy::AllowMultiple => {
                    self.append_item(bucket, prev, item.get(), key, data)
                }
            },
            SearchOutcome::NotFound { prev, next } => {
                self.append_item(bucket, prev, next, key, data)
            }
        }
    }

    fn check_lengths(&self, key: &[u8], data: &[u8]) -> Result<()> {
        self.check_key(key)?;
        if data.len() != self.data_len() {
            return Err(HdbError::Geometry(format!(
                "data is {} bytes, table takes {}",
                data.len(),
                self.data_len()
            ))
            .into());
        }
        Ok(())
    }

    fn overwrite_data(&mut self, item: ItemOffset, data: &[u8]) -> Result<()> {
        let doff = self.hdr.data_offset(item);
        let map = self.store.bytes_mut()?;
        if let Some(j) = self.journal.as_mut() {
            j.capture(map, doff as u64, data.len());
        }
        map[doff..doff + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Append a record at `cur_end` and splice it into the chain between
    /// `prev` (or the bucket slot) and `next`, preserving descending key
    /// order.
    fn append_item(
        &mut self,
        bucket: u32,
        prev: Option<ItemOffset>,
        next: u32,
        key: &[u8],
        data: &[u8],
    ) -> Result<()> {
        self.ensure_capacity()?;

        let isz = self.hdr.item_size() as u64;
        if self.cur_end + isz > u32::MAX as u64 {
            return Err(anyhow!(
                "table {} exceeds the 4 GiB offset space",
                self.path.display()
            ));
        }
        let new_off = self.cur_end as u32;
        let klen = self.key_len();

        let ptr_pos = match prev {
            Some(p) => self.hdr.next_ptr_offset(p),
            None => self.hdr.slot_offset(bucket),
        };

        let map = self.store.bytes_mut()?;

        // New record first: key, next pointer, data. It lives past the
        // session's starting size, so it is never journaled.
        let o = new_off as usize;
        map[o..o + klen].copy_from_slice(key);
        write_off(map, o + klen, next);
        map[o + klen + NEXT_PTR_SIZE..o + klen + NEXT_PTR_SIZE + data.len()]
            .copy_from_slice(data);

        // Then the splice: predecessor's next pointer, or the bucket slot
        // when the new item becomes the chain head.
        if let Some(j) = self.journal.as_mut() {
            j.capture(map, ptr_pos as u64, NEXT_PTR_SIZE);
        }
        write_off(map, ptr_pos, new_off);

        self.cur_end += isz;
        Ok(())
    }

    /// Grow the backing file when the slack cannot fit one more item.
    fn ensure_capacity(&mut self) -> Result<()> {
        let isz = self.hdr.item_size() as u64;
        if self.cur_end + isz > self.store.mem_size {
            debug!(
                "table {}: slack exhausted at {} items, growing",
                self.path.display(),
                self.item_count()
            );
            self.store.grow(self.grow_chunk)?;
        }
        Ok(())
    }
}
