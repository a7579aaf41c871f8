//! The `Table` handle: one open session over one table file.

use anyhow::Result;
use std::path::PathBuf;

use crate::consts::NO_ITEM;
use crate::errors::HdbError;
use crate::journal::Journal;
use crate::layout::{read_off, ItemOffset, TableHeader};
use crate::store::Store;

/// An open table session. Single-threaded by contract: the mapped region
/// and the end-of-data counter are mutated without internal locking.
#[derive(Debug)]
pub struct Table {
    pub path: PathBuf,
    pub(crate) store: Store,
    pub(crate) hdr: TableHeader,
    /// Logical end of valid data; everything in `[cur_end, mem_size)` is
    /// pre-allocated slack.
    pub(crate) cur_end: u64,
    /// Bytes added per growth step.
    pub(crate) grow_chunk: u64,
    pub(crate) journal: Option<Journal>,
}

impl Table {
    pub fn header(&self) -> &TableHeader {
        &self.hdr
    }

    pub fn key_len(&self) -> usize {
        self.hdr.key_len as usize
    }

    pub fn data_len(&self) -> usize {
        self.hdr.data_len as usize
    }

    pub fn bucket_bits(&self) -> u8 {
        self.hdr.bucket_bits
    }

    pub fn bucket_count(&self) -> u32 {
        self.hdr.bucket_count()
    }

    pub fn readonly(&self) -> bool {
        !self.store.writable()
    }

    pub fn rollback_enabled(&self) -> bool {
        self.journal.is_some()
    }

    /// Number of items currently in the table (appended region / item size).
    pub fn item_count(&self) -> u64 {
        (self.cur_end - self.hdr.items_start() as u64) / self.hdr.item_size() as u64
    }

    /// Head offset of a bucket's chain (`NO_ITEM` for an empty bucket).
    pub(crate) fn bucket_head(&self, bucket: u32) -> Result<u32> {
        let map = self.store.bytes()?;
        Ok(read_off(map, self.hdr.slot_offset(bucket)))
    }

    /// Walk every bucket chain in bucket order, newest chain entry first,
    /// calling `f(bucket, item, key, data)` per item.
    pub(crate) fn for_each_item<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(u32, ItemOffset, &[u8], &[u8]) -> Result<()>,
    {
        let map = self.store.bytes()?;
        let klen = self.key_len();
        let dlen = self.data_len();
        for bucket in 0..self.bucket_count() {
            let mut cur = read_off(map, self.hdr.slot_offset(bucket));
            while cur != NO_ITEM {
                let item = self.hdr.check_item_offset(cur, self.cur_end)?;
                let key = &map[item.as_usize()..item.as_usize() + klen];
                let doff = self.hdr.data_offset(item);
                let data = &map[doff..doff + dlen];
                f(bucket, item, key, data)?;
                cur = read_off(map, self.hdr.next_ptr_offset(item));
            }
        }
        Ok(())
    }

    /// Validate that the item region is a whole number of items. Checked at
    /// open and again by diagnose.
    pub(crate) fn check_region(hdr: &TableHeader, file_len: u64) -> Result<()> {
        let start = hdr.items_start() as u64;
        let isz = hdr.item_size() as u64;
        if file_len < start || (file_len - start) % isz != 0 {
            return Err(HdbError::Corrupt(format!(
                "file length {} is not header + bucket table ({}) + whole items of {} bytes",
                file_len, start, isz
            ))
            .into());
        }
        Ok(())
    }
}
