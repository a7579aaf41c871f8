//! Table creation and session open.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::config::TableConfig;
use crate::consts::HEADER_SIZE;
use crate::journal::Journal;
use crate::layout::TableHeader;
use crate::store::Store;

use super::core::Table;

impl Table {
    /// Create a new table file: header plus zeroed bucket table. Fails if
    /// the path already exists or the geometry is invalid. The table is not
    /// left open; call `open` afterwards.
    pub fn create(path: &Path, key_len: u8, bucket_bits: u8, data_len: u16) -> Result<()> {
        let hdr = TableHeader::new(key_len, bucket_bits, data_len)?;
        let mut contents = vec![0u8; HEADER_SIZE + hdr.bucket_table_size()];
        contents[..HEADER_SIZE].copy_from_slice(&hdr.encode());
        Store::create_file(path, &contents)?;
        info!(
            "created table {} (key_len={}, bucket_bits={}, data_len={})",
            path.display(),
            key_len,
            bucket_bits,
            data_len
        );
        Ok(())
    }

    /// Open a session. `insert_hint == 0` opens read-only; a positive hint
    /// opens read/write with `hint * item_size` bytes of pre-allocated
    /// slack. `rollback` arms the journal (read/write sessions only).
    pub fn open(path: &Path, insert_hint: u64, rollback: bool) -> Result<Self> {
        Self::open_with_config(
            path,
            TableConfig::new().insert_hint(insert_hint).rollback(rollback),
        )
    }

    pub fn open_with_config(path: &Path, cfg: TableConfig) -> Result<Self> {
        let writable = cfg.insert_hint > 0;
        if cfg.rollback && !writable {
            return Err(anyhow!(
                "rollback requires a read/write session (insert hint > 0)"
            ));
        }

        let mut store = Store::open(path, writable)?;
        let hdr = TableHeader::decode(store.bytes()?)
            .with_context(|| format!("decode header of {}", path.display()))?;
        Self::check_region(&hdr, store.starting_size)
            .with_context(|| format!("validate {}", path.display()))?;

        let cur_end = store.starting_size;
        let grow_items = cfg.grow_chunk_items.unwrap_or(cfg.insert_hint).max(1);
        let grow_chunk = grow_items * hdr.item_size() as u64;

        if writable {
            // Pre-extend so the hinted number of inserts needs no further
            // growth.
            store.grow(cfg.insert_hint * hdr.item_size() as u64)?;
        }

        let journal = if cfg.rollback {
            Some(Journal::new(store.starting_size))
        } else {
            None
        };

        debug!(
            "open {}: items={} cur_end={} mem_size={} rollback={}",
            path.display(),
            (cur_end - hdr.items_start() as u64) / hdr.item_size() as u64,
            cur_end,
            store.mem_size,
            journal.is_some()
        );
        Ok(Self {
            path: path.to_path_buf(),
            store,
            hdr,
            cur_end,
            grow_chunk,
            journal,
        })
    }
}
