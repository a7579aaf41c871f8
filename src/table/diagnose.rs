//! Non-mutating structured report over an open table.

use anyhow::Result;
use base64::Engine;
use serde_json::{json, Value};

use crate::consts::NO_ITEM;
use crate::errors::HdbError;
use crate::layout::read_off;

use super::core::Table;

/// What to include in the report beyond header and statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnoseOptions {
    /// Include a full base64 key/data dump of every item.
    pub dump: bool,
}

impl Table {
    /// Produce a JSON-shaped report: header fields, per-bucket occupancy,
    /// aggregate statistics and (optionally) a full item dump. The
    /// region/chain consistency checks are assertions over stored data; a
    /// violation aborts with `HdbError::Corrupt` instead of returning a
    /// partial report.
    pub fn diagnose(&self, opts: DiagnoseOptions) -> Result<Value> {
        Self::check_region(&self.hdr, self.cur_end)?;
        let expected_items = self.item_count();

        let map = self.store.bytes()?;
        let b64 = base64::engine::general_purpose::STANDARD;
        let klen = self.key_len();
        let dlen = self.data_len();

        let mut per_bucket = vec![0u64; self.bucket_count() as usize];
        let mut walked = 0u64;
        let mut dump = Vec::new();

        for bucket in 0..self.bucket_count() {
            let mut cur = read_off(map, self.hdr.slot_offset(bucket));
            while cur != NO_ITEM {
                let item = self.hdr.check_item_offset(cur, self.cur_end)?;
                per_bucket[bucket as usize] += 1;
                walked += 1;
                if walked > expected_items {
                    // more chain entries than the item region holds: a
                    // pointer cycle or cross-linked chains
                    return Err(HdbError::Corrupt(format!(
                        "chain walk exceeds {} stored item(s)",
                        expected_items
                    ))
                    .into());
                }
                if opts.dump {
                    let koff = item.as_usize();
                    let doff = self.hdr.data_offset(item);
                    dump.push(json!({
                        "bucket": bucket,
                        "offset": item.get(),
                        "key": b64.encode(&map[koff..koff + klen]),
                        "data": b64.encode(&map[doff..doff + dlen]),
                    }));
                }
                cur = read_off(map, self.hdr.next_ptr_offset(item));
            }
        }

        if walked != expected_items {
            return Err(HdbError::Corrupt(format!(
                "chains hold {} item(s), item region holds {}",
                walked, expected_items
            ))
            .into());
        }

        let empty = per_bucket.iter().filter(|&&c| c == 0).count();
        let singleton = per_bucket.iter().filter(|&&c| c == 1).count();
        let overfull = per_bucket.iter().filter(|&&c| c > 1).count();
        let avg_bytes_per_item = if expected_items > 0 {
            self.cur_end / expected_items
        } else {
            0
        };

        let mut report = json!({
            "path": self.path.display().to_string(),
            "header": {
                "version": self.hdr.version,
                "key_len": self.hdr.key_len,
                "bucket_bits": self.hdr.bucket_bits,
                "data_len": self.hdr.data_len,
            },
            "geometry": {
                "bucket_count": self.bucket_count(),
                "items_start": self.hdr.items_start(),
                "item_size": self.hdr.item_size(),
                "cur_end": self.cur_end,
                "mem_size": self.store.mem_size,
            },
            "total_items": expected_items,
            "buckets": per_bucket,
            "stats": {
                "empty_buckets": empty,
                "singleton_buckets": singleton,
                "overfull_buckets": overfull,
                "avg_bytes_per_item": avg_bytes_per_item,
            },
        });
        if opts.dump {
            report["items"] = Value::Array(dump);
        }
        Ok(report)
    }
}
