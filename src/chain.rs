//! Bucket selection and ordered-chain search.
//!
//! Chains hang off the bucket table as forward-linked item records kept in
//! strictly descending byte-wise key order. That order is what makes the
//! early exit in `search` valid: the first time the target key compares
//! greater than an item's key, nothing further down the chain can match.
//!
//! Pure functions over the mapped byte slice; all mutation happens in the
//! table layer.

use std::cmp::Ordering;

use anyhow::Result;

use crate::consts::NO_ITEM;
use crate::layout::{read_off, ItemOffset, TableHeader};

/// Outcome of a chain walk.
///
/// Either way the caller gets a splice point: `prev` is the predecessor in
/// the chain (`None` means the bucket slot itself), and the new item's
/// next pointer is the found item (AllowMultiple prepends in front of its
/// duplicates) or `next`, the first item with a smaller key (or `NO_ITEM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        item: ItemOffset,
        prev: Option<ItemOffset>,
    },
    NotFound {
        prev: Option<ItemOffset>,
        next: u32,
    },
}

/// Bucket index: the low `bucket_bits` bits of the leading key bytes folded
/// big-endian into a u32.
///
/// No mixing hash is applied, by design: the on-disk bucket layout depends
/// on raw key bits, and callers supply keys that are already hash-like
/// (content hashes, random ids). For keys shorter than 4 bytes the fold
/// covers the whole key, which is enough because key_len*8 >= bucket_bits.
#[inline]
pub fn bucket_of_key(hdr: &TableHeader, key: &[u8]) -> u32 {
    debug_assert_eq!(key.len(), hdr.key_len as usize);
    let mut v = 0u32;
    for &b in key.iter().take(4) {
        v = (v << 8) | b as u32;
    }
    let mask = (hdr.bucket_count() as u64 - 1) as u32;
    v & mask
}

/// Walk a chain starting at `start` (a bucket head or a resume offset)
/// looking for `key`. `end` is the logical end of valid data; any chain
/// offset outside `[items_start, end)` is reported as corruption.
pub fn search(
    map: &[u8],
    hdr: &TableHeader,
    key: &[u8],
    start: u32,
    end: u64,
) -> Result<SearchOutcome> {
    debug_assert_eq!(key.len(), hdr.key_len as usize);
    let klen = hdr.key_len as usize;

    let mut prev: Option<ItemOffset> = None;
    let mut cur = start;
    while cur != NO_ITEM {
        let item = hdr.check_item_offset(cur, end)?;
        let item_key = &map[item.as_usize()..item.as_usize() + klen];
        match key.cmp(item_key) {
            Ordering::Equal => return Ok(SearchOutcome::Found { item, prev }),
            Ordering::Less => {
                // item key is larger; keep descending
                prev = Some(item);
                cur = read_off(map, hdr.next_ptr_offset(item));
            }
            Ordering::Greater => {
                // descending order: no later item can match
                return Ok(SearchOutcome::NotFound { prev, next: cur });
            }
        }
    }
    Ok(SearchOutcome::NotFound { prev, next: NO_ITEM })
}

/// The next-pointer value of `item`, for resuming a multi-value scan just
/// past a match.
#[inline]
pub fn next_of(map: &[u8], hdr: &TableHeader, item: ItemOffset) -> u32 {
    read_off(map, hdr.next_ptr_offset(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::write_off;

    // Hand-built single-bucket table: K=2, B=0, D=1.
    // items_start = 8 + 4 = 12, item_size = 7.
    fn fixture() -> (TableHeader, Vec<u8>) {
        let hdr = TableHeader::new(2, 0, 1).unwrap();
        assert_eq!(hdr.items_start(), 12);
        assert_eq!(hdr.item_size(), 7);

        // Chain (descending keys): [0x30,0x30] -> [0x20,0x20] -> [0x10,0x10]
        // laid out at offsets 19, 12, 26 to decouple chain order from file
        // order.
        let mut map = vec![0u8; 12 + 3 * 7];
        let put = |map: &mut Vec<u8>, off: usize, key: [u8; 2], next: u32, data: u8| {
            map[off..off + 2].copy_from_slice(&key);
            write_off(map, off + 2, next);
            map[off + 6] = data;
        };
        put(&mut map, 19, [0x30, 0x30], 12, 3);
        put(&mut map, 12, [0x20, 0x20], 26, 2);
        put(&mut map, 26, [0x10, 0x10], NO_ITEM, 1);
        write_off(&mut map, hdr.slot_offset(0), 19);
        (hdr, map)
    }

    #[test]
    fn finds_each_item() {
        let (hdr, map) = fixture();
        let end = map.len() as u64;
        let head = read_off(&map, hdr.slot_offset(0));
        for (key, off, prev_off) in [
            ([0x30, 0x30], 19, None),
            ([0x20, 0x20], 12, Some(19)),
            ([0x10, 0x10], 26, Some(12)),
        ] {
            match search(&map, &hdr, &key, head, end).unwrap() {
                SearchOutcome::Found { item, prev } => {
                    assert_eq!(item.get(), off);
                    assert_eq!(prev.map(ItemOffset::get), prev_off);
                }
                other => panic!("expected Found for {:02x?}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn miss_reports_splice_point() {
        let (hdr, map) = fixture();
        let end = map.len() as u64;
        let head = read_off(&map, hdr.slot_offset(0));

        // Between 0x3030 and 0x2020: splice after head.
        match search(&map, &hdr, &[0x25, 0x00], head, end).unwrap() {
            SearchOutcome::NotFound { prev, next } => {
                assert_eq!(prev.unwrap().get(), 19);
                assert_eq!(next, 12);
            }
            other => panic!("unexpected {:?}", other),
        }

        // Larger than the head key: splice at the bucket slot.
        match search(&map, &hdr, &[0x40, 0x00], head, end).unwrap() {
            SearchOutcome::NotFound { prev, next } => {
                assert!(prev.is_none());
                assert_eq!(next, 19);
            }
            other => panic!("unexpected {:?}", other),
        }

        // Smaller than everything: append at the tail.
        match search(&map, &hdr, &[0x00, 0x01], head, end).unwrap() {
            SearchOutcome::NotFound { prev, next } => {
                assert_eq!(prev.unwrap().get(), 26);
                assert_eq!(next, NO_ITEM);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_bucket() {
        let (hdr, map) = fixture();
        let end = map.len() as u64;
        match search(&map, &hdr, &[0x11, 0x22], NO_ITEM, end).unwrap() {
            SearchOutcome::NotFound { prev, next } => {
                assert!(prev.is_none());
                assert_eq!(next, NO_ITEM);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn resume_skips_earlier_matches() {
        let (hdr, map) = fixture();
        let end = map.len() as u64;
        // Resume just past the 0x2020 match: the rest of the chain holds
        // only 0x1010, so the same key now misses.
        let resume = next_of(&map, &hdr, ItemOffset::new(12).unwrap());
        match search(&map, &hdr, &[0x20, 0x20], resume, end).unwrap() {
            SearchOutcome::NotFound { next, .. } => assert_eq!(next, NO_ITEM),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bogus_offset_is_corruption() {
        let (hdr, mut map) = fixture();
        let end = map.len() as u64;
        // Point the bucket head into the middle of an item.
        write_off(&mut map, hdr.slot_offset(0), 13);
        assert!(search(&map, &hdr, &[0x20, 0x20], 13, end).is_err());
    }

    #[test]
    fn bucket_selection_masks_low_bits() {
        let hdr = TableHeader::new(4, 4, 8).unwrap();
        assert_eq!(bucket_of_key(&hdr, &[0, 0, 0, 0x13]), 0x3);
        assert_eq!(bucket_of_key(&hdr, &[0xFF, 0xFF, 0xFF, 0xF5]), 0x5);
        // Only the low 4 bits of the BE value matter.
        assert_eq!(
            bucket_of_key(&hdr, &[0xAA, 0xBB, 0xCC, 0x17]),
            bucket_of_key(&hdr, &[0x00, 0x00, 0x00, 0x07]),
        );
    }

    #[test]
    fn bucket_selection_short_keys() {
        // 1-byte keys with 8 bucket bits: the key byte is the bucket.
        let hdr = TableHeader::new(1, 8, 4).unwrap();
        assert_eq!(bucket_of_key(&hdr, &[0xC7]), 0xC7);
        let hdr2 = TableHeader::new(2, 3, 4).unwrap();
        assert_eq!(bucket_of_key(&hdr2, &[0xFF, 0x0D]), 0x5);
    }
}
