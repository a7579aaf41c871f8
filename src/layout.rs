//! Binary layout codec: header pack/unpack and all derived offset math.
//!
//! Pure and I/O-free. Everything that touches a byte offset goes through
//! here so the arithmetic exists in exactly one place.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::consts::{
    FORMAT_VERSION, HEADER_SIZE, NEXT_PTR_SIZE, OFF_BUCKET_BITS, OFF_DATA_LEN, OFF_KEY_LEN,
    OFF_VERSION, SLOT_SIZE,
};
use crate::errors::HdbError;

/// Cap on bucket-index bits: keeps the bucket table (2^B slots of 4 bytes)
/// comfortably inside the u32 offset space.
pub const MAX_BUCKET_BITS: u8 = 24;

/// Validated offset of an item record. Never zero (offset 0 is the
/// "no item" sentinel) and never inside the header/bucket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemOffset(u32);

impl ItemOffset {
    /// Wrap a raw offset; `None` for the sentinel 0.
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(ItemOffset(raw))
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// The fixed 8-byte table header. Written once at create time, immutable
/// for the lifetime of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    pub version: u8,
    pub key_len: u8,
    pub bucket_bits: u8,
    pub data_len: u16,
}

impl TableHeader {
    /// Build a header for a new table, validating the geometry.
    pub fn new(key_len: u8, bucket_bits: u8, data_len: u16) -> Result<Self> {
        if key_len == 0 {
            return Err(HdbError::Geometry("key length must be > 0".into()).into());
        }
        if data_len == 0 {
            return Err(HdbError::Geometry("data length must be > 0".into()).into());
        }
        if (key_len as u32) * 8 < bucket_bits as u32 {
            return Err(HdbError::Geometry(format!(
                "bucket bits {} exceed key width {} bits",
                bucket_bits,
                key_len as u32 * 8
            ))
            .into());
        }
        if bucket_bits > MAX_BUCKET_BITS {
            return Err(HdbError::Geometry(format!(
                "bucket bits {} exceed maximum {}",
                bucket_bits, MAX_BUCKET_BITS
            ))
            .into());
        }
        Ok(Self {
            version: FORMAT_VERSION,
            key_len,
            bucket_bits,
            data_len,
        })
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[OFF_VERSION] = self.version;
        buf[OFF_KEY_LEN] = self.key_len;
        buf[OFF_BUCKET_BITS] = self.bucket_bits;
        BigEndian::write_u16(&mut buf[OFF_DATA_LEN..OFF_DATA_LEN + 2], self.data_len);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(HdbError::Corrupt(format!(
                "header truncated: {} bytes, need {}",
                buf.len(),
                HEADER_SIZE
            ))
            .into());
        }
        let version = buf[OFF_VERSION];
        if version != FORMAT_VERSION {
            return Err(anyhow!(
                "unsupported format version {} (expected {})",
                version,
                FORMAT_VERSION
            ));
        }
        let key_len = buf[OFF_KEY_LEN];
        let bucket_bits = buf[OFF_BUCKET_BITS];
        let data_len = BigEndian::read_u16(&buf[OFF_DATA_LEN..OFF_DATA_LEN + 2]);
        if key_len == 0
            || data_len == 0
            || (key_len as u32) * 8 < bucket_bits as u32
            || bucket_bits > MAX_BUCKET_BITS
        {
            return Err(HdbError::Corrupt(format!(
                "bad header geometry: key_len={} bucket_bits={} data_len={}",
                key_len, bucket_bits, data_len
            ))
            .into());
        }
        Ok(Self {
            version,
            key_len,
            bucket_bits,
            data_len,
        })
    }

    // ---- derived geometry ----

    #[inline]
    pub fn bucket_count(&self) -> u32 {
        1u32 << self.bucket_bits
    }

    #[inline]
    pub fn bucket_table_size(&self) -> usize {
        self.bucket_count() as usize * SLOT_SIZE
    }

    /// File offset of the first item record (end of the bucket table).
    #[inline]
    pub fn items_start(&self) -> u32 {
        (HEADER_SIZE + self.bucket_table_size()) as u32
    }

    /// Size of one item record: key + next pointer + data.
    #[inline]
    pub fn item_size(&self) -> u32 {
        self.key_len as u32 + NEXT_PTR_SIZE as u32 + self.data_len as u32
    }

    /// File offset of a bucket's head slot.
    #[inline]
    pub fn slot_offset(&self, bucket: u32) -> usize {
        debug_assert!(bucket < self.bucket_count());
        HEADER_SIZE + bucket as usize * SLOT_SIZE
    }

    /// File offset of an item's next pointer (key field comes first).
    #[inline]
    pub fn next_ptr_offset(&self, item: ItemOffset) -> usize {
        item.as_usize() + self.key_len as usize
    }

    /// File offset of an item's data field.
    #[inline]
    pub fn data_offset(&self, item: ItemOffset) -> usize {
        item.as_usize() + self.key_len as usize + NEXT_PTR_SIZE
    }

    /// Validate a raw chain offset read from a slot or next pointer and
    /// promote it to an `ItemOffset`. `end` is the logical end of data.
    pub fn check_item_offset(&self, raw: u32, end: u64) -> Result<ItemOffset> {
        let start = self.items_start();
        let isz = self.item_size();
        if raw < start || (raw - start) % isz != 0 || raw as u64 + isz as u64 > end {
            return Err(HdbError::Corrupt(format!(
                "item offset {} out of range (items_start={}, item_size={}, end={})",
                raw, start, isz, end
            ))
            .into());
        }
        // raw >= items_start > 0, so the unwrap never fires
        Ok(ItemOffset(raw))
    }
}

/// Read a big-endian u32 slot/next pointer at `pos`.
#[inline]
pub fn read_off(buf: &[u8], pos: usize) -> u32 {
    BigEndian::read_u32(&buf[pos..pos + 4])
}

/// Write a big-endian u32 slot/next pointer at `pos`.
#[inline]
pub fn write_off(buf: &mut [u8], pos: usize, value: u32) {
    BigEndian::write_u32(&mut buf[pos..pos + 4], value)
}
