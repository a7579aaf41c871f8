//! On-disk format constants (header, bucket table, item records).

// -------- Table header --------
// Layout (8 bytes, integers big-endian):
// [version u8][key_len u8][bucket_bits u8][reserved u8][data_len u16][reserved u16]
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 8;

// Offsets inside the header
pub const OFF_VERSION: usize = 0;
pub const OFF_KEY_LEN: usize = 1;
pub const OFF_BUCKET_BITS: usize = 2;
pub const OFF_DATA_LEN: usize = 4;

// -------- Bucket table --------
// 2^bucket_bits slots immediately after the header, each a u32 BE file
// offset of the first item in that bucket's chain.
pub const SLOT_SIZE: usize = 4;

// -------- Item records --------
// Each item is [key key_len][next u32 BE][data data_len], appended
// sequentially after the bucket table. An item's file offset is its
// identity for the lifetime of the table.
pub const NEXT_PTR_SIZE: usize = 4;

/// Offset 0 is inside the header and never addresses an item; it doubles
/// as the "no item" sentinel in bucket slots and next pointers.
pub const NO_ITEM: u32 = 0;
