//! Rollback journal: pre-image snapshots of bytes about to be overwritten.
//!
//! Only byte ranges below the session's starting file size are captured;
//! everything appended during the session is undone by the final truncate,
//! so journaling it would be wasted work. Replay runs in reverse
//! chronological order, which is what makes repeated mutation of the same
//! range (e.g. a bucket slot rewritten by several inserts) unwind
//! correctly: the oldest pre-image is restored last.

use log::debug;

/// Append-only log of `(offset, pre-image)` captures.
#[derive(Debug)]
pub struct Journal {
    records: Vec<(u32, Box<[u8]>)>,
    /// File length at open time; bytes at or past this are never captured.
    limit: u64,
}

impl Journal {
    pub fn new(starting_size: u64) -> Self {
        Self {
            records: Vec::new(),
            limit: starting_size,
        }
    }

    /// Capture the current bytes of `map[offset..offset+len]` if (part of)
    /// the range lies below the starting size. Ranges straddling the
    /// boundary are clamped to the journaled part.
    pub fn capture(&mut self, map: &[u8], offset: u64, len: usize) {
        if offset >= self.limit || len == 0 {
            return;
        }
        let end = (offset + len as u64).min(self.limit);
        let off = offset as usize;
        let pre = map[off..end as usize].to_vec().into_boxed_slice();
        self.records.push((offset as u32, pre));
    }

    /// Restore every captured range, last capture first.
    pub fn replay(&self, map: &mut [u8]) {
        debug!("journal replay: {} record(s)", self.records.len());
        for (offset, pre) in self.records.iter().rev() {
            let off = *offset as usize;
            map[off..off + pre.len()].copy_from_slice(pre);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_reverses_repeated_mutations() {
        let mut map = vec![0u8; 16];
        map[4..8].copy_from_slice(&[1, 2, 3, 4]);

        let mut j = Journal::new(16);
        j.capture(&map, 4, 4);
        map[4..8].copy_from_slice(&[9, 9, 9, 9]);
        j.capture(&map, 4, 4);
        map[4..8].copy_from_slice(&[7, 7, 7, 7]);

        j.replay(&mut map);
        assert_eq!(&map[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn ignores_ranges_past_the_limit() {
        let map = vec![0xAAu8; 32];
        let mut j = Journal::new(16);
        j.capture(&map, 16, 8);
        j.capture(&map, 20, 4);
        assert!(j.is_empty());
    }

    #[test]
    fn clamps_straddling_range() {
        let mut map: Vec<u8> = (0u8..32).collect();
        let mut j = Journal::new(16);
        j.capture(&map, 12, 8); // only 12..16 is journaled
        assert_eq!(j.len(), 1);

        for b in &mut map[12..20] {
            *b = 0xFF;
        }
        j.replay(&mut map);
        assert_eq!(&map[12..16], &[12, 13, 14, 15]);
        // past the limit stays mutated; truncate handles it
        assert_eq!(&map[16..20], &[0xFF; 4]);
    }
}
