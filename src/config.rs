//! Open-session configuration.
//!
//! Collects the open-time tunables in one builder instead of growing the
//! `open` signature. `Table::open(path, hint, rollback)` remains the short
//! form for the common cases.

/// Configuration consumed by `Table::open_with_config`.
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// Expected number of inserts this session. Zero opens the table
    /// read-only; a positive hint opens read/write and pre-allocates
    /// `insert_hint * item_size` bytes of mapped slack.
    pub insert_hint: u64,

    /// Record pre-images of in-place mutations so the session can be
    /// rolled back. Requires a read/write session.
    pub rollback: bool,

    /// Items' worth of file growth per extension when the slack runs out.
    /// Defaults to the insert hint.
    pub grow_chunk_items: Option<u64>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_hint(mut self, hint: u64) -> Self {
        self.insert_hint = hint;
        self
    }

    pub fn rollback(mut self, enabled: bool) -> Self {
        self.rollback = enabled;
        self
    }

    pub fn grow_chunk_items(mut self, items: u64) -> Self {
        self.grow_chunk_items = Some(items);
        self
    }
}
