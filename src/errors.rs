//! Branchable error conditions.
//!
//! Operations return `anyhow::Result`; the conditions callers need to act on
//! (duplicate key under the ERROR policy, rollback misuse, corruption) are
//! raised as `HdbError` so they stay recoverable via `downcast_ref` after
//! context has been attached along the way.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HdbError {
    /// Insert under `CollisionPolicy::ErrorOnDuplicate` hit an existing key.
    #[error("duplicate key")]
    DuplicateKey,

    /// Rollback requested on a session that was not opened with rollback
    /// enabled. Failing loudly here is deliberate: pretending to roll back
    /// would be data loss disguised as success.
    #[error("rollback not enabled for this session")]
    RollbackNotEnabled,

    /// Stored data violates a format invariant. Unrecoverable.
    #[error("corrupt table: {0}")]
    Corrupt(String),

    /// Invalid create/open parameters (lengths, bucket bits).
    #[error("invalid table geometry: {0}")]
    Geometry(String),
}
