//! Table lifecycle and operations, split by concern:
//! - core: the `Table` struct, accessors, chain iteration
//! - open: create / open / open_with_config
//! - insert: collision policies and chain splicing
//! - find: point lookup and multi-value enumeration
//! - commit: commit / rollback session endings
//! - rehash: rebuild into a different bucket count
//! - diagnose: structured non-mutating report

mod commit;
mod core;
mod diagnose;
mod find;
mod insert;
mod open;
mod rehash;

pub use self::core::Table;
pub use self::diagnose::DiagnoseOptions;
pub use self::insert::CollisionPolicy;
