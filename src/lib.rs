//! hdb — embedded fixed-layout, memory-mapped hash-table storage.
//!
//! A table maps fixed-size keys to fixed-size values through a bucket
//! table of chain heads; chains are kept in descending byte-wise key
//! order so lookups can stop early. Sessions are single-threaded and hold
//! an exclusive advisory lock; they end with `commit` or, when armed at
//! open time, `rollback`.

pub mod chain;
pub mod config;
pub mod consts;
pub mod errors;
pub mod journal;
pub mod layout;
pub mod store;
pub mod table;

pub use config::TableConfig;
pub use errors::HdbError;
pub use layout::{ItemOffset, TableHeader};
pub use table::{CollisionPolicy, DiagnoseOptions, Table};
