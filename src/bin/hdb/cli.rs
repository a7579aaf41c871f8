use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI over hdb tables (fixed-size keys/values, hex on the command line)
#[derive(Parser, Debug)]
#[command(name = "hdb", version, about = "hdb fixed-layout hash-table CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a new table file
    Create {
        #[arg(long)]
        path: PathBuf,
        /// Key length in bytes
        #[arg(long)]
        key_len: u8,
        /// Bucket-index bits (bucket count = 2^bits)
        #[arg(long, default_value_t = 8)]
        bucket_bits: u8,
        /// Data length in bytes
        #[arg(long)]
        data_len: u16,
    },
    /// Insert one key/value pair (hex-encoded, exact table lengths)
    Put {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
        /// On an existing key: overwrite | error | ignore | multiple
        #[arg(long, default_value = "overwrite")]
        on_duplicate: String,
    },
    /// Look up a key (hex-encoded); prints the value as hex
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Print every value stored under the key (AllowMultiple tables)
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Structured table report
    Stats {
        #[arg(long)]
        path: PathBuf,
        /// One-line JSON instead of pretty-printed
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Include a base64 dump of every key/data pair
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
    /// Rebuild the table with a different bucket count
    Rehash {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        bucket_bits: u8,
    },
}
