use anyhow::Result;
use std::path::PathBuf;

use hdb::Table;

pub fn exec(path: PathBuf, key_len: u8, bucket_bits: u8, data_len: u16) -> Result<()> {
    Table::create(&path, key_len, bucket_bits, data_len)?;
    println!(
        "created {} (key_len={}, bucket_bits={}, data_len={})",
        path.display(),
        key_len,
        bucket_bits,
        data_len
    );
    Ok(())
}
