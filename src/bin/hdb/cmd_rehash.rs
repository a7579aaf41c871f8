use anyhow::Result;
use std::path::PathBuf;

use hdb::Table;

pub fn exec(path: PathBuf, bucket_bits: u8) -> Result<()> {
    Table::rehash(&path, bucket_bits)?;
    println!("rehashed {} to {} bucket bits", path.display(), bucket_bits);
    Ok(())
}
