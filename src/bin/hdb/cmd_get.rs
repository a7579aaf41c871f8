use anyhow::Result;
use std::path::PathBuf;

use hdb::Table;

use super::util::{decode_hex, hex_dump};

pub fn exec(path: PathBuf, key: String, all: bool) -> Result<()> {
    let key = decode_hex(&key)?;
    let t = Table::open(&path, 0, false)?;
    if all {
        let values = t.find_all(&key)?;
        if values.is_empty() {
            println!("NOT FOUND");
        } else {
            for v in values {
                println!("{}", hex_dump(v));
            }
        }
    } else {
        match t.find(&key)? {
            Some(v) => println!("{}", hex_dump(v)),
            None => println!("NOT FOUND"),
        }
    }
    t.commit()?;
    Ok(())
}
