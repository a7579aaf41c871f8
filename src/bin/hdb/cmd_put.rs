use anyhow::{anyhow, Result};
use std::path::PathBuf;

use hdb::{CollisionPolicy, Table};

use super::util::decode_hex;

pub fn exec(path: PathBuf, key: String, value: String, on_duplicate: String) -> Result<()> {
    let policy = match on_duplicate.as_str() {
        "overwrite" => CollisionPolicy::Overwrite,
        "error" => CollisionPolicy::ErrorOnDuplicate,
        "ignore" => CollisionPolicy::IgnoreDuplicate,
        "multiple" => CollisionPolicy::AllowMultiple,
        other => {
            return Err(anyhow!(
                "unknown duplicate policy '{}' (overwrite|error|ignore|multiple)",
                other
            ))
        }
    };

    let key = decode_hex(&key)?;
    let value = decode_hex(&value)?;

    let mut t = Table::open(&path, 1, false)?;
    t.insert(&key, &value, policy)?;
    t.commit()?;
    println!("OK");
    Ok(())
}
