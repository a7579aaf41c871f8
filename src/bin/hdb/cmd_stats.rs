use anyhow::Result;
use std::path::PathBuf;

use hdb::{DiagnoseOptions, Table};

pub fn exec(path: PathBuf, json: bool, dump: bool) -> Result<()> {
    let t = Table::open(&path, 0, false)?;
    let report = t.diagnose(DiagnoseOptions { dump })?;
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    t.commit()?;
    Ok(())
}
