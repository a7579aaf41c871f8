//! Rebuild a table with a different bucket count.

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use super::core::Table;
use super::insert::CollisionPolicy;

impl Table {
    /// Rebuild the table at `path` with `new_bucket_bits` bucket-index
    /// bits, keeping key/data lengths. Every item is re-inserted under the
    /// ERROR policy — a duplicate during the rebuild means the source
    /// chains are corrupt. The rebuilt file atomically replaces the
    /// original (tmp + rename).
    pub fn rehash(path: &Path, new_bucket_bits: u8) -> Result<()> {
        let src = Table::open(path, 0, false)
            .with_context(|| format!("open rehash source {}", path.display()))?;

        let tmp = tmp_path(path);
        let _ = fs::remove_file(&tmp); // stale tmp from an aborted rebuild

        Table::create(
            &tmp,
            src.hdr.key_len,
            new_bucket_bits,
            src.hdr.data_len,
        )
        .with_context(|| format!("create rehash target {}", tmp.display()))?;

        let items = src.item_count();
        let mut dst = Table::open(&tmp, items.max(1), false)?;
        src.for_each_item(|_bucket, _item, key, data| {
            dst.insert(key, data, CollisionPolicy::ErrorOnDuplicate)
                .context("re-insert during rehash (duplicate means corrupt source)")
        })?;
        dst.commit()?;

        // Release the source lock before replacing the file under it.
        drop(src);
        fs::rename(&tmp, path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
        let _ = fsync_parent_dir(path);

        info!(
            "rehashed {}: {} item(s) into {} bucket bits",
            path.display(),
            items,
            new_bucket_bits
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.tmp", name))
}

// Best-effort fsync of the parent directory after rename (Unix only).
#[cfg(unix)]
fn fsync_parent_dir(p: &Path) -> std::io::Result<()> {
    use std::fs::File;
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_parent_dir(_p: &Path) -> std::io::Result<()> {
    Ok(())
}
