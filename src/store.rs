//! Memory-mapped storage: file handle, advisory lock, mapped region, growth.
//!
//! One `Store` owns one table file for the duration of a session. Opening
//! takes an exclusive fs2 advisory lock on the file itself; the lock is
//! released when the store is dropped. The mapping lives in an `Option` so
//! growth can provably drop it before the file length changes, then remap
//! at the new size. Growth only ever appends: every byte below the old
//! mapped size stays at its offset, because items are identified by
//! absolute offset and moving them would corrupt every chain pointer.

use anyhow::{anyhow, Context, Result};
use fs2::FileExt;
use log::debug;
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum MapView {
    Ro(Mmap),
    Rw(MmapMut),
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    file: File,
    map: Option<MapView>,
    writable: bool,
    /// Length of the current mapping (>= the logical end of valid data).
    pub mem_size: u64,
    /// File length observed at open time, before any pre-extension.
    pub starting_size: u64,
}

impl Store {
    /// Create the backing file with the given initial contents. Fails if
    /// the path already exists. The file is locked for the duration of the
    /// write and released before returning.
    pub fn create_file(path: &Path, contents: &[u8]) -> Result<()> {
        let mut f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("create table {}", path.display()))?;
        f.try_lock_exclusive()
            .with_context(|| format!("lock new table {}", path.display()))?;
        f.write_all(contents)?;
        f.sync_all()?;
        let _ = f.unlock();
        Ok(())
    }

    /// Open and map the file at its current length, taking the exclusive
    /// advisory lock. Read/write sessions pre-extend afterwards via `grow`.
    pub fn open(path: &Path, writable: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(path)
            .with_context(|| format!("open table {}", path.display()))?;
        file.try_lock_exclusive()
            .with_context(|| format!("lock table {} (already in use?)", path.display()))?;

        let starting_size = file.metadata()?.len();
        let mem_size = starting_size;
        let map = map_file(&file, mem_size, writable)
            .with_context(|| format!("map table {}", path.display()))?;
        debug!(
            "store open {}: starting_size={} mem_size={} writable={}",
            path.display(),
            starting_size,
            mem_size,
            writable
        );
        Ok(Self {
            path: path.to_path_buf(),
            file,
            map: Some(map),
            writable,
            mem_size,
            starting_size,
        })
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn bytes(&self) -> Result<&[u8]> {
        match &self.map {
            Some(MapView::Ro(m)) => Ok(&m[..]),
            Some(MapView::Rw(m)) => Ok(&m[..]),
            None => Err(anyhow!("table mapping not active")),
        }
    }

    pub fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.map {
            Some(MapView::Rw(m)) => Ok(&mut m[..]),
            Some(MapView::Ro(_)) => Err(anyhow!("table opened read-only")),
            None => Err(anyhow!("table mapping not active")),
        }
    }

    /// Extend the file by `extra` bytes and remap. All existing bytes keep
    /// their offsets.
    pub fn grow(&mut self, extra: u64) -> Result<()> {
        if !self.writable {
            return Err(anyhow!("grow on a read-only session"));
        }
        if extra == 0 {
            return Err(anyhow!("grow by zero bytes"));
        }
        let new_size = self.mem_size + extra;
        debug!(
            "store grow {}: {} -> {} bytes",
            self.path.display(),
            self.mem_size,
            new_size
        );

        // The mapping must be gone before the file length changes.
        self.map = None;
        sparse_extend(&self.file, new_size)
            .with_context(|| format!("extend {} to {}", self.path.display(), new_size))?;
        self.map = Some(
            map_file(&self.file, new_size, true)
                .with_context(|| format!("remap {} at {}", self.path.display(), new_size))?,
        );
        self.mem_size = new_size;
        Ok(())
    }

    /// Drop the mapping and truncate the file to `len`. Ends the session;
    /// the lock is released when the store is dropped.
    pub fn unmap_and_truncate(mut self, len: u64) -> Result<()> {
        self.map = None;
        self.file
            .set_len(len)
            .with_context(|| format!("truncate {} to {}", self.path.display(), len))?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Mapping (if any) goes first, then the advisory lock. Unlock
        // errors on drop are ignored deliberately.
        self.map = None;
        let _ = self.file.unlock();
    }
}

/// Sparse-extend: a single byte written at the last offset; the platform
/// materializes the hole lazily.
fn sparse_extend(mut file: &File, new_len: u64) -> Result<()> {
    file.seek(SeekFrom::Start(new_len - 1))?;
    file.write_all(&[0])?;
    Ok(())
}

fn map_file(file: &File, len: u64, writable: bool) -> Result<MapView> {
    // Safety: the store holds an exclusive advisory lock on the file and a
    // session is single-threaded by contract, so the mapping is not
    // concurrently truncated or written through another handle.
    let view = if writable {
        MapView::Rw(unsafe { MmapOptions::new().len(len as usize).map_mut(file)? })
    } else {
        MapView::Ro(unsafe { MmapOptions::new().len(len as usize).map(file)? })
    };
    Ok(view)
}
