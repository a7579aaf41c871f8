//! The descending-chain invariant, checked against the raw file bytes so
//! the on-disk format itself is what is being validated.

use anyhow::Result;
use byteorder::{BigEndian, ByteOrder};
use std::fs;
use std::path::{Path, PathBuf};

use hdb::{CollisionPolicy, Table, TableHeader};

/// Parse the committed file and return, per bucket, the key sequence in
/// chain order (head -> ... -> 0).
fn chains_of(path: &Path) -> Result<Vec<Vec<Vec<u8>>>> {
    let bytes = fs::read(path)?;
    let hdr = TableHeader::decode(&bytes)?;
    let klen = hdr.key_len as usize;

    let mut chains = Vec::new();
    for bucket in 0..hdr.bucket_count() {
        let mut keys = Vec::new();
        let mut cur = BigEndian::read_u32(&bytes[hdr.slot_offset(bucket)..][..4]);
        while cur != 0 {
            let off = cur as usize;
            keys.push(bytes[off..off + klen].to_vec());
            cur = BigEndian::read_u32(&bytes[off + klen..][..4]);
        }
        chains.push(keys);
    }
    Ok(chains)
}

#[test]
fn random_inserts_keep_chains_descending() -> Result<()> {
    let root = unique_root("chain-order");
    fs::create_dir_all(&root)?;
    let path = root.join("t.hdb");
    Table::create(&path, 4, 3, 8)?;

    let mut rng = oorandom::Rand32::new(42);
    let inserted = {
        let mut t = Table::open(&path, 200, false)?;
        for _ in 0..200 {
            let key = rng.rand_u32().to_be_bytes();
            t.insert(&key, &[0x5A; 8], CollisionPolicy::IgnoreDuplicate)?;
        }
        let n = t.item_count();
        t.commit()?;
        n
    };

    let chains = chains_of(&path)?;
    let total: usize = chains.iter().map(|c| c.len()).sum();
    assert_eq!(total as u64, inserted);

    for (bucket, keys) in chains.iter().enumerate() {
        for pair in keys.windows(2) {
            assert!(
                pair[0] > pair[1],
                "bucket {}: {:02x?} must sort strictly above {:02x?}",
                bucket,
                pair[0],
                pair[1]
            );
        }
    }
    Ok(())
}

#[test]
fn duplicate_keys_keep_chains_non_increasing() -> Result<()> {
    let root = unique_root("chain-order-multi");
    fs::create_dir_all(&root)?;
    let path = root.join("t.hdb");
    Table::create(&path, 4, 1, 8)?;

    {
        let mut t = Table::open(&path, 32, false)?;
        let mut rng = oorandom::Rand32::new(7);
        for _ in 0..32 {
            // tiny key space forces plenty of duplicates
            let key = (rng.rand_u32() % 8).to_be_bytes();
            t.insert(&key, &[1; 8], CollisionPolicy::AllowMultiple)?;
        }
        t.commit()?;
    }

    for keys in chains_of(&path)? {
        for pair in keys.windows(2) {
            assert!(pair[0] >= pair[1], "chain must be non-increasing");
        }
    }
    Ok(())
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("hdb-{}-{}-{}", prefix, pid, t))
}
