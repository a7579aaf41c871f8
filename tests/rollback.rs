use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use hdb::{CollisionPolicy, HdbError, Table};

#[test]
fn rollback_restores_pre_session_bytes() -> Result<()> {
    let root = unique_root("rollback");
    fs::create_dir_all(&root)?;
    let path = root.join("t.hdb");
    Table::create(&path, 4, 2, 8)?;

    // baseline session: three committed items
    {
        let mut t = Table::open(&path, 4, false)?;
        for i in 1u32..=3 {
            t.insert(&i.to_be_bytes(), &[i as u8; 8], CollisionPolicy::Overwrite)?;
        }
        t.commit()?;
    }
    let baseline = fs::read(&path)?;

    // rollback session: overwrite an old key twice, add new ones
    {
        let mut t = Table::open(&path, 8, true)?;
        assert!(t.rollback_enabled());
        t.insert(&1u32.to_be_bytes(), &[0xAA; 8], CollisionPolicy::Overwrite)?;
        t.insert(&1u32.to_be_bytes(), &[0xBB; 8], CollisionPolicy::Overwrite)?;
        t.insert(&10u32.to_be_bytes(), &[0xCC; 8], CollisionPolicy::Overwrite)?;
        t.insert(&11u32.to_be_bytes(), &[0xDD; 8], CollisionPolicy::Overwrite)?;
        assert_eq!(t.item_count(), 5);
        t.rollback()?;
    }

    // byte-for-byte identical to the pre-session state
    assert_eq!(fs::read(&path)?, baseline);

    // session keys are gone, old values are back
    let t = Table::open(&path, 0, false)?;
    assert_eq!(t.item_count(), 3);
    assert_eq!(t.find(&1u32.to_be_bytes())?.unwrap(), &[1; 8]);
    assert!(t.find(&10u32.to_be_bytes())?.is_none());
    assert!(t.find(&11u32.to_be_bytes())?.is_none());
    t.commit()?;
    Ok(())
}

#[test]
fn rollback_undoes_chain_splices_into_old_items() -> Result<()> {
    let root = unique_root("rollback-splice");
    fs::create_dir_all(&root)?;
    let path = root.join("t.hdb");
    // single bucket so every item shares one chain
    Table::create(&path, 4, 0, 8)?;

    {
        let mut t = Table::open(&path, 4, false)?;
        t.insert(&[0, 0, 0, 2], &[2; 8], CollisionPolicy::Overwrite)?;
        t.insert(&[0, 0, 0, 6], &[6; 8], CollisionPolicy::Overwrite)?;
        t.commit()?;
    }
    let baseline = fs::read(&path)?;

    {
        let mut t = Table::open(&path, 4, true)?;
        // splices between the two old items, rewriting an old next pointer
        t.insert(&[0, 0, 0, 4], &[4; 8], CollisionPolicy::Overwrite)?;
        // and a new chain head, rewriting the bucket slot
        t.insert(&[0, 0, 0, 9], &[9; 8], CollisionPolicy::Overwrite)?;
        assert_eq!(t.find(&[0, 0, 0, 4])?.unwrap(), &[4; 8]);
        t.rollback()?;
    }

    assert_eq!(fs::read(&path)?, baseline);
    let t = Table::open(&path, 0, false)?;
    assert_eq!(t.find(&[0, 0, 0, 2])?.unwrap(), &[2; 8]);
    assert_eq!(t.find(&[0, 0, 0, 6])?.unwrap(), &[6; 8]);
    assert!(t.find(&[0, 0, 0, 4])?.is_none());
    assert!(t.find(&[0, 0, 0, 9])?.is_none());
    t.commit()?;
    Ok(())
}

#[test]
fn rollback_without_journal_is_a_loud_error() -> Result<()> {
    let root = unique_root("rollback-misuse");
    fs::create_dir_all(&root)?;
    let path = root.join("t.hdb");
    Table::create(&path, 4, 2, 8)?;

    let mut t = Table::open(&path, 2, false)?;
    assert!(!t.rollback_enabled());
    t.insert(&1u32.to_be_bytes(), &[1; 8], CollisionPolicy::Overwrite)?;
    let err = t.rollback().expect_err("rollback must be rejected");
    assert!(
        matches!(
            err.downcast_ref::<HdbError>(),
            Some(HdbError::RollbackNotEnabled)
        ),
        "expected RollbackNotEnabled, got {:#}",
        err
    );
    Ok(())
}

#[test]
fn rollback_requires_a_writer_session() {
    let root = unique_root("rollback-ro");
    fs::create_dir_all(&root).unwrap();
    let path = root.join("t.hdb");
    Table::create(&path, 4, 2, 8).unwrap();
    // hint 0 (read-only) + rollback is rejected at open
    assert!(Table::open(&path, 0, true).is_err());
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("hdb-{}-{}-{}", prefix, pid, t))
}
