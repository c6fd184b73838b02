use shale_store::{Command, RedbStore, Store, StoreError};

const TABLE: &str = "test";

fn disk_store() -> (RedbStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbStore::open(&dir.path().join("test.redb")).unwrap();
    store.create_table(TABLE).unwrap();
    (store, dir)
}

#[test]
fn put_and_get() {
    let (store, _dir) = disk_store();
    store
        .apply(TABLE, &[Command::put(b"key1".to_vec(), b"value1".to_vec())])
        .unwrap();
    assert_eq!(store.get(TABLE, b"key1").unwrap().unwrap(), b"value1");
}

#[test]
fn get_missing_table_reads_empty() {
    let (store, _dir) = disk_store();
    assert!(store.get("nope", b"key").unwrap().is_none());
    let entries: Vec<_> = store.scan_prefix("nope", b"").unwrap().collect();
    assert!(entries.is_empty());
}

#[test]
fn apply_missing_table_errors() {
    let (store, _dir) = disk_store();
    let err = store
        .apply("nope", &[Command::put(b"k".to_vec(), b"v".to_vec())])
        .unwrap_err();
    assert!(matches!(err, StoreError::TableNotFound(_)));
}

#[test]
fn batch_is_atomic_over_restart_free_reads() {
    let (store, _dir) = disk_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(b"a".to_vec(), b"1".to_vec()),
                Command::put(b"b".to_vec(), b"2".to_vec()),
                Command::delete(b"a".to_vec()),
            ],
        )
        .unwrap();
    assert!(store.get(TABLE, b"a").unwrap().is_none());
    assert_eq!(store.get(TABLE, b"b").unwrap().unwrap(), b"2");
}

#[test]
fn scan_prefix_stays_within_boundary() {
    let (store, _dir) = disk_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(b"ab".to_vec(), b"1".to_vec()),
                Command::put(b"abz".to_vec(), b"2".to_vec()),
                Command::put(b"ac".to_vec(), b"3".to_vec()),
            ],
        )
        .unwrap();

    let keys: Vec<_> = store
        .scan_prefix(TABLE, b"ab")
        .unwrap()
        .map(|r| r.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b"ab".to_vec(), b"abz".to_vec()]);
}

#[test]
fn scan_prefix_handles_max_byte_tail() {
    let (store, _dir) = disk_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(vec![b'a', 0xFF], b"1".to_vec()),
                Command::put(vec![b'a', 0xFF, b'x'], b"2".to_vec()),
                Command::put(vec![b'b'], b"3".to_vec()),
            ],
        )
        .unwrap();

    let keys: Vec<_> = store
        .scan_prefix(TABLE, &[b'a', 0xFF])
        .unwrap()
        .map(|r| r.unwrap().0)
        .collect();
    assert_eq!(keys, vec![vec![b'a', 0xFF], vec![b'a', 0xFF, b'x']]);
}

#[test]
fn next_id_is_monotonic_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.redb");
    {
        let store = RedbStore::open(&path).unwrap();
        store.create_table(TABLE).unwrap();
        assert_eq!(store.next_id(TABLE).unwrap(), 1);
        assert_eq!(store.next_id(TABLE).unwrap(), 2);
    }
    let store = RedbStore::open(&path).unwrap();
    assert_eq!(store.next_id(TABLE).unwrap(), 3);
}

#[test]
fn drop_resets_sequence() {
    let (store, _dir) = disk_store();
    store.next_id(TABLE).unwrap();
    store.drop_table(TABLE).unwrap();
    store.create_table(TABLE).unwrap();
    assert_eq!(store.next_id(TABLE).unwrap(), 1);
}

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.redb");
    {
        let store = RedbStore::open(&path).unwrap();
        store.create_table(TABLE).unwrap();
        store
            .apply(TABLE, &[Command::put(b"k".to_vec(), b"v".to_vec())])
            .unwrap();
    }
    let store = RedbStore::open(&path).unwrap();
    assert_eq!(store.get(TABLE, b"k").unwrap().unwrap(), b"v");
}
