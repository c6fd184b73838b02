use shale_store::{Command, MemoryStore, Store, StoreError};

const TABLE: &str = "test";

fn mem_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.create_table(TABLE).unwrap();
    store
}

#[test]
fn put_and_get() {
    let store = mem_store();
    store
        .apply(TABLE, &[Command::put(b"key1".to_vec(), b"value1".to_vec())])
        .unwrap();

    let value = store.get(TABLE, b"key1").unwrap().unwrap();
    assert_eq!(value, b"value1");
}

#[test]
fn get_missing_key_returns_none() {
    let store = mem_store();
    assert!(store.get(TABLE, b"nonexistent").unwrap().is_none());
}

#[test]
fn get_missing_table_reads_empty() {
    let store = MemoryStore::new();
    assert!(store.get("nope", b"key").unwrap().is_none());
    let entries: Vec<_> = store.scan_prefix("nope", b"").unwrap().collect();
    assert!(entries.is_empty());
}

#[test]
fn apply_missing_table_errors() {
    let store = MemoryStore::new();
    let err = store
        .apply("nope", &[Command::put(b"k".to_vec(), b"v".to_vec())])
        .unwrap_err();
    assert!(matches!(err, StoreError::TableNotFound(_)));
}

#[test]
fn batch_mixes_puts_and_deletes() {
    let store = mem_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(b"a".to_vec(), b"1".to_vec()),
                Command::put(b"b".to_vec(), b"2".to_vec()),
            ],
        )
        .unwrap();
    store
        .apply(
            TABLE,
            &[
                Command::delete(b"a".to_vec()),
                Command::put(b"c".to_vec(), b"3".to_vec()),
            ],
        )
        .unwrap();

    assert!(store.get(TABLE, b"a").unwrap().is_none());
    assert_eq!(store.get(TABLE, b"b").unwrap().unwrap(), b"2");
    assert_eq!(store.get(TABLE, b"c").unwrap().unwrap(), b"3");
}

#[test]
fn scan_prefix_returns_matching_pairs_in_order() {
    let store = mem_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(b"accounts/1/name".to_vec(), b"Alice".to_vec()),
                Command::put(b"accounts/2/name".to_vec(), b"Bob".to_vec()),
                Command::put(b"accounts/1/email".to_vec(), b"a@test.com".to_vec()),
                Command::put(b"other/1/foo".to_vec(), b"bar".to_vec()),
            ],
        )
        .unwrap();

    let entries: Vec<_> = store
        .scan_prefix(TABLE, b"accounts/1/")
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, b"accounts/1/email");
    assert_eq!(entries[1].0, b"accounts/1/name");
}

#[test]
fn scan_prefix_does_not_bleed_past_boundary() {
    let store = mem_store();
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
fn empty_prefix_scans_everything() {
    let store = mem_store();
    store
        .apply(
            TABLE,
            &[
                Command::put(b"b".to_vec(), b"2".to_vec()),
                Command::put(b"a".to_vec(), b"1".to_vec()),
            ],
        )
        .unwrap();

    let keys: Vec<_> = store
        .scan_prefix(TABLE, b"")
        .unwrap()
        .map(|r| r.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn scan_snapshot_is_isolated_from_later_writes() {
    let store = mem_store();
    store
        .apply(TABLE, &[Command::put(b"a".to_vec(), b"1".to_vec())])
        .unwrap();

    let iter = store.scan_prefix(TABLE, b"").unwrap();
    store
        .apply(TABLE, &[Command::put(b"b".to_vec(), b"2".to_vec())])
        .unwrap();

    let keys: Vec<_> = iter.map(|r| r.unwrap().0).collect();
    assert_eq!(keys, vec![b"a".to_vec()]);
}

#[test]
fn next_id_is_strictly_monotonic() {
    let store = mem_store();
    let ids: Vec<u64> = (0..5).map(|_| store.next_id(TABLE).unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn drop_resets_table_and_sequence() {
    let store = mem_store();
    store.next_id(TABLE).unwrap();
    store.next_id(TABLE).unwrap();

    store.drop_table(TABLE).unwrap();
    store.create_table(TABLE).unwrap();
    assert_eq!(store.next_id(TABLE).unwrap(), 1);
}

#[test]
fn create_table_is_idempotent() {
    let store = mem_store();
    store
        .apply(TABLE, &[Command::put(b"a".to_vec(), b"1".to_vec())])
        .unwrap();
    store.create_table(TABLE).unwrap();
    assert_eq!(store.get(TABLE, b"a").unwrap().unwrap(), b"1");
}
