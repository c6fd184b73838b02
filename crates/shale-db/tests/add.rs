mod common;
use common::*;

use shale_db::{DbError, Doc};
use shale_store::Store;

#[test]
fn add_assigns_sequential_ids() {
    let db = mem_db();
    let ids: Vec<String> = (0..5)
        .map(|i| {
            db.add(TABLE, &Doc::new().set("n", i.to_string())).unwrap()
        })
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn add_stamps_timestamps() {
    let db = mem_db();
    let id = db.add(TABLE, &Doc::from([("title", "hello")])).unwrap();

    let doc = db.query(TABLE).eq("_id", &id).one().unwrap().unwrap();
    let created: i64 = doc.get("_created").unwrap().parse().unwrap();
    let updated: i64 = doc.get("_updated").unwrap().parse().unwrap();
    assert!(created > 0);
    assert_eq!(created, updated);
}

#[test]
fn add_overwrites_caller_reserved_fields() {
    let db = mem_db();
    let id = db
        .add(TABLE, &Doc::from([("_id", "forged"), ("title", "hello")]))
        .unwrap();
    assert_eq!(id, "1");
    assert!(db.query(TABLE).eq("_id", "forged").one().unwrap().is_none());
}

#[test]
fn add_rejects_invalid_documents() {
    let db = mem_db();
    assert!(matches!(
        db.add(TABLE, &Doc::new()),
        Err(DbError::InvalidArgument(_))
    ));
    assert!(matches!(
        db.add(TABLE, &Doc::from([("k", "")])),
        Err(DbError::InvalidArgument(_))
    ));
}

#[test]
fn add_rejects_empty_table_name() {
    let db = mem_db();
    assert!(matches!(
        db.add("", &Doc::from([("k", "v")])),
        Err(DbError::InvalidArgument(_))
    ));
}

#[test]
fn add_rejects_separator_in_fields_and_values() {
    let db = mem_db();
    assert!(matches!(
        db.add(TABLE, &Doc::from([("pa/th", "v")])),
        Err(DbError::InvalidArgument(_))
    ));
    assert!(matches!(
        db.add(TABLE, &Doc::from([("k", "a/b")])),
        Err(DbError::InvalidArgument(_))
    ));
}

#[test]
fn add_writes_primary_and_index_entries() {
    let db = mem_db();
    let id = db
        .add(TABLE, &Doc::from([("title", "hello"), ("type", "1")]))
        .unwrap();

    let store = db.store();
    assert!(store
        .get(TABLE, format!("p/_id/{id}").as_bytes())
        .unwrap()
        .is_some());
    assert_eq!(
        store
            .get(TABLE, format!("f/title/hello/{id}").as_bytes())
            .unwrap()
            .unwrap(),
        id.as_bytes()
    );
    assert_eq!(
        store
            .get(TABLE, format!("f/type/1/{id}").as_bytes())
            .unwrap()
            .unwrap(),
        id.as_bytes()
    );
    // reserved fields are indexed too
    assert!(store
        .get(TABLE, format!("f/_id/{id}/{id}").as_bytes())
        .unwrap()
        .is_some());
}

#[test]
fn full_scan_round_trip() {
    let db = mem_db();
    let inserted = vec![
        Doc::from([("title", "hello"), ("type", "1")]),
        Doc::from([("title", "hi"), ("type", "2")]),
        Doc::from([("color", "red")]),
    ];
    for doc in &inserted {
        db.add(TABLE, doc).unwrap();
    }

    let mut stored: Vec<Doc> = db
        .query(TABLE)
        .list()
        .unwrap()
        .iter()
        .map(user_fields)
        .collect();
    let mut expected = inserted;
    stored.sort_by_key(|d| format!("{d:?}"));
    expected.sort_by_key(|d| format!("{d:?}"));
    assert_eq!(stored, expected);
}
