use shale_db::{Database, Doc};
use shale_store::MemoryStore;

pub const TABLE: &str = "articles";

pub fn mem_db() -> Database<MemoryStore> {
    Database::from_store(MemoryStore::new())
}

/// The two-document seed most query tests start from.
pub fn seed_pair(db: &Database<MemoryStore>) -> (String, String) {
    let a = db
        .add(TABLE, &Doc::from([("title", "hello"), ("type", "1")]))
        .unwrap();
    let b = db
        .add(TABLE, &Doc::from([("title", "hi"), ("type", "2")]))
        .unwrap();
    (a, b)
}

/// Strip the managed fields so inserted and stored documents compare equal.
pub fn user_fields(doc: &Doc) -> Doc {
    doc.iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
