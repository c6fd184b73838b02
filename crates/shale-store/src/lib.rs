mod error;
mod memory;
mod redb_store;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
pub use store::{Command, ScanIter, Store};
