use crate::error::StoreError;

/// A single write within an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl Command {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Command::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Command::Delete { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Command::Put { key, .. } | Command::Delete { key } => key,
        }
    }
}

pub type ScanIter<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreError>> + 'a>;

/// The ordered key/value engine the document layer builds on.
///
/// Tables are independent byte-keyed namespaces. Writes go through [`apply`]
/// as an all-or-nothing batch; reads are point gets and forward prefix scans.
/// A scan observes a single snapshot of the table — entries committed after
/// the scan opened are not visible to it.
///
/// [`apply`]: Store::apply
pub trait Store {
    /// Create a table. Idempotent — an existing table is left untouched.
    fn create_table(&self, table: &str) -> Result<(), StoreError>;

    /// Drop a table, its contents, and its id sequence. Idempotent.
    fn drop_table(&self, table: &str) -> Result<(), StoreError>;

    /// Apply a batch of puts and deletes atomically.
    fn apply(&self, table: &str, batch: &[Command]) -> Result<(), StoreError>;

    /// Point lookup. A missing table reads as empty.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Forward ordered scan of keys starting with `prefix`. An empty prefix
    /// scans the whole table; a missing table yields an empty iterator.
    fn scan_prefix<'a>(&'a self, table: &str, prefix: &[u8]) -> Result<ScanIter<'a>, StoreError>;

    /// Next value of the table's monotonic sequence. Starts at 1 and never
    /// repeats for the lifetime of the table.
    fn next_id(&self, table: &str) -> Result<u64, StoreError>;
}
