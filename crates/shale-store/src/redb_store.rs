use std::ops::Bound;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::StoreError;
use crate::store::{Command, ScanIter, Store};

/// Per-table monotonic sequences, kept out of the data tables.
const SEQ_TABLE: TableDefinition<&str, u64> = TableDefinition::new("__shale_seq__");

/// Persistent backend over redb.
///
/// Each document table maps to one redb table; a batch commits inside a
/// single write transaction, and scans materialize their range under one
/// read transaction, which gives the snapshot guarantee the document layer
/// relies on.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(name);
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        match txn.open_table(def) {
            Ok(_) => Ok(true),
            Err(TableError::TableDoesNotExist(_)) => Ok(false),
            Err(e) => Err(StoreError::Storage(e.to_string())),
        }
    }
}

impl Store for RedbStore {
    fn create_table(&self, table: &str) -> Result<(), StoreError> {
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(table);
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        txn.open_table(def)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn drop_table(&self, table: &str) -> Result<(), StoreError> {
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(table);
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        match txn.delete_table(def) {
            Ok(_) => {}
            Err(TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(StoreError::Storage(e.to_string())),
        }
        {
            // The sequence dies with the table, as a fresh table starts over.
            let mut seq = txn
                .open_table(SEQ_TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            seq.remove(table)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn apply(&self, table: &str, batch: &[Command]) -> Result<(), StoreError> {
        if !self.table_exists(table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(table);
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut data = txn
                .open_table(def)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            for command in batch {
                match command {
                    Command::Put { key, value } => {
                        data.insert(key.as_slice(), value.as_slice())
                            .map_err(|e| StoreError::Storage(e.to_string()))?;
                    }
                    Command::Delete { key } => {
                        data.remove(key.as_slice())
                            .map_err(|e| StoreError::Storage(e.to_string()))?;
                    }
                }
            }
        }
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(table);
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let data = match txn.open_table(def) {
            Ok(data) => data,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StoreError::Storage(e.to_string())),
        };
        let value = data
            .get(key)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn scan_prefix<'a>(&'a self, table: &str, prefix: &[u8]) -> Result<ScanIter<'a>, StoreError> {
        let def: TableDefinition<'_, &[u8], &[u8]> = TableDefinition::new(table);
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let data = match txn.open_table(def) {
            Ok(data) => data,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Box::new(std::iter::empty())),
            Err(e) => return Err(StoreError::Storage(e.to_string())),
        };

        let successor = prefix_successor(prefix);
        let lower = Bound::Included(prefix);
        let upper = match &successor {
            Some(s) => Bound::Excluded(s.as_slice()),
            None => Bound::Unbounded,
        };
        let range = data
            .range::<&[u8]>((lower, upper))
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut entries: Vec<Result<(Vec<u8>, Vec<u8>), StoreError>> = Vec::new();
        for entry in range {
            match entry {
                Ok((k, v)) => entries.push(Ok((k.value().to_vec(), v.value().to_vec()))),
                Err(e) => entries.push(Err(StoreError::Storage(e.to_string()))),
            }
        }
        Ok(Box::new(entries.into_iter()))
    }

    fn next_id(&self, table: &str) -> Result<u64, StoreError> {
        if !self.table_exists(table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let id = {
            let mut seq = txn
                .open_table(SEQ_TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let current = seq
                .get(table)
                .map_err(|e| StoreError::Storage(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0);
            let next = current + 1;
            seq.insert(table, next)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            next
        };
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(id)
    }
}

/// Smallest byte string greater than every key starting with `prefix`.
///
/// Trailing 0xFF bytes carry into the previous position; a prefix of all
/// 0xFF bytes (or an empty prefix) has no successor and the scan runs to
/// the end of the table.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.last_mut() {
        if *last == u8::MAX {
            upper.pop();
        } else {
            *last += 1;
            return Some(upper);
        }
    }
    None
}
